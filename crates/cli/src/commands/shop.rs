//! Interactive cart session over stdin.
//!
//! One command per line; the cart badge is printed by a store subscriber
//! after every change, so commands that leave the cart untouched print
//! nothing.

#![allow(clippy::print_stdout)]

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use eliteshop_core::ProductId;
use eliteshop_storefront::cart::{CartStore, CartSummary};
use eliteshop_storefront::error::{AppError, Result, add_breadcrumb};
use eliteshop_storefront::state::AppState;

const HELP: &str = "\
Commands:
  add <id>        add a product (or one more of it)
  qty <id> <n>    set the quantity of a line
  inc <id>        one more
  dec <id>        one fewer (never below 1)
  remove <id>     drop a line
  clear           empty the cart
  show            print the cart and order summary
  help            this text
  quit            leave";

/// A parsed line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopCommand {
    Add(ProductId),
    Quantity { product_id: ProductId, quantity: u32 },
    Increment(ProductId),
    Decrement(ProductId),
    Remove(ProductId),
    Clear,
    Show,
    Help,
    Quit,
}

/// Parse one input line.
///
/// Negative quantities parse as 0 so the cart ignores them like any other
/// quantity below 1.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for unknown commands or bad arguments.
pub fn parse_command(line: &str) -> Result<ShopCommand> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(AppError::BadRequest("empty command".to_string()));
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("add", [id]) => ShopCommand::Add(parse_id(id)?),
        ("qty", [id, quantity]) => ShopCommand::Quantity {
            product_id: parse_id(id)?,
            quantity: parse_quantity(quantity)?,
        },
        ("inc", [id]) => ShopCommand::Increment(parse_id(id)?),
        ("dec", [id]) => ShopCommand::Decrement(parse_id(id)?),
        ("remove" | "rm", [id]) => ShopCommand::Remove(parse_id(id)?),
        ("clear", []) => ShopCommand::Clear,
        ("show" | "cart", []) => ShopCommand::Show,
        ("help" | "?", []) => ShopCommand::Help,
        ("quit" | "exit" | "q", []) => ShopCommand::Quit,
        (verb, _) => {
            return Err(AppError::BadRequest(format!(
                "unknown command or wrong arguments: {verb} (try `help`)"
            )));
        }
    };
    Ok(command)
}

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("not a product id: {raw}")))
}

fn parse_quantity(raw: &str) -> Result<u32> {
    let quantity: i64 = raw
        .parse()
        .map_err(|_| AppError::BadRequest(format!("not a quantity: {raw}")))?;
    Ok(u32::try_from(quantity.max(0)).unwrap_or(u32::MAX))
}

/// Run the interactive loop until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only if stdin cannot be read; command failures are
/// printed and the loop continues.
pub async fn run<P>(state: &mut AppState<P>) -> Result<()> {
    match state.session().current_user() {
        Some(user) => println!("Signed in as {}", user.username),
        None => println!("Browsing as guest"),
    }
    println!("Type `help` for commands.");

    let badge = state
        .cart_mut()
        .subscribe(|cart| println!("Cart: {} item(s)", cart.item_count()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let outcome = match parse_command(&line) {
            Ok(ShopCommand::Quit) => break,
            Ok(command) => execute(state, command).await,
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            e.report();
            println!("{}", e.user_message());
        }
    }

    state.cart_mut().unsubscribe(badge);
    info!(lines = state.cart().lines().len(), "shop session ended");
    Ok(())
}

async fn execute<P>(state: &mut AppState<P>, command: ShopCommand) -> Result<()> {
    match command {
        ShopCommand::Add(id) => {
            let product = state.client().get_product(id).await?;
            state.cart_mut().add_item(&product);
            let product_id = id.to_string();
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", product_id.as_str())]),
            );
        }
        ShopCommand::Quantity {
            product_id,
            quantity,
        } => {
            require_line(state.cart(), product_id)?;
            state.cart_mut().update_quantity(product_id, quantity);
        }
        ShopCommand::Increment(id) => {
            let quantity = require_line(state.cart(), id)?;
            state.cart_mut().update_quantity(id, quantity.saturating_add(1));
        }
        ShopCommand::Decrement(id) => {
            let quantity = require_line(state.cart(), id)?;
            // Dropping to 0 is ignored by the cart; `remove` deletes a line
            state.cart_mut().update_quantity(id, quantity.saturating_sub(1));
        }
        ShopCommand::Remove(id) => {
            require_line(state.cart(), id)?;
            state.cart_mut().remove_item(id);
            let product_id = id.to_string();
            add_breadcrumb(
                "cart",
                "Removed from cart",
                Some(&[("product_id", product_id.as_str())]),
            );
        }
        ShopCommand::Clear => {
            state.cart_mut().clear();
            add_breadcrumb("cart", "Cleared cart", None);
        }
        ShopCommand::Show => println!("{}", render_cart(state.cart())),
        ShopCommand::Help => println!("{HELP}"),
        ShopCommand::Quit => {}
    }
    Ok(())
}

/// Current quantity of a line, or `NotFound` if the product is not in the cart.
fn require_line(cart: &CartStore, product_id: ProductId) -> Result<u32> {
    cart.line(product_id)
        .map(|line| line.quantity)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id} is not in the cart")))
}

/// Cart lines followed by the order summary.
fn render_cart(cart: &CartStore) -> String {
    if cart.state().is_empty() {
        return "Your cart is empty".to_string();
    }

    let summary = CartSummary::from(cart.state());
    let mut rows: Vec<String> = cart
        .lines()
        .iter()
        .map(|line| {
            format!(
                "{:>4}  {} x {:<3} {:>10}  {}",
                line.product_id.as_i32(),
                line.unit_price.display(),
                line.quantity,
                eliteshop_core::price::display_amount(line.line_total()),
                line.title
            )
        })
        .collect();
    rows.extend([
        format!("Items:    {}", summary.item_count),
        format!("Subtotal: {}", summary.subtotal_display()),
        format!("Shipping: {}", summary.shipping_display()),
        format!("Tax:      {}", summary.tax_display()),
        format!("Total:    {}", summary.total_display()),
    ]);
    rows.join("\n")
}
