//! Catalog browsing commands.

use tracing::info;

use eliteshop_core::ProductId;
use eliteshop_storefront::catalog::{self, CategoryFilter, Product, Rating};
use eliteshop_storefront::error::Result;
use eliteshop_storefront::state::AppState;

/// List products, optionally narrowed to one category.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn products<P>(state: &AppState<P>, category: Option<&str>) -> Result<()> {
    let products = state.client().get_products().await?;
    let filter = category.map_or(CategoryFilter::All, CategoryFilter::parse);
    let shown = filter.apply(&products);

    info!(total = products.len(), shown = shown.len(), "listing products");

    if shown.is_empty() {
        println!("No products found");
        return Ok(());
    }
    for product in shown {
        println!("{}", product_row(product));
    }
    Ok(())
}

/// Show one product in detail.
///
/// # Errors
///
/// Returns an error if the product does not exist or cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn product<P>(state: &AppState<P>, id: ProductId) -> Result<()> {
    let product = state.client().get_product(id).await?;

    println!("{}", product.title);
    println!("  {}", product.category);
    println!(
        "  {} ({} ratings)",
        stars(&product.rating),
        product.rating.count
    );
    println!("  {}", product.price);
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    Ok(())
}

/// List categories, `all` first.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
#[allow(clippy::print_stdout)]
pub async fn categories<P>(state: &AppState<P>) -> Result<()> {
    let products = state.client().get_products().await?;
    for name in catalog::categories(&products) {
        println!("{name}");
    }
    Ok(())
}

/// One listing line: id, price, rating and title.
fn product_row(product: &Product) -> String {
    format!(
        "{:>4}  {:>10}  {}  {} [{}]",
        product.id,
        product.price.display(),
        stars(&product.rating),
        product.title,
        product.category
    )
}

fn stars(rating: &Rating) -> String {
    let filled = usize::from(rating.filled_stars());
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
