//! Cart state and its pure transitions.
//!
//! A cart is an ordered list of lines keyed by product id (insertion order is
//! display order) plus a cached subtotal. The subtotal is recomputed from the
//! lines after every transition, so it can never drift from
//! `Σ unit_price × quantity`.
//!
//! Invalid input is absorbed: updating an unknown product, setting a quantity
//! below one, or removing a line that is not there leaves the state untouched.
//!
//! # Example
//!
//! ```rust
//! use eliteshop_storefront::cart::{CartIntent, CartState};
//! # use eliteshop_storefront::catalog::{Product, Rating};
//! # use eliteshop_core::{Price, ProductId};
//! # let product = Product {
//! #     id: ProductId::new(1), title: "Mug".into(), price: Price::from_cents(1000),
//! #     category: "home".into(), image: String::new(), description: String::new(),
//! #     rating: Rating::default(),
//! # };
//!
//! let state = CartState::default()
//!     .apply(CartIntent::AddItem(product.clone()))
//!     .apply(CartIntent::AddItem(product))
//!     .apply(CartIntent::UpdateQuantity { product_id: ProductId::new(1), quantity: 5 });
//!
//! assert_eq!(state.lines().len(), 1);
//! assert_eq!(state.subtotal(), rust_decimal::Decimal::new(50, 0));
//! ```

mod store;
pub mod summary;

pub use store::CartStore;
pub use summary::{CartSummary, TAX_RATE};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use eliteshop_core::{Price, ProductId};

use crate::catalog::Product;

/// One product entry in the cart.
///
/// `quantity` is at least one for every line held by a [`CartState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub image: String,
    pub category: String,
}

impl CartLine {
    /// `unit_price × quantity`.
    ///
    /// Lines held by a [`CartState`] always have a representable total; a
    /// hand-built line that overflows saturates at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price
            .checked_total(self.quantity)
            .unwrap_or(Decimal::MAX)
    }
}

impl From<&Product> for CartLine {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            unit_price: product.price,
            quantity: 1,
            image: product.image.clone(),
            category: product.category.clone(),
        }
    }
}

/// Intents accepted by the cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartIntent {
    /// Add one unit of a product, appending a line if it is not in the cart.
    AddItem(Product),
    /// Replace a line's quantity. Ignored for quantities below one.
    UpdateQuantity { product_id: ProductId, quantity: u32 },
    /// Drop a line.
    RemoveItem(ProductId),
    /// Drop every line.
    Clear,
}

impl CartIntent {
    /// Product the intent targets, if any.
    #[must_use]
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::AddItem(product) => Some(product.id),
            Self::UpdateQuantity { product_id, .. } | Self::RemoveItem(product_id) => {
                Some(*product_id)
            }
            Self::Clear => None,
        }
    }
}

/// Lines plus their cached subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CartState {
    lines: Vec<CartLine>,
    subtotal: Decimal,
}

impl CartState {
    /// Apply an intent, returning the next state.
    ///
    /// A transition whose subtotal would not fit in a [`Decimal`] is dropped
    /// like any other input that does not apply.
    #[must_use]
    pub fn apply(self, intent: CartIntent) -> Self {
        let mut lines = self.lines.clone();
        match intent {
            CartIntent::AddItem(product) => match find_line(&mut lines, product.id) {
                Some(line) => line.quantity = line.quantity.saturating_add(1),
                None => lines.push(CartLine::from(&product)),
            },
            CartIntent::UpdateQuantity {
                product_id,
                quantity,
            } => {
                if quantity < 1 {
                    return self;
                }
                match find_line(&mut lines, product_id) {
                    Some(line) => line.quantity = quantity,
                    None => return self,
                }
            }
            CartIntent::RemoveItem(product_id) => {
                lines.retain(|line| line.product_id != product_id);
            }
            CartIntent::Clear => lines.clear(),
        }

        match checked_subtotal(&lines) {
            Some(subtotal) => Self { lines, subtotal },
            None => {
                tracing::warn!("cart subtotal overflow; intent ignored");
                self
            }
        }
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for `product_id`, if present.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    /// Cached `Σ unit_price × quantity`.
    #[must_use]
    pub const fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn find_line(lines: &mut [CartLine], product_id: ProductId) -> Option<&mut CartLine> {
    lines.iter_mut().find(|line| line.product_id == product_id)
}

/// `Σ unit_price × quantity`, `None` on overflow.
fn checked_subtotal(lines: &[CartLine]) -> Option<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |acc, line| {
        acc.checked_add(line.unit_price.checked_total(line.quantity)?)
    })
}
