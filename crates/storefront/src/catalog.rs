//! Product catalog types and category filtering.
//!
//! Products come from the remote catalog as JSON records:
//!
//! ```json
//! {"id": 1, "title": "Backpack", "price": 109.95, "category": "men's clothing",
//!  "image": "https://...", "description": "...", "rating": {"rate": 3.9, "count": 120}}
//! ```

use serde::{Deserialize, Serialize};

use eliteshop_core::{Price, ProductId};

/// Name of the pseudo-category that matches every product.
pub const ALL_CATEGORIES: &str = "all";

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub category: String,
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rating: Rating,
}

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    /// Average score out of 5.
    pub rate: f64,
    /// Number of ratings.
    pub count: u32,
}

impl Rating {
    /// Number of filled stars out of five (the average rounded down).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn filled_stars(&self) -> u8 {
        self.rate.clamp(0.0, 5.0).floor() as u8
    }
}

/// Distinct categories in first-seen order, preceded by `"all"`.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for product in products {
        if !out.iter().any(|c| c == &product.category) {
            out.push(product.category.clone());
        }
    }
    out
}

/// Category selection for the product list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Parse a category name; `"all"` (any case) or blank selects everything.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Self::All
        } else {
            Self::Named(name.to_string())
        }
    }

    /// Whether `product` belongs to the selected category.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => product.category == *name,
        }
    }

    /// Products in the selected category, preserving catalog order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}
