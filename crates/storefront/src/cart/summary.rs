//! Order summary derived from the cart for display.
//!
//! Tax belongs to the presentation layer, not the store: the cart only keeps
//! the pre-tax subtotal and everything here is computed on demand.

use rust_decimal::Decimal;

use eliteshop_core::price::display_amount;

use super::CartState;

/// Flat sales tax applied to the subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Figures shown in the order summary panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    /// Units across all lines.
    pub item_count: u64,
    pub subtotal: Decimal,
    /// Always free.
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartSummary {
    #[must_use]
    pub fn subtotal_display(&self) -> String {
        display_amount(self.subtotal)
    }

    #[must_use]
    pub fn tax_display(&self) -> String {
        display_amount(self.tax)
    }

    #[must_use]
    pub fn total_display(&self) -> String {
        display_amount(self.total)
    }

    #[must_use]
    pub fn shipping_display(&self) -> String {
        if self.shipping.is_zero() {
            "Free".to_string()
        } else {
            display_amount(self.shipping)
        }
    }
}

impl From<&CartState> for CartSummary {
    fn from(state: &CartState) -> Self {
        let subtotal = state.subtotal();
        // Saturates instead of overflowing for subtotals near `Decimal::MAX`
        let tax = subtotal.saturating_mul(TAX_RATE);
        Self {
            item_count: state.item_count(),
            subtotal,
            shipping: Decimal::ZERO,
            tax,
            total: subtotal.saturating_add(tax),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartIntent;
    use crate::catalog::tests::product;

    #[test]
    fn test_tax_rate_constant() {
        assert_eq!(TAX_RATE, Decimal::new(8, 2));
    }

    #[test]
    fn test_empty_cart_summary() {
        let summary = CartSummary::from(&CartState::default());
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.total_display(), "$0.00");
        assert_eq!(summary.shipping_display(), "Free");
    }

    #[test]
    fn test_summary_with_tax() {
        let state = CartState::default()
            .apply(CartIntent::AddItem(product(1, 10995, "bags")))
            .apply(CartIntent::AddItem(product(2, 2230, "shirts")))
            .apply(CartIntent::AddItem(product(2, 2230, "shirts")));
        let summary = CartSummary::from(&state);

        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal_display(), "$154.55");
        // 154.55 * 0.08 = 12.364
        assert_eq!(summary.tax_display(), "$12.36");
        // 154.55 * 1.08 = 166.914
        assert_eq!(summary.total_display(), "$166.91");
        assert_eq!(summary.total, summary.subtotal + summary.tax);
    }

    #[test]
    fn test_summary_of_largest_cart_does_not_overflow() {
        let max = crate::catalog::Product {
            price: eliteshop_core::Price::new(Decimal::MAX).unwrap(),
            ..product(1, 0, "misc")
        };
        let state = CartState::default().apply(CartIntent::AddItem(max));
        let summary = CartSummary::from(&state);

        assert_eq!(summary.subtotal, Decimal::MAX);
        assert_eq!(summary.total, Decimal::MAX);
    }
}
