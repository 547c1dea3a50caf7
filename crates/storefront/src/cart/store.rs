//! Cart store: owns the current [`CartState`] and notifies subscribers.

use rust_decimal::Decimal;
use tracing::debug;

use eliteshop_core::ProductId;

use super::{CartIntent, CartLine, CartState};
use crate::catalog::Product;
use crate::observer::{SubscriptionId, Subscribers};

/// Injectable cart container.
///
/// Every operation runs to completion synchronously. None of them fail;
/// inputs that do not apply are dropped without touching the state.
#[derive(Debug, Default)]
pub struct CartStore {
    state: CartState,
    subscribers: Subscribers<CartState>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an intent. Subscribers run only if the state changed.
    pub fn dispatch(&mut self, intent: CartIntent) {
        debug!(intent = intent_name(&intent), product_id = ?intent.product_id(), "cart intent");

        let next = self.state.clone().apply(intent);
        if next == self.state {
            return;
        }
        self.state = next;
        self.subscribers.notify(&self.state);
    }

    /// Add one unit of `product`.
    pub fn add_item(&mut self, product: &Product) {
        self.dispatch(CartIntent::AddItem(product.clone()));
    }

    /// Set the quantity of an existing line. Quantities below one are ignored.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) {
        self.dispatch(CartIntent::UpdateQuantity {
            product_id,
            quantity,
        });
    }

    /// Remove a line if present.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.dispatch(CartIntent::RemoveItem(product_id));
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.dispatch(CartIntent::Clear);
    }

    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.state.lines()
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.state.line(product_id)
    }

    #[must_use]
    pub const fn subtotal(&self) -> Decimal {
        self.state.subtotal()
    }

    /// Register a callback run after each change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&CartState) + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

const fn intent_name(intent: &CartIntent) -> &'static str {
    match intent {
        CartIntent::AddItem(_) => "add_item",
        CartIntent::UpdateQuantity { .. } => "update_quantity",
        CartIntent::RemoveItem(_) => "remove_item",
        CartIntent::Clear => "clear",
    }
}
