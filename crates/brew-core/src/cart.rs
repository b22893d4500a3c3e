//! Cart ledger
//!
//! Holds the line items of an order and keeps the derived totals in step:
//!
//! `total = subtotal + subtotal * tax_rate + delivery_fee`
//!
//! Totals are recomputed after every mutation, so readers never observe a
//! stale figure.

use crate::catalog::{MenuItem, MenuItemId};
use crate::config::ShopConfig;
use crate::error::ValidationError;
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Drink size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
}

impl Size {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        }
    }
}

/// Milk choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Milk {
    #[default]
    Whole,
    Skim,
    Oat,
    Almond,
    Soy,
}

/// Customization captured when an item is added
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customization {
    pub size: Size,
    pub milk: Milk,
    pub addons: Vec<String>,
    pub instructions: String,
}

/// One row of the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: MenuItemId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub customization: Customization,
}

impl LineItem {
    #[inline]
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// How the order reaches the customer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOption {
    #[default]
    Pickup,
    Delivery,
}

/// Derived money figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

/// Result of a successful add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was appended
    Appended,
    /// An existing row grew to the given quantity
    Merged { quantity: u32 },
}

/// Display row handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartRow {
    pub id: MenuItemId,
    pub title: String,
    pub detail: String,
    pub price: String,
}

/// Presentation snapshot of the whole cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub rows: Vec<CartRow>,
    pub item_count: u32,
    pub subtotal: String,
    pub tax: String,
    pub delivery_fee: String,
    pub total: String,
}

/// In-memory cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLedger {
    items: Vec<LineItem>,
    tax_rate: Decimal,
    delivery_rate: Money,
    delivery: DeliveryOption,
    totals: CartTotals,
}

impl CartLedger {
    /// Empty cart using the shop's tax rate and delivery fee
    #[must_use]
    pub fn new(config: &ShopConfig) -> Self {
        Self::with_rates(config.tax_rate, config.delivery_fee())
    }

    #[must_use]
    pub fn with_rates(tax_rate: Decimal, delivery_fee: Money) -> Self {
        Self {
            items: Vec::new(),
            tax_rate,
            delivery_rate: delivery_fee,
            delivery: DeliveryOption::default(),
            totals: CartTotals::default(),
        }
    }

    /// Add `quantity` of `item`.
    ///
    /// A zero quantity is rejected and leaves the cart untouched. When the
    /// item is already present only its quantity grows; the customization
    /// recorded on the first add is kept.
    pub fn add_item(
        &mut self,
        item: &MenuItem,
        quantity: u32,
        customization: Customization,
    ) -> Result<AddOutcome, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::NoQuantitySelected);
        }

        let outcome = if let Some(existing) = self.items.iter_mut().find(|l| l.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            AddOutcome::Merged {
                quantity: existing.quantity,
            }
        } else {
            self.items.push(LineItem {
                id: item.id,
                name: item.name.clone(),
                unit_price: item.price,
                quantity,
                customization,
            });
            AddOutcome::Appended
        };

        self.recompute();
        tracing::debug!(item = %item.id, quantity, ?outcome, total = %self.totals.total, "cart updated");
        Ok(outcome)
    }

    /// Switch between pickup and delivery
    pub fn set_delivery(&mut self, option: DeliveryOption) {
        self.delivery = option;
        self.recompute();
    }

    #[inline]
    #[must_use]
    pub fn delivery(&self) -> DeliveryOption {
        self.delivery
    }

    /// Fee charged for the current option
    #[inline]
    #[must_use]
    pub fn delivery_fee(&self) -> Money {
        match self.delivery {
            DeliveryOption::Pickup => Money::ZERO,
            DeliveryOption::Delivery => self.delivery_rate,
        }
    }

    /// Refresh the derived totals from the line items
    pub fn recompute(&mut self) {
        let subtotal: Money = self.items.iter().map(LineItem::line_total).sum();
        let tax = subtotal.scale(self.tax_rate);
        let delivery_fee = self.delivery_fee();
        self.totals = CartTotals {
            subtotal,
            tax,
            delivery_fee,
            total: subtotal + tax + delivery_fee,
        };
    }

    #[inline]
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Total number of units, shown on the cart badge
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every line and return to pickup
    pub fn clear(&mut self) {
        self.items.clear();
        self.delivery = DeliveryOption::default();
        self.recompute();
    }

    /// Renderer-facing rows
    #[must_use]
    pub fn rows(&self) -> Vec<CartRow> {
        self.items
            .iter()
            .map(|line| CartRow {
                id: line.id,
                title: format!("{} x{}", line.name, line.quantity),
                detail: line.customization.size.label().to_string(),
                price: line.line_total().to_string(),
            })
            .collect()
    }

    #[must_use]
    pub fn view(&self) -> CartView {
        CartView {
            rows: self.rows(),
            item_count: self.item_count(),
            subtotal: self.totals.subtotal.to_string(),
            tax: self.totals.tax.to_string(),
            delivery_fee: self.totals.delivery_fee.to_string(),
            total: self.totals.total.to_string(),
        }
    }
}

/// Pending per-item quantities chosen with the +/- buttons before "Add to Cart"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantityPicker {
    pending: HashMap<MenuItemId, u32>,
}

impl QuantityPicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a +/- step, never going below zero. Returns the new quantity.
    pub fn adjust(&mut self, id: MenuItemId, delta: i32) -> u32 {
        let current = self.get(id);
        let next = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        if next == 0 {
            self.pending.remove(&id);
        } else {
            self.pending.insert(id, next);
        }
        next
    }

    #[must_use]
    pub fn get(&self, id: MenuItemId) -> u32 {
        self.pending.get(&id).copied().unwrap_or(0)
    }

    /// Read and zero the pending quantity
    pub fn take(&mut self, id: MenuItemId) -> u32 {
        self.pending.remove(&id).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn cart() -> CartLedger {
        CartLedger::new(&ShopConfig::default())
    }

    #[test]
    fn espresso_and_latte_with_delivery() {
        let menu = Catalog::house_menu();
        let mut cart = cart();
        cart.add_item(menu.get(MenuItemId(1)).unwrap(), 2, Customization::default())
            .unwrap();
        cart.add_item(menu.get(MenuItemId(3)).unwrap(), 1, Customization::default())
            .unwrap();
        cart.set_delivery(DeliveryOption::Delivery);

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Money::from_cents(1200));
        assert_eq!(totals.tax, Money::from_cents(96));
        assert_eq!(totals.delivery_fee, Money::from_cents(399));
        assert_eq!(totals.total, Money::from_cents(1695));
        assert_eq!(cart.view().total, "$16.95");
    }

    #[test]
    fn pickup_removes_delivery_fee() {
        let menu = Catalog::house_menu();
        let mut cart = cart();
        cart.add_item(menu.get(MenuItemId(1)).unwrap(), 2, Customization::default())
            .unwrap();
        cart.set_delivery(DeliveryOption::Delivery);
        let with_fee = cart.totals().total;

        cart.set_delivery(DeliveryOption::Pickup);
        assert_eq!(cart.totals().delivery_fee, Money::ZERO);
        assert_eq!(cart.totals().total + Money::from_cents(399), with_fee);
    }

    #[test]
    fn zero_quantity_leaves_cart_unchanged() {
        let menu = Catalog::house_menu();
        let mut cart = cart();
        let before = cart.clone();
        let err = cart
            .add_item(menu.get(MenuItemId(2)).unwrap(), 0, Customization::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::NoQuantitySelected);
        assert_eq!(cart, before);
    }

    #[test]
    fn re_adding_merges_and_keeps_first_customization() {
        let menu = Catalog::house_menu();
        let latte = menu.get(MenuItemId(3)).unwrap();
        let mut cart = cart();
        let large = Customization {
            size: Size::Large,
            milk: Milk::Oat,
            ..Customization::default()
        };
        assert_eq!(cart.add_item(latte, 1, large.clone()), Ok(AddOutcome::Appended));
        assert_eq!(
            cart.add_item(latte, 2, Customization::default()),
            Ok(AddOutcome::Merged { quantity: 3 })
        );
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.items()[0].customization, large);
    }

    #[test]
    fn rows_render_name_quantity_and_size() {
        let menu = Catalog::house_menu();
        let mut cart = cart();
        cart.add_item(menu.get(MenuItemId(6)).unwrap(), 2, Customization::default())
            .unwrap();
        let rows = cart.rows();
        assert_eq!(rows[0].title, "Cold Brew x2");
        assert_eq!(rows[0].detail, "Medium");
        assert_eq!(rows[0].price, "$9.50");
    }

    #[test]
    fn clear_resets_everything() {
        let menu = Catalog::house_menu();
        let mut cart = cart();
        cart.add_item(menu.get(MenuItemId(19)).unwrap(), 1, Customization::default())
            .unwrap();
        cart.set_delivery(DeliveryOption::Delivery);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[test]
    fn picker_saturates_at_zero() {
        let mut picker = QuantityPicker::new();
        let id = MenuItemId(4);
        assert_eq!(picker.adjust(id, -1), 0);
        assert_eq!(picker.adjust(id, 1), 1);
        assert_eq!(picker.adjust(id, 1), 2);
        assert_eq!(picker.adjust(id, -5), 0);
        picker.adjust(id, 3);
        assert_eq!(picker.take(id), 3);
        assert_eq!(picker.get(id), 0);
    }
}
