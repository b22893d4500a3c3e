//! Online order flow
//!
//! Menu, customize, fulfillment, review & pay. The cart itself lives in
//! [`CartLedger`]; this module adds the wizard, the +/- quantity picker, the
//! customization draft applied to the next add and the payment form.

use crate::cart::{AddOutcome, CartLedger, CartTotals, Customization, DeliveryOption, LineItem, QuantityPicker};
use crate::catalog::{MenuItem, MenuItemId};
use crate::config::ShopConfig;
use crate::error::ValidationError;
use crate::payment::PaymentDetails;
use crate::wizard::{StepMarker, StepValidator, Transition, WizardController, WizardStep};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStep {
    Menu,
    Customize,
    Fulfillment,
    Review,
}

impl WizardStep for OrderStep {
    const ALL: &'static [Self] = &[
        OrderStep::Menu,
        OrderStep::Customize,
        OrderStep::Fulfillment,
        OrderStep::Review,
    ];

    fn number(self) -> u8 {
        match self {
            OrderStep::Menu => 1,
            OrderStep::Customize => 2,
            OrderStep::Fulfillment => 3,
            OrderStep::Review => 4,
        }
    }

    fn title(self) -> &'static str {
        match self {
            OrderStep::Menu => "Menu",
            OrderStep::Customize => "Customize",
            OrderStep::Fulfillment => "Pickup or Delivery",
            OrderStep::Review => "Review & Pay",
        }
    }
}

/// The order being assembled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderState {
    pub cart: CartLedger,
    /// Applied to the next item added from the menu
    pub customization: Customization,
    pub payment: PaymentDetails,
}

impl StepValidator<OrderStep> for OrderState {
    fn validate_step(&self, step: OrderStep) -> Result<(), ValidationError> {
        match step {
            OrderStep::Menu if self.cart.is_empty() => Err(ValidationError::EmptyCart),
            OrderStep::Menu | OrderStep::Customize | OrderStep::Fulfillment | OrderStep::Review => {
                Ok(())
            }
        }
    }
}

/// Result of an add-to-cart press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Added {
    pub quantity: u32,
    pub outcome: AddOutcome,
}

/// Frozen order handed to the gateway. Card details never leave the flow
/// beyond the masked number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<LineItem>,
    pub delivery: DeliveryOption,
    pub totals: CartTotals,
    pub card: String,
}

impl OrderRequest {
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }
}

/// Accepted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub request: OrderRequest,
}

impl OrderReceipt {
    #[must_use]
    pub fn total_label(&self) -> String {
        self.request.totals.total.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFlow {
    state: OrderState,
    wizard: WizardController<OrderStep>,
    picker: QuantityPicker,
    submitting: bool,
}

impl OrderFlow {
    #[must_use]
    pub fn new(config: &ShopConfig) -> Self {
        Self {
            state: OrderState {
                cart: CartLedger::new(config),
                customization: Customization::default(),
                payment: PaymentDetails::default(),
            },
            wizard: WizardController::new(),
            picker: QuantityPicker::new(),
            submitting: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &OrderState {
        &self.state
    }

    #[inline]
    #[must_use]
    pub fn cart(&self) -> &CartLedger {
        &self.state.cart
    }

    #[inline]
    #[must_use]
    pub fn step(&self) -> OrderStep {
        self.wizard.current()
    }

    #[inline]
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// +/- on a menu card; returns the pending quantity
    pub fn adjust_quantity(&mut self, id: MenuItemId, delta: i32) -> u32 {
        self.picker.adjust(id, delta)
    }

    #[must_use]
    pub fn pending_quantity(&self, id: MenuItemId) -> u32 {
        self.picker.get(id)
    }

    pub fn set_customization(&mut self, customization: Customization) {
        self.state.customization = customization;
    }

    /// Move the pending quantity of `item` into the cart
    pub fn add_to_cart(&mut self, item: &MenuItem) -> Result<Added, ValidationError> {
        let quantity = self.picker.get(item.id);
        let outcome = self
            .state
            .cart
            .add_item(item, quantity, self.state.customization.clone())?;
        self.picker.take(item.id);
        Ok(Added { quantity, outcome })
    }

    pub fn set_delivery(&mut self, option: DeliveryOption) {
        self.state.cart.set_delivery(option);
    }

    pub fn update_payment(&mut self, payment: PaymentDetails) {
        self.state.payment = payment;
    }

    pub fn go_to(&mut self, step: OrderStep) -> Result<Transition<OrderStep>, ValidationError> {
        self.wizard.go_to(step, &self.state)
    }

    pub fn go_to_number(
        &mut self,
        number: u8,
    ) -> Option<Result<Transition<OrderStep>, ValidationError>> {
        self.wizard.go_to_number(number, &self.state)
    }

    pub fn next(&mut self) -> Result<Transition<OrderStep>, ValidationError> {
        self.wizard.next(&self.state)
    }

    pub fn back(&mut self) -> Transition<OrderStep> {
        self.wizard.back()
    }

    #[must_use]
    pub fn indicator(&self) -> Vec<StepMarker> {
        self.wizard.indicator()
    }

    /// Check cart and payment, then freeze the order
    pub fn begin_submission(&mut self) -> Result<OrderRequest, ValidationError> {
        if self.submitting {
            return Err(ValidationError::SubmissionInFlight);
        }
        if self.state.cart.is_empty() {
            return Err(ValidationError::EmptyCart);
        }
        // field detail stays with PaymentDetails::validate
        self.state
            .payment
            .validate()
            .map_err(|_| ValidationError::PaymentIncomplete)?;
        self.submitting = true;
        Ok(OrderRequest {
            items: self.state.cart.items().to_vec(),
            delivery: self.state.cart.delivery(),
            totals: self.state.cart.totals(),
            card: self.state.payment.masked_number(),
        })
    }

    /// Order accepted: empty the cart and start over
    pub fn complete_submission(&mut self, order_id: String, request: OrderRequest) -> OrderReceipt {
        tracing::info!(%order_id, total = %request.totals.total, "order placed");
        self.state.cart.clear();
        self.state.payment = PaymentDetails::default();
        self.state.customization = Customization::default();
        self.wizard.reset();
        self.submitting = false;
        OrderReceipt { order_id, request }
    }

    pub fn abort_submission(&mut self) {
        self.submitting = false;
    }
}
