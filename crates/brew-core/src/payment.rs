//! Card details captured on the order review step

use crate::error::ValidationError;
use crate::validate::{self, FormCheck};
use serde::{Deserialize, Serialize};

/// Card payment form
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub card_number: String,
    pub card_name: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: String,
}

impl std::fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_number", &self.masked_number())
            .field("card_name", &self.card_name)
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

impl PaymentDetails {
    fn card_digits(&self) -> String {
        self.card_number.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Any field left blank
    #[must_use]
    pub fn is_blank(&self) -> bool {
        [&self.card_number, &self.card_name, &self.expiry, &self.cvv]
            .iter()
            .any(|v| v.trim().is_empty())
    }

    /// Last four digits only, e.g. `**** 4242`
    #[must_use]
    pub fn masked_number(&self) -> String {
        let digits = self.card_digits();
        let tail: String = digits
            .chars()
            .skip(digits.chars().count().saturating_sub(4))
            .collect();
        format!("**** {tail}")
    }

    /// Blank fields yield [`ValidationError::PaymentIncomplete`]; malformed
    /// fields are reported together.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_blank() {
            return Err(ValidationError::PaymentIncomplete);
        }

        let digits = self.card_digits();
        let card_ok = digits.len() >= 16 && digits.chars().all(|c| c.is_ascii_digit());
        let cvv = self.cvv.trim();
        let cvv_ok = (3..=4).contains(&cvv.len()) && cvv.chars().all(|c| c.is_ascii_digit());

        FormCheck::new()
            .field(
                "cardNumber",
                [card_ok.then_some(()).ok_or(ValidationError::InvalidCardNumber)],
            )
            .field("cardName", [validate::min_length("Name on card", &self.card_name, 2)])
            .field(
                "expiry",
                [expiry_month_valid(&self.expiry)
                    .then_some(())
                    .ok_or(ValidationError::InvalidExpiry)],
            )
            .field("cvv", [cvv_ok.then_some(()).ok_or(ValidationError::InvalidCvv)])
            .finish()
    }
}

fn expiry_month_valid(expiry: &str) -> bool {
    validate::card_expiry(expiry)
        && expiry
            .trim()
            .get(..2)
            .and_then(|mm| mm.parse::<u8>().ok())
            .is_some_and(|m| (1..=12).contains(&m))
}
