//! Contact form

use crate::error::ValidationError;
use crate::validate::{self, FormCheck};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// All failing fields are reported together
    pub fn validate(&self) -> Result<(), ValidationError> {
        FormCheck::new()
            .field("name", [validate::min_length("Name", &self.name, 2)])
            .field(
                "email",
                [
                    validate::required("email", &self.email),
                    validate::email(&self.email),
                ],
            )
            .field("subject", [validate::required("subject", &self.subject)])
            .field("message", [validate::min_length("Message", &self.message, 10)])
            .finish()
    }
}
