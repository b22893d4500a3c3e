//! Form field validators shared by the reservation, payment and contact forms

use crate::error::{FieldError, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone pattern is valid"));

static EXPIRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}$").expect("expiry pattern is valid"));

/// Trimmed value must not be empty
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::FieldRequired { field })
    } else {
        Ok(())
    }
}

/// Trimmed value must have at least `min` characters
pub fn min_length(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.trim().chars().count() < min {
        Err(ValidationError::TooShort { field, min })
    } else {
        Ok(())
    }
}

/// `local@domain.tld` without whitespace
pub fn email(value: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(value.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Optional `+`, then up to 16 digits not starting with 0. Spaces, dashes and
/// parentheses are ignored.
pub fn phone(value: &str) -> Result<(), ValidationError> {
    let digits: String = value
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    if PHONE.is_match(&digits) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

/// `MM/YY`
pub(crate) fn card_expiry(value: &str) -> bool {
    EXPIRY.is_match(value.trim())
}

/// Collects field errors so a whole form can be reported at once
#[derive(Debug, Default)]
pub(crate) struct FormCheck {
    errors: Vec<FieldError>,
}

impl FormCheck {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record the first failing check for `field`
    pub(crate) fn field(
        &mut self,
        field: &'static str,
        checks: impl IntoIterator<Item = Result<(), ValidationError>>,
    ) -> &mut Self {
        if let Some(Err(err)) = checks.into_iter().find(Result::is_err) {
            self.errors.push(FieldError::new(field, &err));
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FormIncomplete {
                fields: std::mem::take(&mut self.errors),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(email("ada@example.com").is_ok());
        assert!(email("  ada@example.com ").is_ok());
        assert_eq!(email("ada@example"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("ada @example.com"), Err(ValidationError::InvalidEmail));
        assert_eq!(email(""), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn phone_pattern_ignores_punctuation() {
        assert!(phone("(555) 123-4567").is_ok());
        assert!(phone("+44 20 7946 0958").is_ok());
        assert_eq!(phone("0123456"), Err(ValidationError::InvalidPhone));
        assert_eq!(phone("555-CALL-NOW"), Err(ValidationError::InvalidPhone));
        assert_eq!(phone("12345678901234567"), Err(ValidationError::InvalidPhone));
        // ASCII digits only
        assert_eq!(phone("١٢٣٤٥٦٧"), Err(ValidationError::InvalidPhone));
        assert!(!card_expiry("١٢/٢٧"));
    }

    #[test]
    fn length_counts_trimmed_characters() {
        assert!(min_length("Name", " Al ", 2).is_ok());
        assert_eq!(
            min_length("Name", " A ", 2),
            Err(ValidationError::TooShort { field: "Name", min: 2 })
        );
        assert!(required("Name", "   ").is_err());
    }

    #[test]
    fn form_check_keeps_first_error_per_field() {
        let mut check = FormCheck::new();
        check
            .field("email", [required("email", ""), email("")])
            .field("phone", [required("phone", "555 0100")]);
        let Err(ValidationError::FormIncomplete { fields }) = check.finish() else {
            panic!("expected form errors");
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[0].message, "This field is required: email");
    }
}
