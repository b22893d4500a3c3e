//! Shop configuration
//!
//! Defaults reproduce the live Brew & Co. site. Deployments override them
//! from a TOML or JSON document:
//!
//! ```toml
//! business_name = "Brew & Co."
//! tax_rate = 0.08
//! delivery_fee = 3.99
//!
//! [hours]
//! opening_hour = 7
//! closing_hour = 21
//! slot_minutes = 30
//! ```

use crate::error::ConfigError;
use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Shop-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Name used in invites and notifications
    pub business_name: String,
    /// Street address printed in calendar invites
    pub location: String,
    /// Sales tax applied to the cart subtotal
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    /// Flat fee charged when the order is delivered
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    /// Hours during which reservations can start
    pub hours: BusinessHours,
    /// How long a table is held, used for the invite end time
    pub reservation_minutes: u32,
    /// Offset of the shop's wall clock from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// Party size preselected when a reservation starts
    pub default_party_size: u8,
    /// Largest party that can book online
    pub max_party_size: u8,
    /// Time between order-tracking stage updates
    pub tracking_interval_ms: u64,
    /// Lifetime of a notification toast
    pub notification_ttl_ms: u64,
    /// Gateway retry policy
    pub submission: SubmissionPolicy,
}

impl ShopConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a different tax rate
    #[inline]
    #[must_use]
    pub fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// With a different delivery fee
    #[inline]
    #[must_use]
    pub fn with_delivery_fee(mut self, fee: Money) -> Self {
        self.delivery_fee = fee.amount();
        self
    }

    /// With different business hours
    #[inline]
    #[must_use]
    pub fn with_hours(mut self, hours: BusinessHours) -> Self {
        self.hours = hours;
        self
    }

    /// With the shop clock offset from UTC
    #[inline]
    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// With a different submission policy
    #[inline]
    #[must_use]
    pub fn with_submission(mut self, policy: SubmissionPolicy) -> Self {
        self.submission = policy;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&source)?,
            _ => Self::from_toml_str(&source)?,
        };
        tracing::debug!(path = %path.display(), "loaded shop configuration");
        Ok(config)
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hours.validate()?;
        if self.tax_rate.is_sign_negative() && !self.tax_rate.is_zero() {
            return Err(ConfigError::NegativeAmount { field: "tax_rate" });
        }
        if self.delivery_fee.is_sign_negative() && !self.delivery_fee.is_zero() {
            return Err(ConfigError::NegativeAmount {
                field: "delivery_fee",
            });
        }
        if self.default_party_size == 0 || self.default_party_size > self.max_party_size {
            return Err(ConfigError::InvalidPartySize {
                default: self.default_party_size,
                max: self.max_party_size,
            });
        }
        if self.reservation_minutes == 0 {
            return Err(ConfigError::ZeroDuration("reservation_minutes"));
        }
        if self.tracking_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("tracking_interval_ms"));
        }
        self.submission.validate()
    }

    #[inline]
    #[must_use]
    pub fn delivery_fee(&self) -> Money {
        Money(self.delivery_fee)
    }

    #[inline]
    #[must_use]
    pub fn tracking_interval(&self) -> Duration {
        Duration::from_millis(self.tracking_interval_ms)
    }

    #[inline]
    #[must_use]
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            business_name: "Brew & Co.".to_string(),
            location: "123 Coffee Street, Brew City".to_string(),
            tax_rate: Decimal::new(8, 2),
            delivery_fee: Decimal::new(399, 2),
            hours: BusinessHours::default(),
            reservation_minutes: 120,
            utc_offset_minutes: 0,
            default_party_size: 2,
            max_party_size: 12,
            tracking_interval_ms: 3_000,
            notification_ttl_ms: 3_000,
            submission: SubmissionPolicy::default(),
        }
    }
}

/// Opening hours for reservations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessHours {
    /// First bookable hour (inclusive)
    pub opening_hour: u32,
    /// Closing hour (exclusive), the last slot starts before it
    pub closing_hour: u32,
    /// Slot spacing in minutes, 30 or 60
    pub slot_minutes: u32,
}

impl BusinessHours {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.opening_hour >= self.closing_hour || self.closing_hour > 24 {
            return Err(ConfigError::InvalidHours {
                opening: self.opening_hour,
                closing: self.closing_hour,
            });
        }
        // slots start on the hour or the half hour
        if !matches!(self.slot_minutes, 30 | 60) {
            return Err(ConfigError::InvalidSlotLength(self.slot_minutes));
        }
        Ok(())
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            opening_hour: 7,
            closing_hour: 21,
            slot_minutes: 30,
        }
    }
}

/// Timeout and retry policy for gateway submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionPolicy {
    /// Delay of the bundled simulated gateway
    pub simulated_latency_ms: u64,
    /// Per-attempt timeout
    pub attempt_timeout_ms: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// First backoff delay, doubled after every failed attempt
    pub base_backoff_ms: u64,
    /// Upper bound for a single backoff delay
    pub max_backoff_ms: u64,
}

impl SubmissionPolicy {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.attempt_timeout_ms == 0 {
            return Err(ConfigError::ZeroDuration("submission.attempt_timeout_ms"));
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    #[inline]
    #[must_use]
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// Delay before retry number `retry` (0-based)
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        let delay = self.base_backoff_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_backoff_ms))
    }
}

impl Default for SubmissionPolicy {
    fn default() -> Self {
        Self {
            simulated_latency_ms: 2_000,
            attempt_timeout_ms: 10_000,
            max_retries: 3,
            base_backoff_ms: 250,
            max_backoff_ms: 4_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_site() {
        let config = ShopConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.delivery_fee(), Money::from_cents(399));
        assert_eq!(config.tax_rate, Decimal::new(8, 2));
        assert_eq!(config.hours.opening_hour, 7);
        assert_eq!(config.hours.closing_hour, 21);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ShopConfig::from_toml_str(
            r#"
            business_name = "Brew & Co. Harbour"
            tax_rate = 0.1

            [hours]
            opening_hour = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.business_name, "Brew & Co. Harbour");
        assert_eq!(config.tax_rate, Decimal::new(1, 1));
        assert_eq!(config.hours.opening_hour, 8);
        assert_eq!(config.hours.closing_hour, 21);
        assert_eq!(config.delivery_fee(), Money::from_cents(399));
    }

    #[test]
    fn json_is_accepted() {
        let config = ShopConfig::from_json_str(r#"{"delivery_fee": 4.5}"#).unwrap();
        assert_eq!(config.delivery_fee(), Money::from_cents(450));
    }

    #[test]
    fn rejects_inverted_hours() {
        let err = ShopConfig::from_toml_str("[hours]\nopening_hour = 22\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHours { .. }));
    }

    #[test]
    fn rejects_uneven_slots() {
        let err = ShopConfig::from_toml_str("[hours]\nslot_minutes = 25\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSlotLength(25)));
    }

    #[test]
    fn rejects_slots_off_the_half_hour() {
        for minutes in [0, 5, 10, 12, 15, 20] {
            let err = ShopConfig::from_toml_str(&format!("[hours]\nslot_minutes = {minutes}\n"))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidSlotLength(m) if m == minutes));
        }
        let hourly = ShopConfig::from_toml_str("[hours]\nslot_minutes = 60\n").unwrap();
        assert_eq!(hourly.hours.slot_minutes, 60);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = SubmissionPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(250));
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(10), Duration::from_millis(4_000));
        assert_eq!(policy.backoff(80), Duration::from_millis(4_000));
    }

    #[test]
    fn load_reads_files_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");
        std::fs::write(&path, r#"{"reservation_minutes": 90}"#).unwrap();
        let config = ShopConfig::load(&path).unwrap();
        assert_eq!(config.reservation_minutes, 90);

        let missing = ShopConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
