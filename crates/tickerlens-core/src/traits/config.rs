//! Validation for settings structs.

use crate::error::SettingsError;

/// Settings that can check their own values before use.
pub trait ValidateConfig {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), SettingsError>;
}
