//! Full configuration validation.
//!
//! Validates numeric ranges and required strings, collecting every
//! problem into a single `ConfigError`.

mod ai;
mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::ParleyConfig;
use parley_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ParleyConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    ai::validate_ai(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
