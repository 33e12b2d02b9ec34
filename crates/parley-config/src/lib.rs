//! Parley configuration system.
//!
//! Provides TOML-based configuration with full validation, plus the
//! file-backed credential store. All config sections use sensible
//! defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use parley_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod credentials;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use credentials::FileCredentialStore;
pub use schema::{AiConfig, LogLevel, LoggingConfig, ParleyConfig};

use parley_common::ConfigError;
use std::path::Path;

/// Load config from the platform default path and validate it.
///
/// Creates a commented default `config.toml` if none exists.
pub fn load_config() -> Result<ParleyConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Load config from an explicit path and validate it.
pub fn load_config_from(path: &Path) -> Result<ParleyConfig, ConfigError> {
    let config = toml_loader::load_from_path(path)?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &ParleyConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
