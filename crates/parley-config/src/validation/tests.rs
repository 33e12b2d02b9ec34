//! Tests for the full validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    let config = ParleyConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_temperature_too_high() {
    let mut config = ParleyConfig::default();
    config.ai.temperature = 2.5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("ai.temperature"));
}

#[test]
fn catches_negative_temperature() {
    let mut config = ParleyConfig::default();
    config.ai.temperature = -0.1;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("ai.temperature"));
}

#[test]
fn nan_temperature_is_rejected() {
    let mut config = ParleyConfig::default();
    config.ai.temperature = f64::NAN;
    assert!(validate(&config).is_err());
}

#[test]
fn catches_zero_max_tokens() {
    let mut config = ParleyConfig::default();
    config.ai.max_tokens = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("ai.max_tokens"));
}

#[test]
fn catches_blank_model() {
    let mut config = ParleyConfig::default();
    config.ai.model = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("ai.model must not be empty"));
}

#[test]
fn catches_non_http_base_url() {
    let mut config = ParleyConfig::default();
    config.ai.base_url = "ftp://example.com".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("ai.base_url"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = ParleyConfig::default();
    config.ai.temperature = 9.0;
    config.ai.request_timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("ai.temperature"));
    assert!(err.contains("ai.request_timeout_secs"));
    assert!(err.contains("; "));
}

#[test]
fn boundary_values_are_accepted() {
    let mut config = ParleyConfig::default();
    config.ai.temperature = 0.0;
    config.ai.max_tokens = 1;
    config.ai.connect_timeout_secs = 120;
    config.ai.request_timeout_secs = 600;
    assert!(validate(&config).is_ok());
}
