//! Provider settings validation.

use crate::schema::ParleyConfig;

use super::helpers::{validate_non_blank, validate_range, validate_range_f64};

pub(crate) fn validate_ai(errors: &mut Vec<String>, config: &ParleyConfig) {
    let ai = &config.ai;
    validate_non_blank(errors, "ai.model", &ai.model);
    validate_non_blank(errors, "ai.system_prompt", &ai.system_prompt);
    validate_range_f64(errors, "ai.temperature", ai.temperature, 0.0, 2.0);
    validate_range(errors, "ai.max_tokens", ai.max_tokens, 1, 128_000);
    validate_range(
        errors,
        "ai.connect_timeout_secs",
        ai.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "ai.request_timeout_secs",
        ai.request_timeout_secs,
        1,
        600,
    );

    if !(ai.base_url.starts_with("http://") || ai.base_url.starts_with("https://")) {
        errors.push(format!(
            "ai.base_url = {:?} must start with http:// or https://",
            ai.base_url
        ));
    }
}
