//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Parley Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[ai]
# model = "gpt-3.5-turbo"
# base_url = "https://api.openai.com/v1"
# temperature = 0.7          # 0.0-2.0
# max_tokens = 1000          # 1-128000
# system_prompt = "You are a helpful AI assistant. Provide clear, concise, and helpful responses to user questions."
# connect_timeout_secs = 10  # 1-120
# request_timeout_secs = 120 # 1-600

[logging]
# level = "warn"             # error, warn, info, debug, trace
"##
    .to_string()
}
