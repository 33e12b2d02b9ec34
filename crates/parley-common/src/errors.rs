use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("credential store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store format error: {0}")]
    Format(String),

    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("ai.temperature = 3 is out of range".into());
        assert_eq!(
            err.to_string(),
            "config validation error: ai.temperature = 3 is out of range"
        );
    }

    #[test]
    fn credential_error_display() {
        let err = CredentialError::Format("expected a JSON object".into());
        assert_eq!(
            err.to_string(),
            "credential store format error: expected a JSON object"
        );

        let err = CredentialError::Unavailable("no config directory".into());
        assert_eq!(
            err.to_string(),
            "credential store unavailable: no config directory"
        );
    }

    #[test]
    fn credential_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CredentialError = io_err.into();
        assert!(matches!(err, CredentialError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }
}
