use clap::{Parser, Subcommand};

/// Parley: a terminal chat client for OpenAI-compatible APIs.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log filter override (error, warn, info, debug, trace, or a full
    /// `RUST_LOG`-style directive).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start an interactive chat (the default).
    Chat,
    /// Store the API key. Reads it from stdin when omitted.
    SetKey { key: Option<String> },
    /// Check that the configured key can reach the provider.
    TestConnection,
    /// Print the effective configuration as JSON.
    ShowConfig,
}

impl Args {
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Chat)
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_chat() {
        let args = Args::try_parse_from(["parley"]).unwrap();
        assert_eq!(args.command(), &Command::Chat);
        assert!(args.config.is_none());
    }

    #[test]
    fn set_key_with_inline_value() {
        let args = Args::try_parse_from(["parley", "set-key", "sk-abc"]).unwrap();
        assert_eq!(
            args.command(),
            &Command::SetKey {
                key: Some("sk-abc".into())
            }
        );
    }

    #[test]
    fn set_key_without_value_reads_stdin() {
        let args = Args::try_parse_from(["parley", "set-key"]).unwrap();
        assert_eq!(args.command(), &Command::SetKey { key: None });
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "parley",
            "test-connection",
            "--log-level",
            "debug",
            "--config",
            "/tmp/parley.toml",
        ])
        .unwrap();
        assert_eq!(args.command(), &Command::TestConnection);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.config.as_deref(), Some("/tmp/parley.toml"));
    }

    #[test]
    fn show_config_subcommand() {
        let args = Args::try_parse_from(["parley", "show-config"]).unwrap();
        assert_eq!(args.command(), &Command::ShowConfig);
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Args::try_parse_from(["parley", "frobnicate"]).is_err());
    }
}
