mod cli;
mod render;
mod repl;

use std::io::{BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use parley_ai::{OpenAiClient, OpenAiConfig, Session, SessionConfig};
use parley_common::{CredentialStore, API_KEY_ENTRY};
use parley_config::{AiConfig, FileCredentialStore, LogLevel, ParleyConfig};
use tracing_subscriber::EnvFilter;

use cli::Command;

fn init_logging(directive: &str) {
    let filter =
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The `--log-level` flag wins, then `RUST_LOG`, then the config file.
fn log_directive(flag: Option<&str>, env: Option<String>, config_level: LogLevel) -> String {
    flag.map(str::to_string)
        .or(env)
        .unwrap_or_else(|| config_level.as_directive().to_string())
}

fn session_config(ai: &AiConfig) -> SessionConfig {
    SessionConfig::default()
        .with_model(&ai.model)
        .with_temperature(ai.temperature)
        .with_max_tokens(Some(ai.max_tokens))
        .with_system_prompt(&ai.system_prompt)
}

fn client_config(ai: &AiConfig) -> OpenAiConfig {
    OpenAiConfig::new(&ai.base_url)
        .with_connect_timeout(Duration::from_secs(ai.connect_timeout_secs.into()))
        .with_request_timeout(Duration::from_secs(ai.request_timeout_secs.into()))
}

fn read_key_from_stdin() -> anyhow::Result<String> {
    print!("API key: ");
    std::io::stdout().flush()?;
    let mut key = String::new();
    std::io::stdin().lock().read_line(&mut key)?;
    Ok(key)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = cli::parse();

    // Load config before logging so its level can seed the filter.
    let loaded = match args.config.as_deref() {
        Some(path) => parley_config::load_config_from(Path::new(path)),
        None => parley_config::load_config(),
    };
    let config_level = loaded
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();

    let directive = log_directive(
        args.log_level.as_deref(),
        std::env::var("RUST_LOG").ok(),
        config_level,
    );
    init_logging(&directive);

    tracing::info!("Parley v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        ParleyConfig::default()
    });
    tracing::info!("Config loaded (model: {})", config.ai.model);

    if args.command() == &Command::ShowConfig {
        println!("{}", parley_config::config_to_json(&config));
        return Ok(ExitCode::SUCCESS);
    }

    let store = FileCredentialStore::open_default().context("failed to open credential store")?;
    let credentials: Arc<dyn CredentialStore> = Arc::new(store);

    let client = OpenAiClient::new(client_config(&config.ai)).context("failed to create client")?;
    let session = Session::new(
        Arc::new(client),
        credentials.clone(),
        session_config(&config.ai),
    );
    tracing::debug!(session = %session.id(), "session created");

    match args.command() {
        Command::Chat => {
            repl::run(&session).await?;
        }
        Command::SetKey { key } => {
            let key = match key {
                Some(key) => key.clone(),
                None => read_key_from_stdin()?,
            };
            let key = key.trim();
            if key.is_empty() {
                eprintln!("No API key given.");
                return Ok(ExitCode::FAILURE);
            }
            credentials
                .set(API_KEY_ENTRY, key)
                .context("failed to store API key")?;
            println!("API key saved.");
        }
        // Printed before the session is built.
        Command::ShowConfig => {}
        Command::TestConnection => {
            if session.test_connection().await {
                println!("connected");
            } else {
                eprintln!("connection failed");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}
