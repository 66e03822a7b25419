use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use tagvault::{AppState, Config, FileStore, StaticCredentials, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration; only a missing file falls back to defaults
    let mut config = match Config::load_optional("config.toml") {
        Ok(Some(config)) => config,
        Ok(None) => {
            eprintln!("config.toml not found, using default configuration.");
            Config::default()
        }
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.apply_env_overrides();

    // Initialize logging
    if let Err(e) = tagvault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        tagvault::logging::init_console_only(&config.logging.level);
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let store = FileStore::from_config(&config.storage)?;
    info!("Loaded {} file record(s)", store.len().await);

    let credentials = StaticCredentials::from_users(&config.auth.users)?;
    info!("Loaded {} user(s)", credentials.len());

    let state = AppState::new(Arc::new(store), Arc::new(credentials))
        .with_realm(&config.auth.realm)
        .with_max_upload_size(config.storage.max_upload_bytes());

    let server = WebServer::new(&config.server, state)?;
    info!("tagvault starting on {}", server.addr());
    server.run().await?;

    Ok(())
}
