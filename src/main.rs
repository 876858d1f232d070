use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use cabinet::web::handlers::AppState;
use cabinet::web::WebServer;
use cabinet::{Config, Database, FileStorage};

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = cabinet::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        cabinet::logging::init_console_only(&config.logging.level);
    }

    info!("Cabinet file service");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> cabinet::Result<()> {
    config.validate()?;

    let db = Database::open(&config.database.path).await?;
    let storage = FileStorage::new(&config.files.storage_path)?;
    info!("File storage at {}", config.files.storage_path);

    let state =
        AppState::new(Arc::new(db), Arc::new(storage)).with_files_config(&config.files);

    WebServer::new(&config.web, state)?.run().await
}
