use clap::Parser;
use r2d2::Pool;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use flights_text2sql::config::{AppConfig, CliArgs, Command};
use flights_text2sql::db::db_pool::DuckDBConnectionManager;
use flights_text2sql::db::executor::DuckDbExecutor;
use flights_text2sql::ingest::IngestManager;
use flights_text2sql::llm::LlmManager;
use flights_text2sql::util::logging::init_tracing;
use flights_text2sql::web::{self, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional
    dotenv::dotenv().ok();

    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Ensure data directory exists
    let data_dir = PathBuf::from(&config.data_dir);
    if !data_dir.exists() {
        info!("Creating data directory: {}", config.data_dir);
        std::fs::create_dir_all(&data_dir)?;
    }

    info!(
        "Initializing DuckDB connection pool for {}",
        config.database.connection_string
    );
    let db_manager = DuckDBConnectionManager::open(&config.database.connection_string)?;
    let pool = Pool::builder()
        .max_size(config.database.pool_size as u32)
        .build(db_manager)?;

    match args.command.clone().unwrap_or(Command::Serve) {
        Command::CreateTables => {
            IngestManager::new(pool).create_tables()?;
            info!("Tables created");
        }
        Command::LoadData { dir } => {
            let dir = dir.unwrap_or(data_dir);
            info!("Loading dataset from {}", dir.display());
            let loaded = IngestManager::new(pool).load_dataset(&dir)?;
            for (table, rows) in loaded {
                info!("{}: {} rows", table, rows);
            }
        }
        Command::Serve => {
            info!("Initializing LLM manager with backend: {}", config.llm.backend);
            let llm_manager = Arc::new(LlmManager::new(&config.llm)?);
            info!(
                "Using {} backend with model {}",
                llm_manager.backend(),
                llm_manager.model()
            );
            let executor = Arc::new(DuckDbExecutor::new(pool));

            let app_state = Arc::new(AppState::new(config.clone(), llm_manager, executor)?);

            // Start the web server
            info!("Starting server on {}:{}", config.web.host, config.web.port);
            match web::run_server(config.web, app_state).await {
                Ok(_) => info!("Server stopped gracefully"),
                Err(e) => {
                    error!("Server error: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
