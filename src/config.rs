use clap::{Parser, Subcommand};
use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub connection_string: String,
    pub pool_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "gemini", "remote", or "ollama"
    pub model: String,   // Model name
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub llm: LlmConfig,
    pub data_dir: String,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the dataset CSV files
    #[arg(long)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the chat web server (default)
    Serve,
    /// Drop and recreate the airlines, airports and flights tables
    CreateTables,
    /// Replace the dataset tables with the contents of their CSV files
    LoadData {
        /// Directory containing airlines.csv, airports.csv and flights.csv
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

const DEFAULT_LOCATIONS: [&str; 3] = [
    "config.toml",
    "config/config.toml",
    "/etc/flights-text2sql/config.toml",
];

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        Self::load(args, None)
    }

    /// `env` replaces the process environment when given.
    fn load(args: &CliArgs, env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        // Defaults first so every source is optional
        let mut config_builder = Config::builder()
            .set_default("database.connection_string", defaults.database.connection_string)?
            .set_default("database.pool_size", defaults.database.pool_size as u64)?
            .set_default("web.host", defaults.web.host)?
            .set_default("web.port", defaults.web.port as u64)?
            .set_default("web.cors_origins", defaults.web.cors_origins)?
            .set_default("llm.backend", defaults.llm.backend)?
            .set_default("llm.model", defaults.llm.model)?
            .set_default("llm.timeout_secs", defaults.llm.timeout_secs)?
            .set_default("data_dir", defaults.data_dir)?;

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            for location in DEFAULT_LOCATIONS {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // e.g. TEXT2SQL_LLM__API_KEY, TEXT2SQL_WEB__PORT
        config_builder = config_builder.add_source(
            Environment::with_prefix("TEXT2SQL")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("web.cors_origins")
                .try_parsing(true)
                .source(env),
        );

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("GOOGLE_API_KEY").ok();
        }

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }
        if let Some(data_dir) = &args.data_dir {
            config.data_dir = data_dir.clone();
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                connection_string: "flights.duckdb".to_string(),
                pool_size: 5,
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                cors_origins: vec!["*".to_string()],
            },
            llm: LlmConfig {
                backend: "gemini".to_string(),
                model: "gemini-2.0-flash".to_string(),
                api_key: None,
                api_url: None,
                timeout_secs: 600,
            },
            data_dir: "data".to_string(),
        }
    }
}
