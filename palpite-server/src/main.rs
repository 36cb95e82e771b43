mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use palpite_core::{PalpiteError, ServiceConfig, Storage};
use palpite_server::config::default_data_dir;
use palpite_server::{AppState, ServerConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "palpiteiro")]
#[command(about = "Palpiteiro - Lotofácil number suggestions with a simulated PIX checkout")]
#[command(version)]
struct Cli {
    /// Data directory for the record database
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Service configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 5000)]
        port: u16,
    },
    /// Draw number sets without storing them
    Generate {
        /// Use the premium (banded) policy
        #[arg(long)]
        premium: bool,
        /// How many sets to draw
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Inspect or purge stored payments and number sets
    #[command(subcommand)]
    Records(commands::RecordCommands),
}

async fn load_service_config(path: Option<&Path>) -> anyhow::Result<ServiceConfig> {
    match path {
        Some(path) => ServiceConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ServiceConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "palpiteiro={},palpite_server={},palpite_core={},tracing_actix_web={}",
            log_level, log_level, log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let service_config = load_service_config(cli.config.as_deref()).await?;

    let result = match cli.command {
        Commands::Serve { bind, port } => {
            let server_config = ServerConfig {
                bind,
                port,
                data_dir,
            };
            let state = AppState::open(&server_config.db_path(), service_config).await?;
            palpite_server::serve(&server_config, state).await?;
            Ok(())
        }
        Commands::Generate { premium, count } => {
            commands::handle_generate_command(&service_config, premium, count)
        }
        Commands::Records(cmd) => {
            let storage = Storage::new(&data_dir.join(palpite_core::DB_FILE_NAME)).await?;
            commands::handle_records_command(cmd, &storage).await
        }
    };

    if let Err(e) = result {
        match e {
            PalpiteError::NumberSetNotFound { id } => {
                eprintln!("Error: Number set '{}' not found", id);
                eprintln!("Use 'palpiteiro records numbers' to see stored sets");
            }
            PalpiteError::Config(msg) => {
                eprintln!("Error: Invalid configuration: {}", msg);
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
