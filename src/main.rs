use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use todosync::client::{GatewayClient, HttpClient, LocalClient};
use todosync::config::Config;
use todosync::gateway::{self, Gateway};
use todosync::logger::{self, LogTarget};
use todosync::storage::Store;
use todosync::sync::SyncService;
use todosync::ui;

#[derive(Parser)]
#[command(name = "todosync")]
#[command(version, about = "Multi-project todo list with optimistic sync")]
struct Cli {
    /// Configuration file (defaults to ./todosync.toml, then the XDG config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the Gateway HTTP server
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Run the terminal UI
    Tui {
        /// Use an in-process store instead of a server
        #[arg(long, conflicts_with = "server")]
        embedded: bool,
        /// Server base URL
        #[arg(long)]
        server: Option<String>,
    },
    /// Write a default configuration file
    InitConfig {
        /// Destination (defaults to the XDG config dir)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig { path } = &cli.command {
        let path = match path {
            Some(path) => path.clone(),
            None => Config::get_default_config_path()?,
        };
        return Config::generate_default_config(path);
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Serve { bind, database_url } => {
            logger::init(&config.logging, LogTarget::Stderr)?;
            let bind = bind.unwrap_or_else(|| config.server.bind_address.clone());
            let database_url = database_url.unwrap_or_else(|| config.server.database_url.clone());

            let store = Store::open(&database_url).await?;
            gateway::http::serve(Gateway::new(store), &bind).await
        }
        Command::Tui { embedded, server } => {
            // the TUI owns the terminal
            logger::init(&config.logging, LogTarget::File)?;

            let client: Arc<dyn GatewayClient> = if embedded {
                let store = Store::open(&config.server.database_url).await?;
                Arc::new(LocalClient::new(Gateway::new(store)))
            } else {
                let url = server.unwrap_or_else(|| config.client.server_url.clone());
                Arc::new(HttpClient::new(url).context("Failed to build HTTP client")?)
            };

            ui::run_app(SyncService::new(client), &config).await
        }
        Command::InitConfig { .. } => Ok(()),
    }
}
