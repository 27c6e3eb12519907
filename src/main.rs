//! taskmaster - single-user task tracker
//!
//! Serves a small JSON API over an in-memory task store with per-task time
//! tracking, and runs pomodoro-style focus sessions in the terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod focus;
mod models;
mod sort;
mod store;
mod timer;

use config::Config;
use store::MemoryStore;

#[derive(Parser)]
#[command(name = "taskmaster")]
#[command(about = "Single-user task tracker with time tracking and a focus timer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,

        /// Start with the sample tasks loaded (overrides config)
        #[arg(long)]
        seed_demo: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path for config file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a focus (pomodoro) countdown in the terminal
    Focus {
        /// Session length in minutes (presets: 5, 15, 25)
        #[arg(short, long)]
        minutes: Option<u32>,

        /// Number of sessions to run back to back
        #[arg(short, long, default_value_t = 1)]
        rounds: u32,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("taskmaster=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            port,
            bind,
            seed_demo,
        } => {
            let mut cfg = load_config(config)?;

            // Override with CLI args
            if let Some(p) = port {
                cfg.server.port = p;
            }
            if let Some(b) = bind {
                cfg.server.bind = b;
            }
            if seed_demo {
                cfg.store.seed_demo = true;
            }

            run_server(cfg).await
        }

        Commands::Init { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from("config.toml"));
            let cfg = Config::default();
            cfg.save_to(&path)?;

            println!("Created config file: {}", path.display());
            println!();
            println!("Next steps:");
            println!("  1. Adjust bind address and port in {}", path.display());
            println!(
                "  2. Start the server: taskmaster serve --config {}",
                path.display()
            );

            Ok(())
        }

        Commands::Focus {
            minutes,
            rounds,
            config,
        } => {
            let cfg = load_config(config)?;
            let minutes = minutes.unwrap_or(cfg.focus.default_minutes);
            focus::run(minutes, rounds).await
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(&path),
        None => Config::load(),
    }
}

async fn run_server(config: Config) -> Result<()> {
    let store = MemoryStore::new();
    if config.store.seed_demo {
        store.seed_demo();
    }
    tracing::info!(tasks = store.len(), "Task store ready (in-memory, not persisted)");

    let state = api::AppState::new(store);
    let app = api::create_router(state);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 taskmaster listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
