//! Handcast Daemon - Main entry point
//!
//! Accepts hand landmark frames from the inference side, derives finger
//! bend transitions and broadcasts them to WebSocket listeners.

mod api;
mod broadcast;
mod config;
mod pipeline;
mod replay;
mod server;
mod state;
mod ws;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "handcast")]
#[command(about = "Hand gesture state broadcast daemon")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "handcast.toml")]
    config: PathBuf,

    /// Bind address for the broadcast server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Replay a JSON-lines frame file, print emitted messages and exit
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", config::default_config_toml()?);
        return Ok(());
    }

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so replay output on stdout stays clean
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Handcast v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Override bind address if specified
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    info!(
        bind = %config.server.bind,
        wire_format = ?config.server.wire_format,
        snapshot_on_connect = config.server.snapshot_on_connect,
        "Configuration loaded"
    );

    if let Some(path) = args.replay {
        // Offline mode
        let (summary, _) = replay::run(&path, &config, std::io::stdout()).await?;
        info!(
            frames = summary.frames,
            malformed = summary.malformed,
            hands_skipped = summary.hands_skipped,
            "Replay finished"
        );
    } else {
        // Daemon mode - run broadcast server and pipeline
        let state = state::AppState::new(config.clone())?;
        server::run(state, &config.server.bind).await?;
    }

    Ok(())
}
