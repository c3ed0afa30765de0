use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use shico_server::config::{NetworkMode, Overrides, ServiceConfig};
use shico_server::server::{serve, AppState};
use shico_tracker::VocabularyMonitor;

#[derive(Parser, Debug)]
#[command(name = "shico-server")]
#[command(about = "Track how the vocabulary around a concept shifts over time")]
struct Args {
    /// Glob matching the word2vec model files [default: word2vecModels/195[0-1]_????.w2v]
    #[arg(short, long)]
    files: Option<String>,

    /// Model files are in text format instead of binary
    #[arg(short, long)]
    non_binary: bool,

    /// Address to listen on [default: 0.0.0.0:5000]
    #[arg(short, long)]
    listen: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How response networks are built
    #[arg(long, value_enum)]
    network_mode: Option<NetworkMode>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        listen: args.listen,
        files: args.files,
        binary: args.non_binary.then_some(false),
        network_mode: args.network_mode,
    };
    let config = ServiceConfig::load(args.config.as_deref(), overrides).context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::debug!(?config, "Configuration loaded");

    let files = config.files.clone();
    let binary = config.binary;
    let monitor = tokio::task::spawn_blocking(move || VocabularyMonitor::load(&files, binary))
        .await
        .context("Model loading task failed")?
        .with_context(|| format!("Failed to load models from '{}'", config.files))?;

    let state = AppState::new(Arc::new(monitor), config.network_mode);
    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    tracing::info!(
        listen = %config.listen,
        network_mode = config.network_mode.as_str(),
        "Serving /track"
    );

    tokio::select! {
        result = serve(listener, state) => result.context("Server stopped")?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
    }

    Ok(())
}
