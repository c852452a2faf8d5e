//! assistant-audio - Main entry point
//!
//! Recomputes BPM and initial key for the tracks under a path, compares them
//! with the stored tags and optionally writes the computed values back.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assistant_audio::error::SetupError;
use assistant_audio::services::{
    BackendClient, IgnoreRules, LoftyTagStore, PathEnumerator, ReconcilePolicy, Reconciler,
};
use assistant_audio::workflow::{Pipeline, RunSummary};
use assistant_common::config::{self, LoggingConfig, TomlConfig};

/// Command-line arguments for assistant-audio
#[derive(Parser, Debug)]
#[command(name = "assistant-audio")]
#[command(about = "Calculate BPM and initial key for audio tracks and reconcile them with tags")]
#[command(version)]
struct Args {
    /// File or directory to process (defaults to the collection root)
    pathname: Option<PathBuf>,

    /// Skip tracks that already have bpm and initial_key tags
    #[arg(short = 's', long)]
    skip_calculated: bool,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Write calculated audio data back to the tags
    #[arg(short, long)]
    write_data: bool,

    /// Collection root directory
    #[arg(long)]
    root_dir: Option<PathBuf>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analysis backend base URL
    #[arg(long, env = "ASSISTANT_BACKEND_URL")]
    backend_url: Option<String>,

    /// Number of tracks processed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    stats_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded =
        config::load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    let created_log_dir =
        init_tracing(&loaded.config.logging).context("Failed to initialize logging")?;

    // Nothing before this point reaches the subscriber
    loaded.source.log();
    if let Some(dir) = created_log_dir {
        info!("Created directory {}", dir.display());
    }

    let summary = run(&args, &loaded.config).await?;

    info!("{}", summary.stats);

    if let Some(stats_file) = &args.stats_file {
        write_summary(stats_file, &summary)?;
    }

    Ok(())
}

async fn run(args: &Args, toml_config: &TomlConfig) -> Result<RunSummary> {
    let collection_root = config::resolve_root_dir(args.root_dir.as_deref(), toml_config);
    let pathname = args
        .pathname
        .clone()
        .unwrap_or_else(|| collection_root.clone());
    let concurrency = args
        .concurrency
        .unwrap_or(toml_config.pipeline.concurrency)
        .max(1);
    let backend_url = args
        .backend_url
        .clone()
        .unwrap_or_else(|| toml_config.backend.url.clone());

    info!(
        pathname = %pathname.display(),
        collection_root = %collection_root.display(),
        skip_calculated = args.skip_calculated,
        recursive = args.recursive,
        write_data = args.write_data,
        concurrency,
        backend_url = %backend_url,
        "Task executed"
    );

    if let Some(stats_file) = &args.stats_file {
        let created = config::ensure_parent_dir(stats_file)
            .map_err(SetupError::from)
            .context("Failed to prepare stats file")?;
        if let Some(dir) = created {
            info!("Created directory {}", dir.display());
        }
    }

    let ignore_rules = IgnoreRules::from_config(&collection_root, &toml_config.collection.ignore);
    let enumerator = PathEnumerator::new(&collection_root, Arc::new(ignore_rules));
    let entries = enumerator
        .enumerate(&pathname, args.recursive)
        .context("Failed to enumerate tracks")?;

    let backend = BackendClient::new(
        &backend_url,
        Duration::from_secs(toml_config.backend.timeout_secs),
    )
    .context("Failed to create backend client")?;

    let reconciler = Reconciler::new(ReconcilePolicy {
        skip_too_long: true,
        max_track_minutes: toml_config.pipeline.max_track_minutes,
        skip_already_calculated: args.skip_calculated,
        write_data: args.write_data,
    });

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let pipeline = Pipeline::new(Arc::new(backend), Arc::new(LoftyTagStore::new()), reconciler)
        .with_concurrency(concurrency)
        .with_cancellation(cancel);

    Ok(pipeline.run(entries).await)
}

/// Install the global subscriber
///
/// Returns the log file directory when it had to be created.
fn init_tracing(logging: &LoggingConfig) -> Result<Option<PathBuf>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.as_str().into());

    let mut created_dir = None;
    let file_layer = match &logging.file {
        Some(path) => {
            created_dir = config::ensure_parent_dir(path)?;
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(created_dir)
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write stats file {}", path.display()))?;
    info!(path = %path.display(), "Run summary written");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, finishing current track");
        },
        _ = terminate => {
            info!("Received terminate signal, finishing current track");
        },
    }
}
