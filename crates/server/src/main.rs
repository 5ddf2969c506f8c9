use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squish_core::{
    load_config_or_default, validate_config, FfmpegTranscoder, InMemoryStats, LocalTransport,
    MediaPipeline, Transcoder,
};
use squish_server::api::create_router;
use squish_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SQUISH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Limits: {} files/hour, {} files/day, {} concurrent jobs",
        config.limits.max_files_per_hour,
        config.limits.max_files_per_day,
        config.scheduler.max_concurrent
    );

    // Transcoder
    let transcoder = Arc::new(FfmpegTranscoder::new(config.transcoder.clone()));
    match transcoder.validate().await {
        Ok(()) => info!("Transcoder available at {:?}", config.transcoder.ffmpeg_path),
        Err(e) => warn!("{}; audio will be returned uncompressed, video will fail", e),
    }

    // Filesystem transport
    for dir in [&config.transport.inbox_dir, &config.transport.outbox_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {:?}", dir))?;
    }
    let transport = Arc::new(LocalTransport::new(config.transport.clone()));
    info!(
        "Inbox: {:?}, outbox: {:?}",
        config.transport.inbox_dir, config.transport.outbox_dir
    );

    let stats = Arc::new(InMemoryStats::new());

    // Pipeline
    let pipeline = Arc::new(MediaPipeline::new(
        &config,
        transcoder,
        transport.clone(),
        stats.clone(),
    ));
    pipeline.start().await;
    info!("Media pipeline started");

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&pipeline),
        transport,
        stats,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    pipeline.stop().await;
    let cancelled = pipeline.cancel_all().await;
    if cancelled > 0 {
        info!("Cancelled {} outstanding jobs", cancelled);
        // Let running jobs unwind so their workspaces are removed.
        for _ in 0..50 {
            if pipeline.status().await.scheduler.active_jobs == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
