//! Shooter Server - authoritative multiplayer game server
//!
//! This is the main entry point for the game server. It handles:
//! - WebSocket connections for real-time gameplay
//! - The fixed-rate world simulation loop
//! - Score persistence to Supabase on disconnect

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shooter_server::app::AppState;
use shooter_server::config::Config;
use shooter_server::game::{GameServer, WorldState};
use shooter_server::http::build_router;
use shooter_server::store::{ScoreStore, ScoreWriter};
use shooter_server::util::time::init_server_time;

/// How long queued score saves may take to flush after shutdown
const SCORE_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Initialize server time tracking
    init_server_time();

    info!("Starting Shooter Server");
    info!("Server address: {}", config.server_addr);

    // Scores must be durable: refuse to start without the table
    let score_store = ScoreStore::connect(&config).await.map_err(|e| {
        error!(error = %e, "Score store unreachable");
        e
    })?;
    info!(table = %config.scores_table, "Connected to score store");

    let (score_writer, score_tx) = ScoreWriter::new(score_store);
    let writer_task = tokio::spawn(score_writer.run());

    // Spawn the world loop
    let seed = config.world_seed.unwrap_or_else(rand::random);
    let world = WorldState::new(seed, config.spawn_width, config.spawn_height);
    let (game_server, world_handle) = GameServer::new(world, config.tick_interval, score_tx);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let world_task = tokio::spawn(game_server.run(shutdown_rx));

    // Create application state and router
    let state = AppState::new(config.clone(), world_handle);
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the world so live players are saved, then let the writer flush
    let _ = shutdown_tx.send(true);
    if let Err(e) = world_task.await {
        error!(error = %e, "World loop panicked");
    }
    if tokio::time::timeout(SCORE_DRAIN_TIMEOUT, writer_task).await.is_err() {
        warn!("Timed out flushing score saves");
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
