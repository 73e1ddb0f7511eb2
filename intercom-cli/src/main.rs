use anyhow::{Context, Result};
use axum::{Router, routing::get};
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use intercom::server::{AppState, RoomRouter, SignalingService, ws_handler};

#[derive(Parser)]
#[command(name = "intercom")]
#[command(about = "Two-party voice call signaling relay", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr } => serve(addr).await,
    }
}

async fn serve(addr: SocketAddr) -> Result<()> {
    println!("{}", "📞 Starting Intercom relay...".green().bold());

    let signaling = SignalingService::new();
    let router = RoomRouter::new(Arc::new(signaling.clone()));
    let state = Arc::new(AppState { signaling, router });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws/{peer_id}", get(ws_handler))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Signaling relay listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .context("Relay server failed")?;

    Ok(())
}
