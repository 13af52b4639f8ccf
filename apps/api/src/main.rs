mod analysis;
mod config;
mod document;
mod errors;
mod llm_client;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::session::SessionStore;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing API key)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeATS v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {config:?}");

    // Initialize LLM client
    let llm = LlmClient::new(
        config.completion_api_url.clone(),
        config.perplexity_api_key.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let sessions = SessionStore::new(chrono::Duration::minutes(config.session_ttl_minutes));
    let shutdown = CancellationToken::new();

    // Build app state
    let state = AppState {
        llm: Arc::new(llm),
        sessions: sessions.clone(),
        config: config.clone(),
        shutdown: shutdown.clone(),
    };

    // Sweep idle sessions even when nobody is submitting analyses.
    let sweeper = tokio::spawn(sweep_sessions(sessions, shutdown.clone()));

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    sweeper.await?;
    info!("Shut down cleanly");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and cancels in-flight completion calls.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}

async fn sweep_sessions(sessions: SessionStore, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                let removed = sessions.purge_expired().await;
                if removed > 0 {
                    let active = sessions.active_count().await;
                    tracing::debug!("Purged {removed} idle sessions, {active} active");
                }
            }
        }
    }
}
