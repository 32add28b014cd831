//! hcd-server: clinical record middleware binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hcd_server::config::Config;
use hcd_server::db::{PgPatientStore, create_pool};
use hcd_server::fhir::FhirClient;
use hcd_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;

    // Storage and FHIR dependencies, built once and shared read-only
    let pool = create_pool(&config.database).context("Failed to create database pool")?;
    let fhir = FhirClient::new(&config.fhir).context("Failed to create FHIR client")?;

    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY not set, signing tokens with the built-in development secret");
    }
    tracing::info!(
        algorithm = ?config.auth.algorithm,
        ttl_minutes = config.auth.access_token_expire_minutes,
        "Token signing configured"
    );
    tracing::info!("FHIR server: {}", fhir.base_url());
    tracing::info!("Rate limiting: {} requests/second", config.rate_limit_rps);

    let state = AppState::new(
        Arc::new(PgPatientStore::new(pool)),
        Arc::new(fhir),
        config.paging,
    );

    // Build application
    let app = hcd_server::build_app(state, &config);

    // Start server
    let addr: SocketAddr = config
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address))?;
    tracing::info!("Starting clinical record API on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
