//! Gateway Entry Point
//!
//! Loads configuration, connects the credential store, and serves the auth
//! router over plain HTTP (dev) or TLS (prod).
//! Uses `anyhow` for startup errors; request-level errors go through
//! `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;

use auth::{PgAuthRepository, auth_router};
use axum::Router;
use axum::http::Method;
use platform::config::Env;
use platform::tls::{TlsListener, load_server_config};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::GatewayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = GatewayConfig::from_env(&Env::process())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.auth.uses_development_secret() {
        tracing::warn!("JWT_KEY not set, signing tokens with the development secret");
    }

    // Database connection
    let repo =
        PgAuthRepository::connect(&config.database_url, config.database_max_connections).await?;

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(repo.pool())
        .await?;

    tracing::info!("Migrations completed");

    let app = with_http_layers(auth_router(repo, config.auth.clone())?);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    match &config.tls {
        None => {
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(
                %addr,
                exposed_port = config.exposed_port,
                "Listening (HTTP)"
            );
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Some(files) => {
            let tls = load_server_config(files)?;
            let listener = TlsListener::bind(addr, tls).await?;
            tracing::info!(
                %addr,
                exposed_port = config.exposed_port,
                "Listening (HTTPS)"
            );
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Request tracing and permissive CORS around the auth router
fn with_http_layers(router: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    router.layer(TraceLayer::new_for_http()).layer(cors)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
