use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use medid_ids::IdConfig;

/// Main entry point for the MedID service
///
/// Resolves configuration once, then serves the REST API (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `MEDID_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDID_SEQUENCE_SOURCE`: `random` or `counter` (default: "random")
/// - `MEDID_SEQUENCE_START`: first sequence handed out by the counter source (default: 1)
///
/// Variables may also be supplied through a `.env` file.
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - a configuration value cannot be parsed,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("medid=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("MEDID_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;

    let cfg = IdConfig::from_env_values(
        std::env::var("MEDID_SEQUENCE_SOURCE").ok(),
        std::env::var("MEDID_SEQUENCE_START").ok(),
    )?;

    tracing::info!(
        sequence_source = %cfg.sequence_source(),
        sequence_start = cfg.sequence_start(),
        "++ Starting MedID REST on {}",
        rest_addr
    );

    let app = api_rest::router(AppState::new(cfg.build_service()));

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
