use session_auth::{create_routes, AuthConfig, AuthError, AuthService};

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = AuthConfig::from_env();
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!(
        environment = ?config.environment,
        client_origin = %config.client_origin,
        "Starting session-auth"
    );

    let auth = Arc::new(AuthService::in_memory(config).map_err(log_startup_error)?);
    let app = create_routes(auth).map_err(log_startup_error)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server is listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn log_startup_error(err: AuthError) -> AuthError {
    tracing::error!("Startup failed: {}", err);
    err
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
