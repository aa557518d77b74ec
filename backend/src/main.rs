use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod error;
mod routes;
mod store;

use auth::TokenVerifier;
use config::Config;
use routes::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("backend=info")),
        )
        .init();

    let config = Config::from_env();

    let pool = store::connect(&config.database_url)
        .await
        .expect("Failed to open database");

    let verifier = Arc::new(TokenVerifier::new(&config.issuer_url, &config.client_id));
    // Warm the key cache; a failure here is retried on the first request
    // that misses a key id.
    if let Err(err) = verifier.refresh_keys().await {
        tracing::warn!("initial JWKS fetch failed: {err}");
    }

    let app = routes::app(AppState { pool, verifier });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind");
    tracing::info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}
