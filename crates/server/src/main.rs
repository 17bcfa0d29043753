use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::EnvFilter;

mod config;
mod email;
mod routes;
mod team;

use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(config: ServerConfig, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }
}

/// API routes plus the built site; unknown paths get `index.html` so
/// client-side routes survive a reload.
pub fn app(state: AppState) -> Router {
    let site_dir = &state.config.site_dir;
    let site = ServeDir::new(site_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(site_dir.join("index.html")));

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/send-email", post(routes::send_email))
        .route("/api/team", get(routes::team))
        .fallback_service(site)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("server=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(std::io::Error::other)?;

    if config.resend_api_key.is_none() {
        tracing::warn!("RESEND_API_KEY not set, emails will be simulated");
    }
    let port = config.port;
    tracing::info!(site_dir = %config.site_dir.display(), "Serving static site");

    let app = app(AppState::with_client(config, http));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Server running on http://localhost:{port}");
    axum::serve(listener, app).await
}
