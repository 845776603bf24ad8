mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod errors;

use std::net::SocketAddr;
use std::process::ExitCode;
use axum::{Router, routing::get, response::Html};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;
use crate::api_docs::ApiDoc;
use crate::config::{ApiKey, Config, API_KEY_ENV};
use crate::routes::solar_routes::api_routes;
use crate::services::irradiance_gateway::IrradianceGateway;
use crate::shared_state::AppState;

const CONFIG_PATH_ENV: &str = "SOLAR_CONFIG";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    // 1. Load configuration
    let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load {}: {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Configuration loaded: provider {}", config.provider.base_url);

    // 2. Provider credential, read once
    let api_key = ApiKey::from_env();
    if !api_key.is_configured() {
        warn!("{} is not set; irradiance requests will fail as misconfigured", API_KEY_ENV);
    }

    // 3. Gateway and shared state
    let gateway = match IrradianceGateway::new(&config.provider, api_key) {
        Ok(g) => g,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let state = AppState::new(gateway);

    // 4. Start Axum HTTP server
    let app = Router::new()
        .nest("/api", api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .fallback_service(ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("API Server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    if let Err(e) = axum_server::bind(addr).serve(app.into_make_service()).await {
        error!("HTTP server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
