use axum::{routing::{get, post}, Router};
use crate::controllers::solar_controller::{get_health, get_solar_data, post_estimate};
use crate::shared_state::AppState;

/// Build the `/api/*` sub-router.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/solar-data", get(get_solar_data))
        .route("/estimate",   post(post_estimate))
        .route("/health",     get(get_health))
        .with_state(state)
}
