use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::IntoResponse,
    Json,
};

use crate::errors::{AppError, ErrorBody, GatewayError};
use crate::models::solar::{
    Coordinate, EstimateRequest, EstimateResponse, HealthStatus, SolarDataQuery, SolarDataResponse,
};
use crate::services::{generation_estimator, site_validation};
use crate::shared_state::AppState;

/// GET /api/solar-data
/// Retrieve the past week of estimated-actuals irradiance
///
/// Proxies the irradiance provider for the given coordinates and returns the
/// provider series unchanged under `solarData`.
#[utoipa::path(
    get,
    path = "/api/solar-data",
    params(SolarDataQuery),
    responses(
        (status = 200, description = "Irradiance series for the location", body = SolarDataResponse),
        (status = 400, description = "Missing or invalid coordinates", body = ErrorBody),
        (status = 429, description = "Provider quota exceeded", body = ErrorBody),
        (status = 500, description = "Provider key not configured or provider failure", body = ErrorBody)
    )
)]
pub async fn get_solar_data(
    Query(query): Query<SolarDataQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let solar_data = state
        .gateway
        .fetch_from_query(query.lat.as_deref(), query.lon.as_deref())
        .await?;
    Ok(Json(SolarDataResponse { solar_data }))
}

/// POST /api/estimate
/// Estimate PV generation for a site
///
/// Validates the site parameters, retrieves the irradiance series for the
/// location and returns hourly/daily/monthly/yearly energy plus optional
/// lifecycle costs. Values are not rounded.
#[utoipa::path(
    post,
    path = "/api/estimate",
    request_body = EstimateRequest,
    responses(
        (status = 200, description = "Generation estimate", body = EstimateResponse),
        (status = 400, description = "Malformed body, invalid coordinates or site parameters", body = ErrorBody),
        (status = 422, description = "Provider returned no samples", body = ErrorBody),
        (status = 429, description = "Provider quota exceeded", body = ErrorBody),
        (status = 500, description = "Provider key not configured or provider failure", body = ErrorBody)
    )
)]
pub async fn post_estimate(
    State(state): State<AppState>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let location = Coordinate::new(request.latitude, request.longitude)
        .ok_or_else(|| GatewayError::InvalidRequest("Invalid latitude or longitude".into()))?;
    site_validation::validate_site(&request.site)?;

    let series = state.gateway.fetch_irradiance(location).await?;
    let estimate = generation_estimator::estimate(&series, &request.site)?;
    let summary = generation_estimator::summarize(&series)?;

    Ok(Json(EstimateResponse {
        location,
        estimate,
        summary,
        site: request.site,
    }))
}

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service status", body = HealthStatus)
    )
)]
pub async fn get_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        provider_configured: state.gateway.is_configured(),
    })
}
