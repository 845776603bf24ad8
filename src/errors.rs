use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Failures of the irradiance retrieval gateway.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    /// Missing or malformed coordinates, no provider call was made.
    #[error("{0}")]
    InvalidRequest(String),

    /// The provider credential is not set on this deployment.
    #[error("Solcast API key is not configured")]
    Misconfigured,

    /// HTTP 429 from the provider. The upstream body is only logged.
    #[error("You have exceeded your free daily limit. Please try again later.")]
    RateLimited,

    /// Non-2xx (or undecodable 2xx) provider answer.
    #[error("Failed to fetch data: {body}")]
    ProviderError { status: Option<u16>, body: String },

    /// No response received at all.
    #[error("Failed to fetch data: {0}")]
    ProviderUnreachable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EstimateError {
    #[error("No irradiance samples available for this location")]
    InsufficientData,
}

/// Site parameters outside the accepted envelope.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid site parameters: {0}")]
pub struct ParameterError(pub String);

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Application error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Estimate(#[from] EstimateError),
    #[error(transparent)]
    Parameters(#[from] ParameterError),
    /// Request body missing, not JSON, or not the expected shape.
    #[error("Invalid request body: {0}")]
    Body(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Body(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Gateway(GatewayError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            AppError::Gateway(GatewayError::Misconfigured) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Gateway(GatewayError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Gateway(GatewayError::ProviderError { status, .. }) => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Gateway(GatewayError::ProviderUnreachable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Estimate(EstimateError::InsufficientData) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Parameters(_) => StatusCode::BAD_REQUEST,
            AppError::Body(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
