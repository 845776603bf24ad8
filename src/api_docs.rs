use utoipa::OpenApi;
use crate::controllers::solar_controller;
use crate::errors;
use crate::models::solar;

#[derive(OpenApi)]
#[openapi(
    paths(
        solar_controller::get_solar_data,
        solar_controller::post_estimate,
        solar_controller::get_health
    ),
    components(
        schemas(
            solar::Coordinate,
            solar::IrradianceSample,
            solar::IrradianceSeries,
            solar::IrradianceSummary,
            solar::InstallationType,
            solar::Shading,
            solar::SiteCosts,
            solar::SiteParameters,
            solar::CostEstimate,
            solar::GenerationEstimate,
            solar::SolarDataResponse,
            solar::EstimateRequest,
            solar::EstimateResponse,
            solar::HealthStatus,
            errors::ErrorBody
        )
    ),
    tags(
        (name = "solar-pv-estimate", description = "PV Generation Estimation API")
    )
)]
pub struct ApiDoc;
