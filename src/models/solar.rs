use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::GatewayError;

// ─── Location ────────────────────────────────────────────────────────────────

/// A validated site location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    /// Latitude (−90 … +90)
    pub latitude: f64,
    /// Longitude (−180 … +180)
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate from raw query values.
    ///
    /// Missing or blank values and unparseable / out-of-range values are
    /// both `InvalidRequest`, with different messages.
    pub fn parse(lat: Option<&str>, lon: Option<&str>) -> Result<Self, GatewayError> {
        let (lat, lon) = match (non_blank(lat), non_blank(lon)) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(GatewayError::InvalidRequest("Missing latitude or longitude".into())),
        };

        let invalid = || GatewayError::InvalidRequest("Invalid latitude or longitude".into());
        let latitude: f64 = lat.parse().map_err(|_| invalid())?;
        let longitude: f64 = lon.parse().map_err(|_| invalid())?;

        Self::new(latitude, longitude).ok_or_else(invalid)
    }

    /// Returns `None` when either component is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        (lat_ok && lon_ok).then_some(Self { latitude, longitude })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ─── Provider series (Solcast estimated actuals wire shape) ─────────────────

/// One estimated-actuals observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IrradianceSample {
    /// Global Horizontal Irradiance (W/m²)
    #[serde(rename = "ghi")]
    pub global_horizontal_irradiance: f64,
    /// Plane-of-Array irradiance (W/m²)
    #[serde(rename = "poa_global")]
    pub plane_of_array_irradiance: f64,
    /// End of the averaging period
    pub period_end: DateTime<Utc>,
    /// ISO-8601 period length as reported by the provider, e.g. `PT30M`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

/// Time series returned by the provider, passed through to callers as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IrradianceSeries {
    #[serde(rename = "estimated_actuals", default)]
    pub samples: Vec<IrradianceSample>,
    /// Module temperature coefficient (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_coefficient: Option<f64>,
    /// Module degradation (% per year)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degradation_rate: Option<f64>,
}

/// Aggregate view of a series, for display alongside an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IrradianceSummary {
    pub average_ghi_w_m2: f64,
    pub average_poa_w_m2: f64,
    pub sample_count: usize,
    pub first_period_end: DateTime<Utc>,
    pub last_period_end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_coefficient: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degradation_rate: Option<f64>,
}

// ─── Site parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InstallationType {
    #[default]
    Rooftop,
    Ground,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shading {
    pub has_shading: bool,
    /// Flat irradiance attenuation (%), required when `has_shading`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shading_amount_percent: Option<f64>,
}

impl Shading {
    /// Fraction of irradiance that survives shading, in [0, 1] for valid input.
    pub fn transmitted_fraction(&self) -> f64 {
        if self.has_shading {
            1.0 - self.shading_amount_percent.unwrap_or(0.0) / 100.0
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteCosts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installation_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_cost_per_year: Option<f64>,
}

impl SiteCosts {
    /// True when no field carries a nonzero amount.
    pub fn is_empty(&self) -> bool {
        [self.system_cost, self.installation_cost, self.maintenance_cost_per_year]
            .iter()
            .all(|c| c.unwrap_or(0.0) == 0.0)
    }
}

/// User-supplied description of the planned installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteParameters {
    pub area_square_meters: f64,
    /// Carried through, does not affect the estimate
    #[serde(default)]
    pub installation_type: InstallationType,
    pub panel_efficiency_percent: f64,
    pub system_losses_percent: f64,
    #[serde(default)]
    pub shading: Shading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<SiteCosts>,
}

// ─── Estimate ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// System cost plus installation cost
    pub total_system_cost: f64,
    /// Installation cost as entered (also included in `total_system_cost`)
    pub total_installation_cost: f64,
    /// Maintenance over the 25-year horizon
    pub total_maintenance_cost: f64,
}

/// Unrounded energy figures for one site.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEstimate {
    pub hourly_kwh: f64,
    pub daily_kwh: f64,
    pub monthly_kwh: f64,
    pub yearly_kwh: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub costs: Option<CostEstimate>,
}

// ─── REST API request / response types ──────────────────────────────────────

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SolarDataQuery {
    /// Latitude in decimal degrees
    pub lat: Option<String>,
    /// Longitude in decimal degrees
    pub lon: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SolarDataResponse {
    pub solar_data: IrradianceSeries,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub site: SiteParameters,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    pub location: Coordinate,
    pub estimate: GenerationEstimate,
    pub summary: IrradianceSummary,
    pub site: SiteParameters,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub provider_configured: bool,
}
