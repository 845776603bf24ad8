/// ============================================================
///  PV Generation Estimator
///
///  Algorithm pipeline:
///   1. Mean GHI        – unweighted average over every sample
///   2. Shading         – single flat attenuation of the mean
///   3. Daily insolation – W/m² × 24 h / 1000 → kWh/m²/day
///   4. Panel output    – area × insolation × efficiency
///   5. System losses   – flat percentage on the panel output
///   6. Derived periods – hour / month (30.44 d) / year (365 d)
///   7. Lifecycle costs – optional, 25-year maintenance horizon
///
///  No rounding happens here; formatting belongs to the caller.
/// ============================================================

use crate::errors::EstimateError;
use crate::models::solar::{
    CostEstimate, GenerationEstimate, IrradianceSeries, IrradianceSummary, SiteCosts, SiteParameters,
};

// ─── Constants ───────────────────────────────────────────────
const HOURS_PER_DAY: f64 = 24.0;
const MEAN_DAYS_PER_MONTH: f64 = 30.44;
const DAYS_PER_YEAR: f64 = 365.0;
const LIFECYCLE_YEARS: f64 = 25.0;
const WH_PER_KWH: f64 = 1000.0;

/// Converts an irradiance series and site description into energy figures.
///
/// The series is treated as a uniform hourly cadence: samples are averaged
/// without looking at their timestamps.
pub fn estimate(series: &IrradianceSeries, params: &SiteParameters) -> Result<GenerationEstimate, EstimateError> {
    let average_ghi = mean(series.samples.iter().map(|s| s.global_horizontal_irradiance))
        .ok_or(EstimateError::InsufficientData)?;

    let adjusted_ghi = average_ghi * params.shading.transmitted_fraction();

    // kWh/m²/day over a nominal 24 h day
    let daily_irradiance = adjusted_ghi * HOURS_PER_DAY / WH_PER_KWH;

    let raw_daily = params.area_square_meters * daily_irradiance * (params.panel_efficiency_percent / 100.0);
    let daily = raw_daily * (1.0 - params.system_losses_percent / 100.0);

    Ok(GenerationEstimate {
        hourly_kwh: daily / HOURS_PER_DAY,
        daily_kwh: daily,
        monthly_kwh: daily * MEAN_DAYS_PER_MONTH,
        yearly_kwh: daily * DAYS_PER_YEAR,
        costs: params.costs.as_ref().and_then(lifecycle_costs),
    })
}

/// `None` when no cost field carries an amount.
fn lifecycle_costs(costs: &SiteCosts) -> Option<CostEstimate> {
    if costs.is_empty() {
        return None;
    }
    let system = costs.system_cost.unwrap_or(0.0);
    let installation = costs.installation_cost.unwrap_or(0.0);
    let maintenance = costs.maintenance_cost_per_year.unwrap_or(0.0);

    Some(CostEstimate {
        total_system_cost: system + installation,
        total_installation_cost: installation,
        total_maintenance_cost: maintenance * LIFECYCLE_YEARS,
    })
}

/// Mean GHI / POA and bookkeeping for display next to an estimate.
pub fn summarize(series: &IrradianceSeries) -> Result<IrradianceSummary, EstimateError> {
    let samples = &series.samples;
    let average_ghi_w_m2 = mean(samples.iter().map(|s| s.global_horizontal_irradiance))
        .ok_or(EstimateError::InsufficientData)?;
    let average_poa_w_m2 = mean(samples.iter().map(|s| s.plane_of_array_irradiance))
        .ok_or(EstimateError::InsufficientData)?;

    // Provider order is not trusted.
    let first_period_end = samples.iter().map(|s| s.period_end).min().ok_or(EstimateError::InsufficientData)?;
    let last_period_end = samples.iter().map(|s| s.period_end).max().ok_or(EstimateError::InsufficientData)?;

    Ok(IrradianceSummary {
        average_ghi_w_m2,
        average_poa_w_m2,
        sample_count: samples.len(),
        first_period_end,
        last_period_end,
        temperature_coefficient: series.temperature_coefficient,
        degradation_rate: series.degradation_rate,
    })
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    Some(values.sum::<f64>() / n as f64)
}
