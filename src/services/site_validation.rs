use crate::errors::ParameterError;
use crate::models::solar::{SiteCosts, SiteParameters};

const EFFICIENCY_RANGE: (f64, f64) = (10.0, 30.0);
const LOSSES_RANGE: (f64, f64) = (0.0, 50.0);
const SHADING_RANGE: (f64, f64) = (0.0, 100.0);

/// Checks the form-level envelope for callers that skip the form.
///
/// The estimator trusts its input; this is where out-of-range values are
/// turned away.
pub fn validate_site(params: &SiteParameters) -> Result<(), ParameterError> {
    let area = params.area_square_meters;
    if !area.is_finite() || area <= 0.0 {
        return Err(ParameterError(format!("area must be greater than 0 m², got {}", area)));
    }

    check_range("panel efficiency", params.panel_efficiency_percent, EFFICIENCY_RANGE)?;
    check_range("system losses", params.system_losses_percent, LOSSES_RANGE)?;

    if params.shading.has_shading {
        match params.shading.shading_amount_percent {
            Some(amount) => check_range("shading amount", amount, SHADING_RANGE)?,
            None => return Err(ParameterError("shading amount is required when shading is enabled".into())),
        }
    }

    if let Some(costs) = &params.costs {
        check_costs(costs)?;
    }

    Ok(())
}

fn check_range(name: &str, value: f64, (min, max): (f64, f64)) -> Result<(), ParameterError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ParameterError(format!("{} must be between {}% and {}%, got {}", name, min, max, value)))
    }
}

fn check_costs(costs: &SiteCosts) -> Result<(), ParameterError> {
    let fields = [
        ("system cost", costs.system_cost),
        ("installation cost", costs.installation_cost),
        ("maintenance cost", costs.maintenance_cost_per_year),
    ];
    for (name, value) in fields {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(ParameterError(format!("{} must be a non-negative amount, got {}", name, v)));
            }
        }
    }
    Ok(())
}
