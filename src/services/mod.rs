pub mod generation_estimator;
pub mod irradiance_gateway;
pub mod site_validation;
