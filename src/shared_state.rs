use std::sync::Arc;
use std::time::Instant;

use crate::services::irradiance_gateway::IrradianceGateway;

/// Request handlers share nothing mutable: the gateway is read-only and
/// every estimate is computed per request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub gateway: Arc<IrradianceGateway>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(gateway: IrradianceGateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
