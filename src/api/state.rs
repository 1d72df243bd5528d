use crate::config::AppConfig;
use crate::relay::{Credentials, RelayService};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// The relay every handler delegates to
    pub relay: RelayService,
}

impl AppState {
    pub fn new(relay: RelayService) -> Self {
        Self { relay }
    }

    /// Build a fresh relay from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(RelayService::new(
            Credentials::from(&config.auth),
            config.timing.clone(),
        ))
    }
}
