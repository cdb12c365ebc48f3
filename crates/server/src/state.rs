use std::sync::Arc;
use shelfcheck_core::{BookStore, Config, SanitizedConfig, Verifier};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn BookStore>,
    verifier: Option<Arc<Verifier>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn BookStore>, verifier: Option<Arc<Verifier>>) -> Self {
        Self {
            config,
            store,
            verifier,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn BookStore {
        self.store.as_ref()
    }

    /// The verifier, present only when a tracker is configured.
    pub fn verifier(&self) -> Option<&Arc<Verifier>> {
        self.verifier.as_ref()
    }
}
