use std::sync::Arc;
use vsn_core::SqlGenerator;

pub struct AppState {
    pub generator: Arc<dyn SqlGenerator>,
    /// Whether the background ingestion job was started.
    pub ingestion_enabled: bool,
}

impl AppState {
    pub fn new(generator: Arc<dyn SqlGenerator>, ingestion_enabled: bool) -> Self {
        Self {
            generator,
            ingestion_enabled,
        }
    }
}
