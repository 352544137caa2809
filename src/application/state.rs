use std::sync::Arc;

use crate::application::services::GalleryService;
use crate::domain::repositories::KeyValueStore;
use crate::infrastructure::database::Database;
use crate::infrastructure::storage::SqlKeyValueStore;
use crate::infrastructure::synthesis::SynthesisConfig;

/// Configuration for external services — everything that varies between
/// production and test environments. The gallery service is created
/// automatically from the database pool.
pub struct AppStateConfig {
    pub synthesis: SynthesisConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub gallery: GalleryService,
    pub http_client: reqwest::Client,
    pub synthesis: SynthesisConfig,
}

impl AppState {
    /// Build the full application state from a database connection and config.
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let store: Arc<dyn KeyValueStore> =
            Arc::new(SqlKeyValueStore::new(database.clone_pool()));

        Self {
            gallery: GalleryService::new(store),
            #[allow(clippy::expect_used)]
            http_client: reqwest::ClientBuilder::new()
                .timeout(std::time::Duration::from_secs(90))
                .build()
                .expect("failed to build HTTP client"),
            synthesis: config.synthesis,
        }
    }
}
