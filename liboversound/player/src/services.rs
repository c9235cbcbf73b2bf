use std::sync::Arc;

use derivative::Derivative;

use crate::dto::load_error::LoadError;
use crate::settings::Settings;
use crate::stats::StatsCollector;
use crate::storage::KeyValueStore;
use crate::transport::{CatalogService, HttpCatalogService, HttpTrackService, TrackService};

/// Everything the player talks to outside of the media engine.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Services {
    #[derivative(Debug = "ignore")]
    pub tracks: Arc<dyn TrackService>,
    #[derivative(Debug = "ignore")]
    pub catalog: Arc<dyn CatalogService>,
    #[derivative(Debug = "ignore")]
    pub store: Arc<dyn KeyValueStore>,
    #[derivative(Debug = "ignore")]
    pub stats: Option<Arc<dyn StatsCollector>>,
}

impl Services {
    pub fn new(
        tracks: Arc<dyn TrackService>,
        catalog: Arc<dyn CatalogService>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            tracks,
            catalog,
            store,
            stats: None,
        }
    }

    /// HTTP track and catalog services for the configured endpoints.
    pub fn http(settings: &Settings, store: Arc<dyn KeyValueStore>) -> Result<Self, LoadError> {
        Ok(Self::new(
            Arc::new(HttpTrackService::new(settings)?),
            Arc::new(HttpCatalogService::new(settings)?),
            store,
        ))
    }

    pub fn with_stats(mut self, stats: Arc<dyn StatsCollector>) -> Self {
        self.stats = Some(stats);
        self
    }
}
