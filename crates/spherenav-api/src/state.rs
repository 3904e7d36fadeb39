use std::sync::Arc;

use spherenav_core::source::{NodeSource, RemoteNodeSource};
use spherenav_core::{Result, SphereConfig};
use spherenav_index::{GraphLoader, GraphSettings};

/// Shared state behind every handler
pub struct AppState {
    pub loader: GraphLoader,
    pub config: SphereConfig,
}

impl AppState {
    pub fn new(source: Arc<dyn NodeSource>, config: SphereConfig) -> Self {
        let loader = GraphLoader::new(source, GraphSettings::from_config(&config));
        Self { loader, config }
    }

    /// State backed by the remote GeoJSON projects named in the config
    pub fn from_config(config: SphereConfig) -> Result<Self> {
        let source = RemoteNodeSource::from_config(&config)?;
        Ok(Self::new(Arc::new(source), config))
    }
}
