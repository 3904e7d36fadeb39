//! Error types for SphereNav

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SphereError {
    // Node errors
    #[error("Sphere node {id} not found")]
    NodeNotFound { id: String },

    #[error("Invalid position: {reason}")]
    InvalidPosition { reason: String },

    #[error("URL must point to an image file (.jpg, .jpeg, .png, .gif, .webp): {url}")]
    InvalidImageUrl { url: String },

    // Source errors
    #[error("Failed to fetch {url}: {reason}")]
    UpstreamFetch { url: String, reason: String },

    #[error("Source {url} answered with status {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Invalid GeoJSON document from {url}: {reason}")]
    InvalidDocument { url: String, reason: String },

    #[error("Invalid feature: {reason}")]
    InvalidFeature { reason: String },

    #[error("All {count} configured sphere sources failed to load")]
    AllSourcesFailed { count: usize },

    #[error("Failed to build sphere index: {reason}")]
    IndexBuild { reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Config file not readable at {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl SphereError {
    /// True when the failure comes from a remote source rather than local data
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            SphereError::UpstreamFetch { .. }
                | SphereError::UpstreamStatus { .. }
                | SphereError::InvalidDocument { .. }
                | SphereError::AllSourcesFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SphereError>;
