use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    /// Whether the sphere graph has been loaded yet
    pub loaded: bool,
}

impl HealthResponse {
    pub fn new(loaded: bool) -> Self {
        Self { status: "ok", service: "spherenav-api", loaded }
    }
}

/// Result of a forced rebuild
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub nodes: usize,
    /// True when the pairwise matrices were built for this graph
    pub matrix: bool,
}
