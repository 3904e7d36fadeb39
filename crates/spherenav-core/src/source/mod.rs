//! Sphere node sources
//!
//! [`NodeSource`] is the port the index loads from. [`RemoteNodeSource`]
//! fetches every configured project's GeoJSON; [`StaticNodeSource`] serves a
//! fixed set of nodes.

pub mod fetcher;
pub mod parse;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;

use crate::config::{ProjectSource, SphereConfig};
use crate::error::{Result, SphereError};
use crate::models::PanoramaNode;

pub use fetcher::GeoJsonFetcher;
pub use parse::{parse_feature, parse_feature_collection, resolve_url, ParsedFeature};

/// Port for retrieving the full set of panorama nodes
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// Fetch and parse every node this source knows about
    async fn fetch_all_nodes(&self) -> Result<Vec<PanoramaNode>>;

    /// Drop any cached upstream data so the next fetch is fresh
    async fn invalidate(&self) {}
}

/// Loads nodes from each configured project's remote GeoJSON
pub struct RemoteNodeSource {
    fetcher: GeoJsonFetcher,
    projects: BTreeMap<String, ProjectSource>,
}

impl RemoteNodeSource {
    pub fn new(fetcher: GeoJsonFetcher, projects: BTreeMap<String, ProjectSource>) -> Self {
        Self { fetcher, projects }
    }

    pub fn from_config(config: &SphereConfig) -> Result<Self> {
        let fetcher = GeoJsonFetcher::new(config.fetch_ttl(), config.request_timeout())?;
        Ok(Self::new(fetcher, config.projects.clone()))
    }

    /// Fetch one project and tag its nodes with the project name when they carry none
    pub async fn fetch_project(
        &self,
        name: &str,
        project: &ProjectSource,
    ) -> Result<Vec<PanoramaNode>> {
        let document = self.fetcher.fetch(&project.geojson_url).await?;

        let parsed = parse::parse_feature_collection(&document, project.base_url.as_deref())
            .map_err(|e| SphereError::InvalidDocument {
                url: project.geojson_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(parsed
            .into_iter()
            .map(|p| {
                let mut node = p.node;
                if node.project.is_none() {
                    node.project = Some(name.to_string());
                }
                node
            })
            .collect())
    }
}

#[async_trait]
impl NodeSource for RemoteNodeSource {
    async fn fetch_all_nodes(&self) -> Result<Vec<PanoramaNode>> {
        let results = join_all(
            self.projects.iter().map(|(name, project)| self.fetch_project(name, project)),
        )
        .await;

        let mut nodes = Vec::new();
        let mut failures = 0;

        for ((name, project), result) in self.projects.iter().zip(results) {
            match result {
                Ok(project_nodes) => {
                    tracing::info!(
                        project = %name,
                        nodes = project_nodes.len(),
                        "Loaded sphere project"
                    );
                    nodes.extend(project_nodes);
                }
                Err(e) => {
                    failures += 1;
                    tracing::error!(
                        project = %name,
                        url = %project.geojson_url,
                        error = %e,
                        "Failed to load sphere project"
                    );
                }
            }
        }

        if !self.projects.is_empty() && failures == self.projects.len() {
            return Err(SphereError::AllSourcesFailed { count: failures });
        }

        Ok(nodes)
    }

    async fn invalidate(&self) {
        self.fetcher.clear().await;
    }
}

/// Serves a fixed list of nodes, counting how often it is asked
#[derive(Debug, Default)]
pub struct StaticNodeSource {
    nodes: Vec<PanoramaNode>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl StaticNodeSource {
    pub fn new(nodes: Vec<PanoramaNode>) -> Self {
        Self { nodes, delay: None, fetches: AtomicUsize::new(0) }
    }

    /// Wait this long on every fetch, to mimic a slow upstream
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of completed fetches
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeSource for StaticNodeSource {
    async fn fetch_all_nodes(&self) -> Result<Vec<PanoramaNode>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.nodes.clone())
    }
}
