use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value as JsonValue;
use tokio::sync::RwLock;

use crate::error::{Result, SphereError};

/// Last fetched document for a URL
#[derive(Debug, Clone)]
struct CacheEntry {
    document: Arc<JsonValue>,
    fetched_at: Instant,
}

/// HTTP GeoJSON fetcher with a per-URL time-to-live cache.
///
/// Entries are overwritten on refetch and never evicted; the key space is
/// bounded by the number of configured projects.
pub struct GeoJsonFetcher {
    client: reqwest::Client,
    ttl: Duration,
    cache: RwLock<HashMap<String, CacheEntry>>,
}

impl GeoJsonFetcher {
    /// Create a fetcher; `timeout` of `None` leaves requests unbounded
    pub fn new(ttl: Duration, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| SphereError::ConfigInvalid {
            key: "request_timeout_secs".to_string(),
            reason: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self::with_client(client, ttl))
    }

    pub fn with_client(client: reqwest::Client, ttl: Duration) -> Self {
        Self { client, ttl, cache: RwLock::new(HashMap::new()) }
    }

    /// Return the cached document when younger than the TTL, otherwise GET and cache it
    pub async fn fetch(&self, url: &str) -> Result<Arc<JsonValue>> {
        if let Some(entry) = self.cache.read().await.get(url) {
            if entry.fetched_at.elapsed() < self.ttl {
                tracing::debug!(
                    url = %url,
                    age_secs = entry.fetched_at.elapsed().as_secs(),
                    "GeoJSON cache hit"
                );
                return Ok(entry.document.clone());
            }
        }

        let document = Arc::new(self.download(url).await?);

        self.cache.write().await.insert(
            url.to_string(),
            CacheEntry { document: document.clone(), fetched_at: Instant::now() },
        );

        Ok(document)
    }

    /// Forget every cached document
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    /// Whether a fresh entry exists for the URL
    pub async fn is_cached(&self, url: &str) -> bool {
        self.cache
            .read()
            .await
            .get(url)
            .is_some_and(|entry| entry.fetched_at.elapsed() < self.ttl)
    }

    async fn download(&self, url: &str) -> Result<JsonValue> {
        tracing::info!(url = %url, "Fetching sphere GeoJSON");

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Sphere source unreachable");
            SphereError::UpstreamFetch { url: url.to_string(), reason: e.to_string() }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                url = %url,
                status = status.as_u16(),
                "Sphere source returned an error status"
            );
            return Err(SphereError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| SphereError::UpstreamFetch {
            url: url.to_string(),
            reason: format!("Failed to read body: {}", e),
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(url = %url, error = %e, "Sphere source is not valid JSON");
            SphereError::InvalidDocument { url: url.to_string(), reason: e.to_string() }
        })
    }
}
