//! Lazy, single-flight construction of the sphere graph

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};
use tokio::task::{JoinError, JoinHandle};

use spherenav_core::source::NodeSource;
use spherenav_core::{Result, SphereError};

use crate::graph::{GraphSettings, SphereGraph};

type GraphSlot = Arc<RwLock<Option<Arc<SphereGraph>>>>;

/// Outcome of the most recent load, held under the load lock
type LastAttempt = Arc<Mutex<Option<Result<Arc<SphereGraph>>>>>;

/// Owns the current [`SphereGraph`] and builds it on first use.
///
/// Concurrent callers during a load share its outcome, whether that is a
/// graph, an empty graph or an error. The load runs on its own task, so a
/// caller that gives up does not leave the graph half built. A load that
/// yields no nodes or fails is not kept, so a request arriving after it
/// finished tries again.
pub struct GraphLoader {
    source: Arc<dyn NodeSource>,
    settings: GraphSettings,
    graph: GraphSlot,
    last_attempt: LastAttempt,
    attempts: Arc<AtomicU64>,
}

impl GraphLoader {
    pub fn new(source: Arc<dyn NodeSource>, settings: GraphSettings) -> Self {
        Self {
            source,
            settings,
            graph: Arc::new(RwLock::new(None)),
            last_attempt: Arc::new(Mutex::new(None)),
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The graph, loading it if nothing has been loaded yet
    pub async fn ensure_loaded(&self) -> Result<Arc<SphereGraph>> {
        if let Some(graph) = self.current().await {
            return Ok(graph);
        }
        self.spawn_load(false).await.map_err(build_failed)?
    }

    /// Drop cached upstream data and rebuild. The previous graph keeps serving
    /// if the rebuild fails.
    pub async fn reload(&self) -> Result<Arc<SphereGraph>> {
        self.spawn_load(true).await.map_err(build_failed)?
    }

    /// The loaded graph, if any, without triggering a load
    pub async fn current(&self) -> Option<Arc<SphereGraph>> {
        self.graph.read().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        self.graph.read().await.is_some()
    }

    fn spawn_load(&self, refresh: bool) -> JoinHandle<Result<Arc<SphereGraph>>> {
        let source = Arc::clone(&self.source);
        let graph = Arc::clone(&self.graph);
        let last_attempt = Arc::clone(&self.last_attempt);
        let attempts = Arc::clone(&self.attempts);
        let settings = self.settings;
        let seen = attempts.load(Ordering::SeqCst);

        tokio::spawn(async move {
            let mut last = last_attempt.lock_owned().await;

            if !refresh {
                if let Some(loaded) = graph.read().await.clone() {
                    return Ok(loaded);
                }
                // An attempt finished while we waited; share its outcome
                if attempts.load(Ordering::SeqCst) != seen {
                    if let Some(outcome) = last.as_ref() {
                        return outcome.clone();
                    }
                }
            }

            let outcome = load(source, settings, graph, refresh).await;
            *last = Some(outcome.clone());
            attempts.fetch_add(1, Ordering::SeqCst);
            outcome
        })
    }
}

async fn load(
    source: Arc<dyn NodeSource>,
    settings: GraphSettings,
    graph: GraphSlot,
    refresh: bool,
) -> Result<Arc<SphereGraph>> {
    let started = Instant::now();
    if refresh {
        source.invalidate().await;
    }

    let nodes = match source.fetch_all_nodes().await {
        Ok(nodes) => nodes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch sphere nodes");
            return Err(e);
        }
    };

    let built = tokio::task::spawn_blocking(move || SphereGraph::build(nodes, settings))
        .await
        .map_err(build_failed)?;
    let built = Arc::new(built);

    if built.is_empty() {
        tracing::warn!("Sphere sources returned no nodes, not caching the empty graph");
        return Ok(built);
    }

    *graph.write().await = Some(Arc::clone(&built));

    tracing::info!(
        nodes = built.len(),
        strategy = %built.strategy(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Sphere graph loaded"
    );

    Ok(built)
}

fn build_failed(e: JoinError) -> SphereError {
    SphereError::IndexBuild { reason: e.to_string() }
}
