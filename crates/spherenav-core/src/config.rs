use crate::error::{Result, SphereError};
use crate::geo::DEFAULT_CELL_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Project that ships with the service
pub const DEFAULT_PROJECT: &str = "The Living Ice Project";

/// GeoJSON published by [`DEFAULT_PROJECT`]
pub const DEFAULT_PROJECT_URL: &str = "https://livingiceproject.com/static/shapes/spheres.geojson";

/// Where one project's sphere GeoJSON lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSource {
    pub geojson_url: String,

    /// Prefix for relative panorama/thumbnail links
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ProjectSource {
    pub fn new(geojson_url: impl Into<String>) -> Self {
        Self { geojson_url: geojson_url.into(), base_url: None }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Runtime configuration for the sphere subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphereConfig {
    pub projects: BTreeMap<String, ProjectSource>,
    pub fetch_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub grid_cell_size: f64,
    pub matrix_node_limit: usize,
    pub default_max_range: f64,
    pub default_sectors: u32,
}

impl Default for SphereConfig {
    fn default() -> Self {
        let mut projects = BTreeMap::new();
        projects.insert(DEFAULT_PROJECT.to_string(), ProjectSource::new(DEFAULT_PROJECT_URL));

        Self {
            projects,
            fetch_ttl_secs: 3600,
            request_timeout_secs: 30,
            grid_cell_size: DEFAULT_CELL_SIZE,
            matrix_node_limit: 3_000,
            default_max_range: 10_000.0,
            default_sectors: 5,
        }
    }
}

/// Shape of the TOML file; every key is optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    projects: Option<BTreeMap<String, ProjectSource>>,
    fetch_ttl_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    grid_cell_size: Option<f64>,
    matrix_node_limit: Option<usize>,
    default_max_range: Option<f64>,
    default_sectors: Option<u32>,
}

impl SphereConfig {
    /// Defaults, then the optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::default().load_from_file(path)?,
            None => Self::default(),
        };
        let config = config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from a TOML file. A `projects` table replaces the defaults.
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| SphereError::ConfigFile {
            path: path.as_ref().to_path_buf(),
            source: Arc::new(e),
        })?;

        let file: FileConfig = toml::from_str(&content).map_err(|e| SphereError::ConfigInvalid {
            key: "file".to_string(),
            reason: format!("Failed to parse TOML: {}", e),
        })?;

        if let Some(projects) = file.projects {
            self.projects = projects;
        }
        if let Some(ttl) = file.fetch_ttl_secs {
            self.fetch_ttl_secs = ttl;
        }
        if let Some(timeout) = file.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(cell) = file.grid_cell_size {
            self.grid_cell_size = cell;
        }
        if let Some(limit) = file.matrix_node_limit {
            self.matrix_node_limit = limit;
        }
        if let Some(range) = file.default_max_range {
            self.default_max_range = range;
        }
        if let Some(sectors) = file.default_sectors {
            self.default_sectors = sectors;
        }

        Ok(self)
    }

    /// Overlay values from environment variables
    pub fn load_from_env(mut self) -> Self {
        // SPHERE_LIP_GEOJSON_FETCH
        if let Ok(url) = env::var("SPHERE_LIP_GEOJSON_FETCH") {
            if url.trim().is_empty() {
                tracing::warn!("Ignoring empty SPHERE_LIP_GEOJSON_FETCH");
            } else {
                let project = self
                    .projects
                    .entry(DEFAULT_PROJECT.to_string())
                    .or_insert_with(|| ProjectSource::new(url.clone()));
                project.geojson_url = url;
            }
        }

        // SPHERE_LIP_BASE_URL
        if let Ok(base_url) = env::var("SPHERE_LIP_BASE_URL") {
            match self.projects.get_mut(DEFAULT_PROJECT) {
                Some(project) => project.base_url = Some(base_url),
                None => tracing::warn!(
                    "SPHERE_LIP_BASE_URL set but '{}' is not a configured project",
                    DEFAULT_PROJECT
                ),
            }
        }

        if let Some(ttl) = parse_env::<u64>("SPHERE_FETCH_TTL_SECS") {
            self.fetch_ttl_secs = ttl;
        }
        if let Some(timeout) = parse_env::<u64>("SPHERE_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout;
        }
        if let Some(limit) = parse_env::<usize>("SPHERE_MATRIX_NODE_LIMIT") {
            self.matrix_node_limit = limit;
        }

        self
    }

    /// Reject values the rest of the system cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.grid_cell_size.is_finite() && self.grid_cell_size > 0.0) {
            return Err(SphereError::ConfigInvalid {
                key: "grid_cell_size".to_string(),
                reason: format!(
                    "must be a positive number of degrees, got {}",
                    self.grid_cell_size
                ),
            });
        }
        if self.default_sectors == 0 {
            return Err(SphereError::ConfigInvalid {
                key: "default_sectors".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.default_max_range.is_nan() {
            return Err(SphereError::ConfigInvalid {
                key: "default_max_range".to_string(),
                reason: "must be a number".to_string(),
            });
        }
        for (name, project) in &self.projects {
            if reqwest::Url::parse(&project.geojson_url).is_err() {
                return Err(SphereError::ConfigInvalid {
                    key: format!("projects.{}.geojson_url", name),
                    reason: format!("'{}' is not an absolute URL", project.geojson_url),
                });
            }
        }
        Ok(())
    }

    pub fn fetch_ttl(&self) -> Duration {
        Duration::from_secs(self.fetch_ttl_secs)
    }

    /// `None` when the timeout is disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': expected a non-negative integer", key, raw);
            None
        }
    }
}
