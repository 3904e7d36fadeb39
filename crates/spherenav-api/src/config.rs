use std::env;
use std::path::PathBuf;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub sphere_config: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { port: 8000, cors_origins: Vec::new(), sphere_config: None }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("SPHERENAV_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(8000);

        let cors_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|origins| parse_origins(&origins))
            .unwrap_or_default();

        let sphere_config =
            env::var("SPHERENAV_CONFIG").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from);

        Self { port, cors_origins, sphere_config }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Split a comma separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|o| !o.is_empty()).map(String::from).collect()
}
