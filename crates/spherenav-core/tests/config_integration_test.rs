//! Integration tests for layered configuration
//!
//! Precedence: environment variables > config file > defaults

use serial_test::serial;
use spherenav_core::config::{SphereConfig, DEFAULT_PROJECT, DEFAULT_PROJECT_URL};
use spherenav_core::SphereError;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_KEYS: [&str; 5] = [
    "SPHERE_LIP_GEOJSON_FETCH",
    "SPHERE_LIP_BASE_URL",
    "SPHERE_FETCH_TTL_SECS",
    "SPHERE_REQUEST_TIMEOUT_SECS",
    "SPHERE_MATRIX_NODE_LIMIT",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_load_without_file_uses_defaults() {
    clear_env();

    let config = SphereConfig::load(None).unwrap();

    assert_eq!(config.projects.len(), 1);
    assert_eq!(config.projects[DEFAULT_PROJECT].geojson_url, DEFAULT_PROJECT_URL);
    assert_eq!(config.fetch_ttl_secs, 3600);
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
fetch_ttl_secs = 60
default_sectors = 8

[projects."Glacier Survey"]
geojson_url = "https://glacier.example.org/spheres.geojson"
base_url = "https://glacier.example.org"

[projects."Moraine"]
geojson_url = "https://moraine.example.org/spheres.geojson"
"#
    )
    .unwrap();

    let config = SphereConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.fetch_ttl_secs, 60);
    assert_eq!(config.default_sectors, 8);
    assert_eq!(config.default_max_range, 10_000.0);
    assert_eq!(config.projects.len(), 2);
    assert!(!config.projects.contains_key(DEFAULT_PROJECT));
    assert_eq!(
        config.projects["Glacier Survey"].base_url.as_deref(),
        Some("https://glacier.example.org")
    );
    assert_eq!(config.projects["Moraine"].base_url, None);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "fetch_ttl_secs = 60").unwrap();

    env::set_var("SPHERE_FETCH_TTL_SECS", "120");
    env::set_var("SPHERE_LIP_GEOJSON_FETCH", "https://mirror.example.org/spheres.geojson");
    env::set_var("SPHERE_LIP_BASE_URL", "https://mirror.example.org");

    let config = SphereConfig::load(Some(file.path())).unwrap();
    clear_env();

    assert_eq!(config.fetch_ttl_secs, 120);
    let project = &config.projects[DEFAULT_PROJECT];
    assert_eq!(project.geojson_url, "https://mirror.example.org/spheres.geojson");
    assert_eq!(project.base_url.as_deref(), Some("https://mirror.example.org"));
}

#[test]
#[serial]
fn test_invalid_env_value_is_ignored() {
    clear_env();
    env::set_var("SPHERE_MATRIX_NODE_LIMIT", "lots");

    let config = SphereConfig::load(None).unwrap();
    clear_env();

    assert_eq!(config.matrix_node_limit, 3_000);
}

#[test]
#[serial]
fn test_missing_and_malformed_files() {
    clear_env();

    let missing = SphereConfig::load(Some(std::path::Path::new("/nonexistent/spherenav.toml")));
    assert!(matches!(missing, Err(SphereError::ConfigFile { .. })));

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "fetch_ttl_secs = \"soon\"").unwrap();
    let malformed = SphereConfig::load(Some(file.path()));
    assert!(matches!(malformed, Err(SphereError::ConfigInvalid { .. })));
}

#[test]
#[serial]
fn test_env_url_adds_default_project_when_file_omits_it() {
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[projects."Moraine"]
geojson_url = "https://moraine.example.org/spheres.geojson"
"#
    )
    .unwrap();

    env::set_var("SPHERE_LIP_GEOJSON_FETCH", "https://mirror.example.org/spheres.geojson");
    let config = SphereConfig::load(Some(file.path())).unwrap();
    clear_env();

    assert_eq!(config.projects.len(), 2);
    assert_eq!(
        config.projects[DEFAULT_PROJECT].geojson_url,
        "https://mirror.example.org/spheres.geojson"
    );
    assert_eq!(config.projects[DEFAULT_PROJECT].base_url, None);
}
