use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use spherenav_core::SphereConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spherenav_api::{create_router, ApiConfig, AppState};

/// Panorama sphere navigation API server
#[derive(Debug, Parser)]
#[command(name = "spherenav-api", version, about)]
struct Args {
    /// TOML file with sphere project and index settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "spherenav_api=info,spherenav_index=info,spherenav_core=info,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let mut api_config = ApiConfig::from_env();
    if let Some(port) = args.port {
        api_config.port = port;
    }
    if args.config.is_some() {
        api_config.sphere_config = args.config;
    }

    let sphere_config = SphereConfig::load(api_config.sphere_config.as_deref())
        .context("Failed to load sphere configuration")?;

    tracing::info!(
        port = api_config.port,
        projects = sphere_config.projects.len(),
        matrix_node_limit = sphere_config.matrix_node_limit,
        "Starting SphereNav API server"
    );

    let state = Arc::new(
        AppState::from_config(sphere_config).context("Failed to initialise sphere sources")?,
    );

    let app = create_router(state)
        .layer(cors_layer(&api_config.cors_origins))
        .layer(TraceLayer::new_for_http());

    let addr = api_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        tracing::info!("CORS disabled (set CORS_ALLOWED_ORIGINS to enable)");
    } else {
        tracing::info!(origins = ?origins, "CORS enabled");
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
