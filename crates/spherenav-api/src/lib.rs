//! SphereNav API - HTTP adapter for sphere listing and neighbor navigation

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
