//! SphereNav Core - Domain models, geo math, configuration and GeoJSON sources
//!
//! This crate contains the panorama node model and everything needed to turn a
//! remote GeoJSON document into validated nodes.

pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod source;

pub use config::{ProjectSource, SphereConfig};
pub use error::{Result, SphereError};
pub use models::{Link, PanoramaNode, Position};
