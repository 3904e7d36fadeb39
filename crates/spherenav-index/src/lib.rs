//! SphereNav Index - Node index, pairwise geometry and neighbor selection
//!
//! This crate turns a list of panorama nodes into a navigable graph: an
//! id-addressed index with a coarse spatial grid, dense distance/bearing
//! matrices, and the sector-balanced neighbor selection used for links.

pub mod graph;
pub mod index;
pub mod loader;
pub mod matrix;
pub mod selector;

pub use graph::{GraphSettings, NeighborStrategy, SphereGraph};
pub use index::NodeIndex;
pub use loader::GraphLoader;
pub use matrix::GeometryMatrix;
pub use selector::{min_separation, select_spread, Candidate};
