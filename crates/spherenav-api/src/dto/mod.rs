mod request;
mod response;

pub use request::{NeighborParams, NeighborQuery};
pub use response::{HealthResponse, ReloadResponse};
