use serde::Deserialize;
use spherenav_core::SphereConfig;

use crate::error::ApiError;

/// Query string of `GET /v3/spheres/{node_id}`
#[derive(Debug, Default, Deserialize)]
pub struct NeighborQuery {
    /// Search radius in meters
    pub max_range: Option<f64>,
    /// Number of compass sectors to spread links over
    pub sectors: Option<i64>,
}

/// Validated neighbor search parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborParams {
    pub max_range: f64,
    pub sectors: u32,
}

impl NeighborQuery {
    /// Fill in defaults and reject values the selector cannot work with.
    ///
    /// A negative or zero range is accepted and simply yields no links.
    pub fn resolve(&self, defaults: &SphereConfig) -> Result<NeighborParams, ApiError> {
        let max_range = self.max_range.unwrap_or(defaults.default_max_range);
        if max_range.is_nan() {
            return Err(ApiError::invalid_parameter("max_range", "must be a number"));
        }

        let sectors = match self.sectors {
            None => defaults.default_sectors,
            Some(s) if s < 1 => {
                return Err(ApiError::invalid_parameter(
                    "sectors",
                    format!("must be at least 1, got {}", s),
                ));
            }
            Some(s) => u32::try_from(s).unwrap_or(u32::MAX),
        };

        Ok(NeighborParams { max_range, sectors })
    }
}
