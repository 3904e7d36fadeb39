mod health;
mod spheres;

pub use health::health_check;
pub use spheres::{get_sphere, list_spheres_geojson, reload_spheres};
