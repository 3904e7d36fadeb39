pub mod geojson;
pub mod node;

pub use self::geojson::{node_to_feature, nodes_to_feature_collection};
pub use node::{validate_image_url, Link, PanoramaNode, Position, IMAGE_EXTENSIONS, MAX_ALTITUDE};
