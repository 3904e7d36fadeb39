//! Conversion of panorama nodes into GeoJSON for map clients

use chrono::{DateTime, SecondsFormat, Utc};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::{Map, Value as JsonValue};

use crate::models::PanoramaNode;

/// Point geometry for a node's position, altitude included when present
pub fn node_geometry(node: &PanoramaNode) -> Geometry {
    Geometry::new(GeoJsonValue::Point(node.gps.coordinates()))
}

/// Feature with `id, panorama, thumbnail, author, date, project, label` properties
pub fn node_to_feature(node: &PanoramaNode) -> Feature {
    let mut properties = Map::new();
    properties.insert("id".to_string(), JsonValue::from(node.id.clone()));
    properties.insert("panorama".to_string(), JsonValue::from(node.panorama.clone()));
    properties.insert("thumbnail".to_string(), JsonValue::from(node.thumbnail.clone()));
    properties.insert("author".to_string(), optional(node.author.clone()));
    properties.insert("date".to_string(), optional(node.date.as_ref().map(format_date)));
    properties.insert("project".to_string(), optional(node.project.clone()));
    properties.insert("label".to_string(), optional(node.label.clone()));

    Feature {
        bbox: None,
        geometry: Some(node_geometry(node)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// FeatureCollection in the order the nodes are given
pub fn nodes_to_feature_collection<'a>(
    nodes: impl IntoIterator<Item = &'a PanoramaNode>,
) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: nodes.into_iter().map(node_to_feature).collect(),
        foreign_members: None,
    }
}

/// RFC 3339 with a `Z` suffix, the form chrono's serde impl writes
fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn optional(value: Option<String>) -> JsonValue {
    value.map(JsonValue::from).unwrap_or(JsonValue::Null)
}
