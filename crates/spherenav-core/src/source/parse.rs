//! Lenient GeoJSON feature → panorama node parsing
//!
//! Coordinates that are missing or malformed fall back to `[0, 0]` and are
//! flagged on the result. Anything else that cannot be coerced rejects the
//! single feature, never the whole document.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value as JsonValue};

use crate::error::{Result, SphereError};
use crate::models::{PanoramaNode, Position};

/// Outcome of parsing one feature
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeature {
    pub node: PanoramaNode,

    /// True when the geometry was unusable and the node sits at `[0, 0]`
    pub position_defaulted: bool,
}

/// Parse one GeoJSON feature into a panorama node
pub fn parse_feature(feature: &JsonValue, base_url: Option<&str>) -> Result<ParsedFeature> {
    let empty = Map::new();
    let properties = match feature.get("properties") {
        Some(JsonValue::Object(map)) => map,
        Some(JsonValue::Null) | None => &empty,
        Some(other) => return Err(invalid(format!("properties must be an object, got {}", other))),
    };

    let coordinates = feature.get("geometry").and_then(|g| g.get("coordinates"));
    let (gps, position_defaulted) = match parse_coordinates(coordinates) {
        Some(coords) => (Position::from_coordinates(&coords)?, false),
        None => (Position::origin(), true),
    };

    let panorama = resolve_url(required_str(properties, "panorama")?, base_url);
    let thumbnail = resolve_url(required_str(properties, "thumbnail")?, base_url);

    let id = match identifier(properties.get("id")).or_else(|| identifier(feature.get("id"))) {
        Some(id) => id,
        None => file_name(&panorama)
            .ok_or_else(|| invalid(format!("no id and no filename in panorama URL {}", panorama)))?,
    };

    let mut node = PanoramaNode::new(id, gps, panorama, thumbnail)?;
    node.author = optional_str(properties, "author")?;
    node.project = optional_str(properties, "project")?;
    node.label = optional_str(properties, "label")?;
    node.date = optional_str(properties, "date")?.map(|raw| parse_date(&raw)).transpose()?;

    Ok(ParsedFeature { node, position_defaulted })
}

/// Parse every feature of a `FeatureCollection`, skipping the ones that fail.
///
/// Returns an error only when the document itself is not a collection.
pub fn parse_feature_collection(
    document: &JsonValue,
    base_url: Option<&str>,
) -> Result<Vec<ParsedFeature>> {
    if document.get("type").and_then(JsonValue::as_str) != Some("FeatureCollection") {
        return Err(invalid("document is not a FeatureCollection".to_string()));
    }

    let features = document
        .get("features")
        .and_then(JsonValue::as_array)
        .ok_or_else(|| invalid("FeatureCollection has no features array".to_string()))?;

    let mut parsed = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        match parse_feature(feature, base_url) {
            Ok(result) => {
                if result.position_defaulted {
                    tracing::warn!(
                        index = index,
                        id = %result.node.id,
                        "Feature has no usable coordinates, defaulting to [0, 0]"
                    );
                }
                parsed.push(result);
            }
            Err(e) => {
                tracing::warn!(index = index, error = %e, "Skipping sphere feature");
            }
        }
    }

    Ok(parsed)
}

/// Prefix relative links with the project's base URL; absolute links pass through
pub fn resolve_url(url: &str, base_url: Option<&str>) -> String {
    if reqwest::Url::parse(url).is_ok() {
        return url.to_string();
    }

    match base_url {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/')),
        None => url.to_string(),
    }
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` or a bare date, all as UTC
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(invalid(format!("unrecognised date '{}'", raw)))
}

fn parse_coordinates(value: Option<&JsonValue>) -> Option<Vec<f64>> {
    let coords = value?.as_array()?;
    if !(2..=3).contains(&coords.len()) {
        return None;
    }
    coords.iter().map(JsonValue::as_f64).collect()
}

fn identifier(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn file_name(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let name = parsed.path_segments()?.next_back()?;
    (!name.is_empty()).then(|| name.to_string())
}

fn required_str<'a>(properties: &'a Map<String, JsonValue>, key: &str) -> Result<&'a str> {
    properties
        .get(key)
        .and_then(JsonValue::as_str)
        .ok_or_else(|| invalid(format!("missing string property '{}'", key)))
}

fn optional_str(properties: &Map<String, JsonValue>, key: &str) -> Result<Option<String>> {
    match properties.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(invalid(format!("property '{}' must be a string, got {}", key, other))),
    }
}

fn invalid(reason: String) -> SphereError {
    SphereError::InvalidFeature { reason }
}
