use chrono::{DateTime, Utc};
use geo::Point;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SphereError};
use crate::geo::math::{point_bearing_degrees, point_distance_meters};

/// Image extensions accepted for panorama and thumbnail URLs
pub const IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Altitudes at or above this value are rejected, in meters
pub const MAX_ALTITUDE: f64 = 10_000.0;

/// WGS 84 position serialized as `[lon, lat]` or `[lon, lat, alt]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Position {
    point: Point<f64>,
    altitude: Option<f64>,
}

impl Position {
    /// Build a validated position
    pub fn new(lon: f64, lat: f64, altitude: Option<f64>) -> Result<Self> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(SphereError::InvalidPosition {
                reason: format!("longitude {} outside [-180, 180]", lon),
            });
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(SphereError::InvalidPosition {
                reason: format!("latitude {} outside [-90, 90]", lat),
            });
        }
        if let Some(alt) = altitude {
            if !alt.is_finite() || alt >= MAX_ALTITUDE {
                return Err(SphereError::InvalidPosition {
                    reason: format!("altitude {} must be below {}", alt, MAX_ALTITUDE),
                });
            }
        }

        Ok(Self { point: Point::new(lon, lat), altitude })
    }

    /// Build from a 2 or 3 element coordinate slice
    pub fn from_coordinates(coords: &[f64]) -> Result<Self> {
        match *coords {
            [lon, lat] => Self::new(lon, lat, None),
            [lon, lat, alt] => Self::new(lon, lat, Some(alt)),
            _ => Err(SphereError::InvalidPosition {
                reason: format!("expected 2 or 3 coordinates, got {}", coords.len()),
            }),
        }
    }

    /// The `[0, 0]` fallback used when a feature carries no usable coordinates
    pub fn origin() -> Self {
        Self { point: Point::new(0.0, 0.0), altitude: None }
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    /// The position as a `geo` point, altitude dropped
    pub fn point(&self) -> Point<f64> {
        self.point
    }

    pub fn coordinates(&self) -> Vec<f64> {
        let mut coords = vec![self.lon(), self.lat()];
        coords.extend(self.altitude);
        coords
    }

    /// Great-circle distance to another position in meters
    pub fn distance_to(&self, other: &Position) -> f64 {
        point_distance_meters(self.point(), other.point())
    }

    /// Initial bearing toward another position in degrees
    pub fn bearing_to(&self, other: &Position) -> f64 {
        point_bearing_degrees(self.point(), other.point())
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = SphereError;

    fn try_from(coords: Vec<f64>) -> Result<Self> {
        Self::from_coordinates(&coords)
    }
}

impl From<Position> for Vec<f64> {
    fn from(position: Position) -> Self {
        position.coordinates()
    }
}

/// Minimal reference to a navigable neighbor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub gps: Position,
}

/// Geolocated 360° panorama with its imagery and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanoramaNode {
    pub id: String,
    pub gps: Position,
    pub panorama: String,
    pub thumbnail: String,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl PanoramaNode {
    /// Create a node, checking both image URLs
    pub fn new(
        id: impl Into<String>,
        gps: Position,
        panorama: impl Into<String>,
        thumbnail: impl Into<String>,
    ) -> Result<Self> {
        let panorama = panorama.into();
        let thumbnail = thumbnail.into();
        validate_image_url(&panorama)?;
        validate_image_url(&thumbnail)?;

        Ok(Self {
            id: id.into(),
            gps,
            panorama,
            thumbnail,
            links: Vec::new(),
            author: None,
            date: None,
            project: None,
            label: None,
        })
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Link pointing at this node
    pub fn link(&self) -> Link {
        Link { id: self.id.clone(), gps: self.gps }
    }

    /// Copy of this node carrying the given links; `self` is left untouched
    pub fn with_links(&self, links: Vec<Link>) -> Self {
        Self { links, ..self.clone() }
    }
}

/// Check that a URL is absolute http(s) and its path ends in an image extension
pub fn validate_image_url(url: &str) -> Result<()> {
    let invalid = || SphereError::InvalidImageUrl { url: url.to_string() };
    let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }

    let path = parsed.path().to_lowercase();
    if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        Ok(())
    } else {
        Err(invalid())
    }
}
