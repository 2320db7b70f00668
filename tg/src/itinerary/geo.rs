//! Geographic points and route coordinate strings
//!
//! The backend writes coordinates longitude first (`[lon,lat;lon,lat]`);
//! everything here is stored latitude first.

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

/// Rough centre of the continental US, used when a map has nothing to show
pub const FALLBACK_CENTER: GeoPoint = GeoPoint {
    lat: 39.8283,
    lon: -98.5795,
};

/// A WGS84 point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Point within lat [-90, 90] and lon [-180, 180], or `None`
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }

    /// Parse a `lon,lat` pair
    pub fn from_lon_lat(text: &str) -> Option<Self> {
        let (lon, lat) = text.split_once(',')?;
        let lon = lon.trim().parse::<f64>().ok()?;
        let lat = lat.trim().parse::<f64>().ok()?;
        Self::new(lat, lon)
    }
}

// [lat, lon], the order map widgets take
impl Serialize for GeoPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lat, self.lon].serialize(serializer)
    }
}

/// Parse `[lon,lat;lon,lat;...]`
///
/// Brackets are optional and empty segments are skipped. One bad pair
/// rejects the whole string.
pub fn parse_route_coordinates(text: &str) -> Option<Vec<GeoPoint>> {
    let inner = text.trim().trim_start_matches('[').trim_end_matches(']');
    let mut points = Vec::new();
    for segment in inner.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        match GeoPoint::from_lon_lat(segment) {
            Some(point) => points.push(point),
            None => {
                warn!(%segment, "parse_route_coordinates: invalid coordinate pair, dropping route");
                return None;
            }
        }
    }
    debug!(count = points.len(), "parse_route_coordinates: parsed");
    (!points.is_empty()).then_some(points)
}

/// Extract a GeoJSON `LineString` following `ROUTE_GEOMETRY:` in free text
pub fn parse_route_geometry(text: &str) -> Option<Vec<GeoPoint>> {
    let (_, rest) = text.split_once("ROUTE_GEOMETRY:")?;
    let rest = rest.trim_start();
    let end = rest.rfind('}')?;
    let geometry: serde_json::Value = match serde_json::from_str(&rest[..=end]) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "parse_route_geometry: invalid geometry JSON");
            return None;
        }
    };
    if geometry.get("type").and_then(|t| t.as_str()) != Some("LineString") {
        return None;
    }

    let points: Option<Vec<GeoPoint>> = geometry
        .get("coordinates")?
        .as_array()?
        .iter()
        .map(|pair| {
            let lon = pair.get(0)?.as_f64()?;
            let lat = pair.get(1)?.as_f64()?;
            GeoPoint::new(lat, lon)
        })
        .collect();
    points.filter(|p| !p.is_empty())
}
