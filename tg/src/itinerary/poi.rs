//! Points of interest from a day's attractions field
//!
//! Each entry reads `Name (lon,lat): description`. Entries that do not
//! match, or whose coordinates are out of range, are dropped and logged.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use super::geo::GeoPoint;

static POI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<name>.+?)\s*\(\s*(?P<lon>[-+]?(?:\d+\.?\d*|\.\d+))\s*,\s*(?P<lat>[-+]?(?:\d+\.?\d*|\.\d+))\s*\)\s*:\s*(?P<desc>.*)$",
    )
    .expect("POI pattern is valid")
});

/// A named, located attraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Poi {
    pub name: String,
    pub coordinates: GeoPoint,
    pub description: String,
}

/// Parse a single attraction entry
pub fn parse_poi(entry: &str) -> Option<Poi> {
    let entry = entry.trim();
    let entry = entry.strip_prefix("- ").unwrap_or(entry).trim();

    let Some(caps) = POI_RE.captures(entry) else {
        warn!(%entry, "parse_poi: entry does not match, dropping");
        return None;
    };

    let lon = caps["lon"].parse::<f64>().ok();
    let lat = caps["lat"].parse::<f64>().ok();
    let Some(coordinates) = lat.zip(lon).and_then(|(lat, lon)| GeoPoint::new(lat, lon)) else {
        warn!(%entry, "parse_poi: coordinates out of range, dropping");
        return None;
    };

    Some(Poi {
        name: caps["name"].trim().to_string(),
        coordinates,
        description: caps["desc"].trim().to_string(),
    })
}

/// Valid points from attraction lines, in source order
pub fn extract_pois<S: AsRef<str>>(entries: &[S]) -> Vec<Poi> {
    entries.iter().filter_map(|e| parse_poi(e.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_gate() {
        let poi = parse_poi("Golden Gate Bridge (-122.4783,37.8199): Iconic suspension bridge").unwrap();
        assert_eq!(poi.name, "Golden Gate Bridge");
        assert_eq!(poi.coordinates, GeoPoint { lat: 37.8199, lon: -122.4783 });
        assert_eq!(poi.description, "Iconic suspension bridge");
    }

    #[test]
    fn test_longitude_out_of_range_dropped() {
        assert!(parse_poi("Bad Entry (200,37): x").is_none());
        assert!(parse_poi("Bad Entry (20,-91): x").is_none());
    }

    #[test]
    fn test_malformed_entries_dropped() {
        assert!(parse_poi("Just a name").is_none());
        assert!(parse_poi("No colon (-122.4,37.8)").is_none());
        assert!(parse_poi("Words (east,north): nope").is_none());
        assert!(parse_poi("(-122.4,37.8): nameless").is_none());
    }

    #[test]
    fn test_name_with_parentheses_and_spacing() {
        let poi = parse_poi("- Pike Place Market (Seattle) ( -122.3422 , 47.6097 ):  Fish throwing ").unwrap();
        assert_eq!(poi.name, "Pike Place Market (Seattle)");
        assert_eq!(poi.description, "Fish throwing");
    }

    #[test]
    fn test_extract_preserves_order_and_skips_invalid() {
        let entries = vec![
            "Space Needle (-122.3493,47.6205): Observation tower",
            "Nowhere (500,500): broken",
            "Multnomah Falls (-122.1156,45.5762): Waterfall",
        ];
        let pois = extract_pois(&entries);
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].name, "Space Needle");
        assert_eq!(pois[1].name, "Multnomah Falls");
    }
}
