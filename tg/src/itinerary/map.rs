//! Map view of a day: the route line plus numbered POI markers
//!
//! This is the boundary to a map widget. The widget draws `route` and
//! `markers` and reports a selection back as a marker number.

use serde::Serialize;
use tracing::debug;

use super::day::DaySection;
use super::geo::{FALLBACK_CENTER, GeoPoint};
use super::poi::Poi;

/// A POI with its display number (from 1)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub number: usize,
    pub poi: Poi,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub route: Vec<GeoPoint>,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    pub fn for_day(day: &DaySection) -> Self {
        let route = day.route_path();
        let markers: Vec<MapMarker> = day
            .pois
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, poi)| MapMarker { number: i + 1, poi })
            .collect();
        let center = route
            .first()
            .copied()
            .or_else(|| markers.first().map(|m| m.poi.coordinates))
            .unwrap_or(FALLBACK_CENTER);
        debug!(day = day.day_number, points = route.len(), markers = markers.len(), "MapView::for_day");
        Self { center, route, markers }
    }

    /// Route start, when the route has at least two points
    pub fn start(&self) -> Option<GeoPoint> {
        (self.route.len() >= 2).then(|| self.route[0])
    }

    /// Route end, when the route has at least two points
    pub fn end(&self) -> Option<GeoPoint> {
        (self.route.len() >= 2).then(|| self.route[self.route.len() - 1])
    }

    /// Handle a "POI selected" event
    pub fn select(&self, number: usize) -> Option<&Poi> {
        self.markers.iter().find(|m| m.number == number).map(|m| &m.poi)
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty() && self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(body: &str) -> DaySection {
        DaySection::parse(1, "Day 1", body)
    }

    #[test]
    fn test_markers_numbered_from_one() {
        let view = MapView::for_day(&day(
            "- Attractions & Points of Interest:\n  - A (-122.0,47.0): first\n  - Bad (900,0): x\n  - B (-121.0,46.0): second",
        ));
        assert_eq!(view.markers.len(), 2);
        assert_eq!(view.markers[0].number, 1);
        assert_eq!(view.markers[1].number, 2);
        assert_eq!(view.select(2).unwrap().name, "B");
        assert!(view.select(0).is_none());
        assert!(view.select(3).is_none());
    }

    #[test]
    fn test_center_and_endpoints() {
        let view = MapView::for_day(&day("- Route Coordinates: [-122.3,47.6;-122.6,45.5]"));
        assert_eq!(view.center, GeoPoint { lat: 47.6, lon: -122.3 });
        assert_eq!(view.start(), Some(GeoPoint { lat: 47.6, lon: -122.3 }));
        assert_eq!(view.end(), Some(GeoPoint { lat: 45.5, lon: -122.6 }));
    }

    #[test]
    fn test_empty_day_uses_fallback_center() {
        let view = MapView::for_day(&day("- Route: nowhere"));
        assert!(view.is_empty());
        assert_eq!(view.center, FALLBACK_CENTER);
        assert!(view.start().is_none());
    }
}
