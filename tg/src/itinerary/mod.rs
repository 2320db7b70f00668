//! Itinerary parsing
//!
//! Turns the backend's plain-text trip plan into a document of day and
//! summary sections. Text that does not look like an itinerary is kept
//! as prose; parsing never fails.

use serde::Serialize;
use tracing::debug;

mod day;
mod geo;
mod map;
mod navigator;
mod poi;
mod sections;
mod summary;

pub use day::{DaySection, Field, Overnight, OvernightDetail, ScanState};
pub use geo::{FALLBACK_CENTER, GeoPoint, parse_route_coordinates, parse_route_geometry};
pub use map::{MapMarker, MapView};
pub use navigator::DayCursor;
pub use poi::{Poi, extract_pois, parse_poi};
pub use sections::{DAY_MARKER, RawSection, SUMMARY_MARKER, SectionKind, split_sections};
pub use summary::{SummaryBlock, SummarySection};

/// Structural markers that, with a `Day ` mention, identify an itinerary
const STRUCTURE_MARKERS: [&str; 4] = ["Route:", "Driving:", DAY_MARKER, SUMMARY_MARKER];

/// Text looks like an itinerary rather than a plain message
pub fn is_itinerary(text: &str) -> bool {
    text.contains("Day ") && STRUCTURE_MARKERS.iter().any(|m| text.contains(m))
}

/// Parsed itinerary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItineraryDocument {
    pub days: Vec<DaySection>,
    pub summaries: Vec<SummarySection>,
}

impl ItineraryDocument {
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::default();
        for section in split_sections(text) {
            match (section.kind, section.day_number) {
                (SectionKind::Day, Some(n)) => doc.days.push(DaySection::parse(n, &section.title, &section.content)),
                (SectionKind::Summary, _) => doc
                    .summaries
                    .push(SummarySection::parse(&section.title, &section.content)),
                (SectionKind::Day, None) => {}
            }
        }
        debug!(days = doc.days.len(), summaries = doc.summaries.len(), "ItineraryDocument::parse");
        doc
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty() && self.summaries.is_empty()
    }

    pub fn cursor(&self) -> DayCursor {
        DayCursor::new(self.days.len())
    }

    pub fn map(&self, day_index: usize) -> Option<MapView> {
        self.days.get(day_index).map(MapView::for_day)
    }
}

/// How an assistant response should be shown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseView {
    Itinerary(ItineraryDocument),
    Prose { text: String },
}

impl ResponseView {
    /// Classify and parse a response
    pub fn from_text(text: &str) -> Self {
        if is_itinerary(text) {
            Self::Itinerary(ItineraryDocument::parse(text))
        } else {
            Self::Prose { text: text.to_string() }
        }
    }

    pub fn itinerary(&self) -> Option<&ItineraryDocument> {
        match self {
            Self::Itinerary(doc) => Some(doc),
            Self::Prose { .. } => None,
        }
    }
}
