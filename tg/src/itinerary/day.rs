//! Day section field extraction
//!
//! A single pass over the day's lines with an explicit scanner state. A
//! recognised bullet prefix opens a field, and the field stays open until
//! the next prefix. Indented lines attach to the open field. Unindented
//! keyword bullets attach only to an open overnight stay. Anything else
//! lands in `other` without closing the field.

use serde::Serialize;
use tracing::debug;

use super::geo::{self, GeoPoint};
use super::poi::{self, Poi};

/// Top-level fields of a day, in the order they are written back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Route,
    RouteCoordinates,
    Driving,
    StartTime,
    Attractions,
    Notes,
    Overnight,
}

impl Field {
    pub fn prefix(self) -> &'static str {
        match self {
            Field::Route => "- Route:",
            Field::RouteCoordinates => "- Route Coordinates:",
            Field::Driving => "- Driving:",
            Field::StartTime => "- Start time suggestion:",
            Field::Attractions => "- Attractions & Points of Interest:",
            Field::Notes => "- Notes:",
            Field::Overnight => "- Overnight:",
        }
    }

    /// Field opened by a trimmed line, with the rest of the line
    fn match_line(line: &str) -> Option<(Field, &str)> {
        FIELDS
            .iter()
            .find_map(|f| line.strip_prefix(f.prefix()).map(|rest| (*f, rest.trim())))
    }
}

const FIELDS: [Field; 7] = [
    Field::RouteCoordinates,
    Field::Route,
    Field::Driving,
    Field::StartTime,
    Field::Attractions,
    Field::Notes,
    Field::Overnight,
];

/// Lead-ins that mark an overnight detail even without indentation
const OVERNIGHT_KEYWORDS: [&str; 2] = ["Accommodation options:", "Dining options:"];

/// What the scanner is currently attaching lines to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    None,
    In(Field),
}

/// One classified input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Field(Field, &'a str),
    /// Indented line, with any bullet marker removed
    Indented(&'a str),
    /// Unindented `Accommodation options:`, `Dining options:` or `Why ...` bullet
    Keyword(&'a str),
    Plain(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    if let Some((field, rest)) = Field::match_line(trimmed) {
        return Line::Field(field, rest);
    }

    let item = trimmed.strip_prefix("- ").map(str::trim).unwrap_or(trimmed);
    if raw.starts_with([' ', '\t']) {
        return Line::Indented(item);
    }
    if trimmed.starts_with("- ") && is_overnight_keyword(item) {
        return Line::Keyword(item);
    }
    Line::Plain(item)
}

fn is_overnight_keyword(item: &str) -> bool {
    OVERNIGHT_KEYWORDS.iter().any(|k| item.contains(k)) || item.starts_with("Why ")
}

/// Where the overnight stop is and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overnight {
    pub city: String,
    pub details: Vec<String>,
}

/// Overnight detail by kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OvernightDetail {
    Accommodation { text: String },
    Dining { text: String },
    Reason { place: String, text: String },
    Plain { text: String },
}

impl OvernightDetail {
    pub fn classify(detail: &str) -> Self {
        if let Some(rest) = detail.strip_prefix("Accommodation options:") {
            return Self::Accommodation {
                text: rest.trim().to_string(),
            };
        }
        if let Some(rest) = detail.strip_prefix("Dining options:") {
            return Self::Dining {
                text: rest.trim().to_string(),
            };
        }
        if let Some((place, reason)) = detail.strip_prefix("Why ").and_then(|r| r.split_once(':')) {
            return Self::Reason {
                place: place.trim().to_string(),
                text: reason.trim().to_string(),
            };
        }
        Self::Plain {
            text: detail.to_string(),
        }
    }
}

impl Overnight {
    pub fn classified(&self) -> Vec<OvernightDetail> {
        self.details.iter().map(|d| OvernightDetail::classify(d)).collect()
    }
}

/// One parsed day of the itinerary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DaySection {
    pub day_number: u32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_coordinates: Option<String>,
    /// Parsed `route_coordinates`; empty when missing or invalid
    pub route_points: Vec<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driving: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overnight: Option<Overnight>,
    pub attractions: Vec<String>,
    pub pois: Vec<Poi>,
    pub other: Vec<String>,
}

impl DaySection {
    /// Parse a day's body (the lines after the `Day N` title)
    pub fn parse(day_number: u32, title: &str, body: &str) -> Self {
        debug!(day_number, "DaySection::parse: called");
        let mut day = Self {
            day_number,
            title: title.trim().to_string(),
            ..Default::default()
        };

        let mut state = ScanState::None;
        for raw in body.lines() {
            state = day.step(state, classify(raw));
        }

        if let Some(coords) = &day.route_coordinates {
            day.route_points = geo::parse_route_coordinates(coords).unwrap_or_default();
        }
        day.pois = poi::extract_pois(&day.attractions);
        day
    }

    /// Scanner transition: apply one line and return the next state
    ///
    /// Only a field prefix changes the state.
    fn step(&mut self, state: ScanState, line: Line<'_>) -> ScanState {
        match (state, line) {
            (_, Line::Field(field, rest)) => {
                self.open(field, rest);
                ScanState::In(field)
            }
            (ScanState::In(Field::Overnight), Line::Keyword(item)) => {
                self.extend(Field::Overnight, item);
                state
            }
            (ScanState::In(field), Line::Indented(item)) => {
                self.extend(field, item);
                state
            }
            (state, Line::Blank) => state,
            (state, Line::Indented(item) | Line::Keyword(item) | Line::Plain(item)) => {
                self.other.push(item.to_string());
                state
            }
        }
    }

    fn open(&mut self, field: Field, rest: &str) {
        let value = rest.to_string();
        match field {
            Field::Route => self.route = Some(value),
            Field::RouteCoordinates => self.route_coordinates = Some(value),
            Field::Driving => self.driving = Some(value),
            Field::StartTime => self.start_time = Some(value),
            Field::Notes => self.notes = Some(value),
            Field::Overnight => {
                self.overnight = Some(Overnight {
                    city: value,
                    details: Vec::new(),
                })
            }
            Field::Attractions => {
                if !value.is_empty() {
                    self.attractions.push(value);
                }
            }
        }
    }

    /// Attach a nested line to the open field
    fn extend(&mut self, field: Field, item: &str) {
        let item = item.to_string();
        let scalar = match field {
            Field::Overnight => {
                if let Some(overnight) = self.overnight.as_mut() {
                    overnight.details.push(item);
                }
                return;
            }
            Field::Attractions => {
                self.attractions.push(item);
                return;
            }
            Field::Route => &mut self.route,
            Field::RouteCoordinates => &mut self.route_coordinates,
            Field::Driving => &mut self.driving,
            Field::StartTime => &mut self.start_time,
            Field::Notes => &mut self.notes,
        };
        match scalar {
            Some(text) if !text.is_empty() => {
                text.push(' ');
                text.push_str(&item);
            }
            _ => *scalar = Some(item),
        }
    }

    /// Route points from `Route Coordinates:`, else from a `ROUTE_GEOMETRY:` in the driving text
    pub fn route_path(&self) -> Vec<GeoPoint> {
        if !self.route_points.is_empty() {
            return self.route_points.clone();
        }
        self.driving
            .as_deref()
            .and_then(geo::parse_route_geometry)
            .unwrap_or_default()
    }

    /// Write the recognised fields back in the bullet vocabulary
    pub fn to_body(&self) -> String {
        let mut lines: Vec<String> = self.other.iter().map(|o| format!("- {}", o)).collect();

        let scalars = [
            (Field::Route, &self.route),
            (Field::RouteCoordinates, &self.route_coordinates),
            (Field::Driving, &self.driving),
            (Field::StartTime, &self.start_time),
        ];
        for (field, value) in scalars {
            if let Some(value) = value {
                lines.push(format!("{} {}", field.prefix(), value));
            }
        }
        if !self.attractions.is_empty() {
            lines.push(Field::Attractions.prefix().to_string());
            lines.extend(self.attractions.iter().map(|a| format!("  - {}", a)));
        }
        if let Some(notes) = &self.notes {
            lines.push(format!("{} {}", Field::Notes.prefix(), notes));
        }
        if let Some(overnight) = &self.overnight {
            lines.push(format!("{} {}", Field::Overnight.prefix(), overnight.city));
            lines.extend(overnight.details.iter().map(|d| format!("  - {}", d)));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
- Route: Seattle → Portland
- Route Coordinates: [-122.3321,47.6062;-122.6765,45.5231]
- Driving: 2h 55m (175 min), 280 km
- Start time suggestion: 9:00 AM
- Attractions & Points of Interest:
  - Space Needle (-122.3493,47.6205): Observation tower
  - Broken (999,1): nope
- Notes: Traffic near Tacoma
- Overnight: Portland
  - Accommodation options: Hotel Lucia, Ace Hotel
  - Dining options: Pok Pok
  - Why Portland: Halfway point";

    #[test]
    fn test_parse_all_fields() {
        let day = DaySection::parse(1, "Day 1", SAMPLE);
        assert_eq!(day.route.as_deref(), Some("Seattle → Portland"));
        assert_eq!(day.driving.as_deref(), Some("2h 55m (175 min), 280 km"));
        assert_eq!(day.start_time.as_deref(), Some("9:00 AM"));
        assert_eq!(day.notes.as_deref(), Some("Traffic near Tacoma"));
        assert_eq!(day.route_points.len(), 2);
        assert_eq!(day.attractions.len(), 2);
        assert_eq!(day.pois.len(), 1);
        assert_eq!(day.pois[0].name, "Space Needle");

        let overnight = day.overnight.as_ref().unwrap();
        assert_eq!(overnight.city, "Portland");
        assert_eq!(overnight.details.len(), 3);
        assert!(day.other.is_empty());
    }

    #[test]
    fn test_overnight_keyword_lines_without_indent() {
        let body = "- Overnight: Eugene\n- Accommodation options: Inn\n- Why Eugene: Close to I-5";
        let day = DaySection::parse(2, "Day 2", body);
        let overnight = day.overnight.unwrap();
        assert_eq!(overnight.details, vec!["Accommodation options: Inn", "Why Eugene: Close to I-5"]);
    }

    #[test]
    fn test_stray_bullet_keeps_overnight_open() {
        let body = "- Bring snacks\n- Overnight: Bend\n- Check tire pressure\n  - Accommodation options: Riverhouse\n- Dining options: Zydeco";
        let day = DaySection::parse(3, "Day 3", body);
        assert_eq!(day.other, vec!["Bring snacks", "Check tire pressure"]);
        assert_eq!(
            day.overnight.unwrap().details,
            vec!["Accommodation options: Riverhouse", "Dining options: Zydeco"]
        );
    }

    #[test]
    fn test_keyword_bullet_outside_overnight_is_other() {
        let day = DaySection::parse(1, "Day 1", "- Route: Seattle → Portland\n- Why this route: scenic");
        assert_eq!(day.route.as_deref(), Some("Seattle → Portland"));
        assert_eq!(day.other, vec!["Why this route: scenic"]);
    }

    #[test]
    fn test_indented_line_before_any_field_is_other() {
        let day = DaySection::parse(1, "Day 1", "  - loose note\n- Notes: Early start");
        assert_eq!(day.other, vec!["loose note"]);
        assert_eq!(day.notes.as_deref(), Some("Early start"));
    }

    #[test]
    fn test_nested_line_extends_scalar_field() {
        let day = DaySection::parse(1, "Day 1", "- Notes: Leave early\n  - fuel up in Olympia");
        assert_eq!(day.notes.as_deref(), Some("Leave early fuel up in Olympia"));
    }

    #[test]
    fn test_attractions_on_prefix_line() {
        let day = DaySection::parse(
            1,
            "Day 1",
            "- Attractions & Points of Interest: Golden Gate Bridge (-122.4783,37.8199): Iconic suspension bridge",
        );
        assert_eq!(day.pois.len(), 1);
        assert_eq!(day.pois[0].coordinates, GeoPoint { lat: 37.8199, lon: -122.4783 });
    }

    #[test]
    fn test_invalid_route_coordinates_leave_text() {
        let day = DaySection::parse(1, "Day 1", "- Route Coordinates: [a,b]");
        assert_eq!(day.route_coordinates.as_deref(), Some("[a,b]"));
        assert!(day.route_points.is_empty());
    }

    #[test]
    fn test_to_body_round_trips_fields() {
        let day = DaySection::parse(1, "Day 1", SAMPLE);
        let again = DaySection::parse(1, "Day 1", &day.to_body());
        assert_eq!(again, day);
    }

    #[test]
    fn test_overnight_detail_classification() {
        let overnight = Overnight {
            city: "Medford".to_string(),
            details: vec![
                "Accommodation options: Rogue Regency".to_string(),
                "Dining options: Elements".to_string(),
                "Why Medford: Good stopping point".to_string(),
                "Pool open late".to_string(),
            ],
        };
        assert_eq!(
            overnight.classified(),
            vec![
                OvernightDetail::Accommodation {
                    text: "Rogue Regency".to_string()
                },
                OvernightDetail::Dining {
                    text: "Elements".to_string()
                },
                OvernightDetail::Reason {
                    place: "Medford".to_string(),
                    text: "Good stopping point".to_string()
                },
                OvernightDetail::Plain {
                    text: "Pool open late".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_route_path_falls_back_to_geometry() {
        let body = r#"- Driving: 3h ROUTE_GEOMETRY: {"type": "LineString", "coordinates": [[-122.3, 47.6], [-122.6, 45.5]]}"#;
        let day = DaySection::parse(1, "Day 1", body);
        assert!(day.route_points.is_empty());
        assert_eq!(day.route_path().len(), 2);
    }
}
