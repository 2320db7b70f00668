//! Terminal rendering for messages and itineraries

use std::fmt::Write;

use colored::Colorize;

use crate::chat::{Message, Role};
use crate::itinerary::{
    DaySection, GeoPoint, ItineraryDocument, MapView, OvernightDetail, ResponseView, SummaryBlock, SummarySection,
};

/// Itinerary carried by an assistant message, if any
///
/// A document with only summary sections still counts.
pub fn message_itinerary(message: &Message) -> Option<ItineraryDocument> {
    if message.role != Role::Assistant || message.is_placeholder() {
        return None;
    }
    match ResponseView::from_text(&message.text) {
        ResponseView::Itinerary(doc) if !doc.is_empty() => Some(doc),
        _ => None,
    }
}

/// One chat line, with itineraries shown as their first day
pub fn format_message(message: &Message) -> String {
    let label = match message.role {
        Role::User => "you".bright_green().bold(),
        Role::Assistant => "guide".bright_blue().bold(),
    };
    if message.is_placeholder() {
        return format!("{} {}", label, message.text.dimmed());
    }
    if let Some(doc) = message_itinerary(message) {
        let body = if doc.days.is_empty() {
            format_document(&doc)
        } else {
            format_day(&doc, 0)
        };
        return format!("{} {}\n{}", label, "Your trip itinerary".bright_cyan().bold(), body);
    }
    format!("{} {}", label, message.text)
}

/// A single day card with its position in the carousel
pub fn format_day(doc: &ItineraryDocument, index: usize) -> String {
    let Some(day) = doc.days.get(index) else {
        return String::new();
    };
    let mut out = String::new();
    let position = if doc.days.len() > 1 {
        format!("  ({}/{}, /prev /next)", index + 1, doc.days.len())
    } else {
        String::new()
    };
    let _ = writeln!(out, "{}{}", day.title.bright_white().bold(), position.dimmed());
    write_day_fields(&mut out, day);
    out.trim_end().to_string()
}

fn write_day_fields(out: &mut String, day: &DaySection) {
    let fields = [
        ("Route", &day.route),
        ("Driving", &day.driving),
        ("Start time suggestion", &day.start_time),
        ("Notes", &day.notes),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "  {} {}", format!("{}:", label).bold(), value);
        }
    }
    if !day.pois.is_empty() {
        let _ = writeln!(out, "  {}", "Points of interest:".bold());
        for (i, poi) in day.pois.iter().enumerate() {
            let _ = writeln!(out, "    {}. {} - {}", i + 1, poi.name, poi.description);
        }
    }
    if let Some(overnight) = &day.overnight {
        let _ = writeln!(out, "  {} {}", "Overnight:".bold(), overnight.city);
        for detail in overnight.classified() {
            let line = match detail {
                OvernightDetail::Accommodation { text } => format!("Accommodation: {}", text),
                OvernightDetail::Dining { text } => format!("Dining: {}", text),
                OvernightDetail::Reason { place, text } => format!("Why {}: {}", place, text),
                OvernightDetail::Plain { text } => text,
            };
            let _ = writeln!(out, "    {}", line);
        }
    }
    for item in &day.other {
        let _ = writeln!(out, "  • {}", item);
    }
}

pub fn format_summary(section: &SummarySection) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", section.title.bright_cyan().bold());
    for block in &section.content {
        match block {
            SummaryBlock::Paragraph(text) => {
                let _ = writeln!(out, "  {}", text);
            }
            SummaryBlock::Bullets(items) => {
                for item in items {
                    let _ = writeln!(out, "  • {}", item);
                }
            }
        }
    }
    out.trim_end().to_string()
}

/// Every day and summary, for non-interactive output
pub fn format_document(doc: &ItineraryDocument) -> String {
    let mut parts: Vec<String> = Vec::new();
    for day in &doc.days {
        let mut out = String::new();
        let _ = writeln!(out, "{}", day.title.bright_white().bold());
        write_day_fields(&mut out, day);
        parts.push(out.trim_end().to_string());
    }
    parts.extend(doc.summaries.iter().map(format_summary));
    parts.join("\n\n")
}

pub fn format_view(view: &ResponseView) -> String {
    match view {
        ResponseView::Itinerary(doc) => format_document(doc),
        ResponseView::Prose { text } => text.clone(),
    }
}

fn point(p: GeoPoint) -> String {
    format!("{:.4}, {:.4}", p.lat, p.lon)
}

/// Text stand-in for the map widget
pub fn format_map(view: &MapView) -> String {
    let mut out = String::new();
    if view.is_empty() {
        let _ = writeln!(out, "{}", "No map data for this day.".dimmed());
        return out.trim_end().to_string();
    }
    if let (Some(start), Some(end)) = (view.start(), view.end()) {
        let _ = writeln!(out, "  {} {}", "Start:".bold(), point(start));
        let _ = writeln!(out, "  {} {}", "End:".bold(), point(end));
    }
    let _ = writeln!(out, "  {} {} points", "Route:".bold(), view.route.len());
    for marker in &view.markers {
        let _ = writeln!(out, "  [{}] {} ({})", marker.number, marker.poi.name, point(marker.poi.coordinates));
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIP: &str = "Day 1\n- Route: Seattle → Portland\n- Overnight: Portland\n  - Why Portland: Halfway\n\nDay 2\n- Route: Portland → Eugene\n- Attractions & Points of Interest:\n  - Skinner Butte (-123.0936,44.0582): Views\n\nNotes\n- Leave early";

    #[test]
    fn test_itinerary_message_shows_first_day() {
        let text = format_message(&Message::assistant(TRIP));
        assert!(text.contains("Seattle → Portland"));
        assert!(text.contains("Why Portland: Halfway"));
        assert!(!text.contains("Eugene"));
        assert!(text.contains("1/2"));
    }

    #[test]
    fn test_summary_only_itinerary_message() {
        let text = "DAY_SECTIONS:\nSUMMARY_SECTIONS:\nEstimated total trip driving time\n- Day 1: 3h\n\nNotes\n- Leave early";
        let message = Message::assistant(text);

        let doc = message_itinerary(&message).unwrap();
        assert!(doc.days.is_empty());
        assert_eq!(doc.summaries.len(), 2);

        let shown = format_message(&message);
        assert!(shown.contains("Your trip itinerary"));
        assert!(shown.contains("Estimated total trip driving time"));
        assert!(shown.contains("• Leave early"));
        assert!(!shown.contains("SUMMARY_SECTIONS"));
    }

    #[test]
    fn test_message_itinerary_skips_prose_and_user() {
        assert!(message_itinerary(&Message::assistant("Have a good trip")).is_none());
        assert!(message_itinerary(&Message::user(TRIP)).is_none());
        assert_eq!(message_itinerary(&Message::assistant(TRIP)).map(|d| d.days.len()), Some(2));
    }

    #[test]
    fn test_prose_message_verbatim() {
        let text = format_message(&Message::assistant("Have a good trip"));
        assert!(text.ends_with("Have a good trip"));
    }

    #[test]
    fn test_document_has_all_sections() {
        let doc = ItineraryDocument::parse(TRIP);
        let text = format_document(&doc);
        assert!(text.contains("Day 1"));
        assert!(text.contains("1. Skinner Butte - Views"));
        assert!(text.contains("• Leave early"));
    }

    #[test]
    fn test_map_text() {
        let doc = ItineraryDocument::parse(TRIP);
        let map = doc.map(1).unwrap();
        assert!(format_map(&map).contains("[1] Skinner Butte"));
        assert!(format_map(&doc.map(0).unwrap()).contains("No map data"));
    }

    #[test]
    fn test_out_of_range_day_is_empty() {
        let doc = ItineraryDocument::parse(TRIP);
        assert!(format_day(&doc, 7).is_empty());
    }
}
