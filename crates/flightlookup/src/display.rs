//! Plain-text rendering of flights and airports.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDateTime};

use crate::model::{split_location, Airport, Flight};

/// Shown when a time cannot be parsed.
pub const UNKNOWN_TIME: &str = "--:--";

/// Visual class of a flight status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// "On Time"
    OnTime,
    /// "Delayed"
    Delayed,
    /// "Scheduled"
    Scheduled,
    /// Anything else.
    Other,
}

impl StatusClass {
    /// Classify a status string, ignoring case.
    #[must_use]
    pub fn of(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "on time" => Self::OnTime,
            "delayed" => Self::Delayed,
            "scheduled" => Self::Scheduled,
            _ => Self::Other,
        }
    }

    /// Marker printed next to the status.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::OnTime => "+",
            Self::Delayed => "!",
            Self::Scheduled => "~",
            Self::Other => " ",
        }
    }
}

/// Parse an ISO-8601 timestamp, with or without an offset.
fn parse_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Wall-clock time as `HH:MM`, in the timestamp's own offset.
#[must_use]
pub fn format_time(value: &str) -> String {
    parse_time(value).map_or_else(|| UNKNOWN_TIME.to_string(), |t| t.format("%H:%M").to_string())
}

/// Date as e.g. `Thu, Dec 18`; empty if unparseable.
#[must_use]
pub fn format_date(value: &str) -> String {
    parse_time(value).map_or_else(String::new, |t| t.format("%a, %b %-d").to_string())
}

/// Render a flight as a multi-line card.
#[must_use]
pub fn flight_card(flight: &Flight) -> String {
    let (from_code, from_city) = split_location(&flight.start_location);
    let (to_code, to_city) = split_location(&flight.end_location);
    let class = StatusClass::of(&flight.status);

    let mut card = String::new();
    let _ = writeln!(
        card,
        "{} {}  [{}] {}",
        flight.flight_number,
        flight.airline,
        class.marker(),
        flight.status
    );
    let _ = writeln!(
        card,
        "  {:<4} {:<20} -> {:<4} {}",
        from_code,
        from_city.unwrap_or_default(),
        to_code,
        to_city.unwrap_or_default()
    );
    let _ = writeln!(
        card,
        "  {} {} {:<10} -> {} {} {}",
        format_time(&flight.start_time),
        format_date(&flight.start_time),
        flight.time_zone_start,
        format_time(&flight.end_time),
        format_date(&flight.end_time),
        flight.time_zone_end
    );
    card
}

/// Render an airport as one line.
#[must_use]
pub fn airport_line(airport: &Airport) -> String {
    format!("{} ({}, {})", airport.label(), airport.city, airport.country)
}
