//! Core lookup types for flightlookup.
//!
//! This module defines the canonical flight and airport records returned by
//! the search services and served over HTTP.

use serde::{Deserialize, Serialize};

/// Separator between the IATA code and the display name in a location.
pub const LOCATION_SEPARATOR: &str = " - ";

/// Airline name used when the provider does not supply one.
pub const UNKNOWN_AIRLINE: &str = "Unknown Airline";

/// Time zone used when the provider does not supply one.
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Status used when the provider does not supply one.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// A flight in its canonical shape.
///
/// Built fresh for every request, either from the mock dataset or from a
/// normalized provider record. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    /// Uppercase IATA flight code, e.g. `AA123`.
    pub flight_number: String,
    /// Human-readable airline name.
    pub airline: String,
    /// Departure location as `"IATA - Airport Name"`.
    pub start_location: String,
    /// Arrival location as `"IATA - Airport Name"`.
    pub end_location: String,
    /// Scheduled departure, ISO-8601. Empty when unknown.
    pub start_time: String,
    /// Scheduled arrival, ISO-8601. Empty when unknown.
    pub end_time: String,
    /// Departure time zone name or abbreviation.
    pub time_zone_start: String,
    /// Arrival time zone name or abbreviation.
    pub time_zone_end: String,
    /// Free-form status such as `On Time` or `landed`.
    pub status: String,
}

impl Flight {
    /// Check whether this flight has the given number.
    ///
    /// The comparison ignores case and surrounding whitespace of `number`.
    #[must_use]
    pub fn matches_number(&self, number: &str) -> bool {
        let wanted = normalize_flight_number(number);
        !wanted.is_empty() && self.flight_number.to_uppercase() == wanted
    }

    /// IATA code of the departure airport.
    #[must_use]
    pub fn origin_code(&self) -> &str {
        location_code(&self.start_location)
    }

    /// IATA code of the arrival airport.
    #[must_use]
    pub fn destination_code(&self) -> &str {
        location_code(&self.end_location)
    }
}

/// A reference airport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    /// Three-letter IATA code.
    pub iata: String,
    /// Full airport name.
    pub name: String,
    /// City served.
    pub city: String,
    /// Country name.
    pub country: String,
}

impl Airport {
    /// Create a new airport record.
    #[must_use]
    pub fn new(iata: &str, name: &str, city: &str, country: &str) -> Self {
        Self {
            iata: iata.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
        }
    }

    /// The `"IATA - Name"` label used to fill a route field.
    #[must_use]
    pub fn label(&self) -> String {
        format_location(&self.iata, &self.name)
    }

    /// Case-insensitive substring match on code, name or city.
    ///
    /// `needle_lower` must already be lowercase.
    #[must_use]
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.iata.to_lowercase().contains(needle_lower)
            || self.name.to_lowercase().contains(needle_lower)
            || self.city.to_lowercase().contains(needle_lower)
    }
}

/// Trim and uppercase a user-entered flight number.
#[must_use]
pub fn normalize_flight_number(number: &str) -> String {
    number.trim().to_uppercase()
}

/// Join an IATA code and a name into a location label.
#[must_use]
pub fn format_location(iata: &str, name: &str) -> String {
    format!("{iata}{LOCATION_SEPARATOR}{name}")
}

/// Split a location label into its code and name parts.
///
/// A label without the separator is treated as a bare code.
#[must_use]
pub fn split_location(location: &str) -> (&str, Option<&str>) {
    match location.split_once(LOCATION_SEPARATOR) {
        Some((code, name)) => (code.trim(), Some(name.trim())),
        None => (location.trim(), None),
    }
}

/// The code part of a location label.
#[must_use]
pub fn location_code(location: &str) -> &str {
    split_location(location).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(number: &str) -> Flight {
        Flight {
            flight_number: number.to_string(),
            airline: "Test Air".to_string(),
            start_location: "JFK - New York".to_string(),
            end_location: "LHR - London".to_string(),
            start_time: "2025-12-18T18:30:00".to_string(),
            end_time: "2025-12-19T06:30:00".to_string(),
            time_zone_start: "EST".to_string(),
            time_zone_end: "GMT".to_string(),
            status: "On Time".to_string(),
        }
    }

    #[test]
    fn test_matches_number_ignores_case_and_whitespace() {
        let f = flight("AA123");
        assert!(f.matches_number("aa123"));
        assert!(f.matches_number("AA123"));
        assert!(f.matches_number("  AA123 "));
        assert!(!f.matches_number("AA12"));
        assert!(!f.matches_number(""));
        assert!(!f.matches_number("   "));
    }

    #[test]
    fn test_flight_codes() {
        let f = flight("AA123");
        assert_eq!(f.origin_code(), "JFK");
        assert_eq!(f.destination_code(), "LHR");
    }

    #[test]
    fn test_flight_serializes_camel_case() {
        let json = serde_json::to_value(flight("AA123")).unwrap();
        assert_eq!(json["flightNumber"], "AA123");
        assert_eq!(json["timeZoneStart"], "EST");
        assert_eq!(json["startLocation"], "JFK - New York");
        assert!(json.get("flight_number").is_none());
    }

    #[test]
    fn test_airport_label() {
        let a = Airport::new("CDG", "Charles de Gaulle Airport", "Paris", "France");
        assert_eq!(a.label(), "CDG - Charles de Gaulle Airport");
    }

    #[test]
    fn test_airport_matches() {
        let a = Airport::new(
            "SFO",
            "San Francisco International Airport",
            "San Francisco",
            "United States",
        );
        assert!(a.matches("sfo"));
        assert!(a.matches("francisco"));
        assert!(!a.matches("united"));
    }

    #[test]
    fn test_split_location() {
        assert_eq!(split_location("JFK - New York"), ("JFK", Some("New York")));
        assert_eq!(
            split_location("DXB - Dubai - Terminal 3"),
            ("DXB", Some("Dubai - Terminal 3"))
        );
        assert_eq!(split_location(" LAX "), ("LAX", None));
    }

    #[test]
    fn test_normalize_flight_number() {
        assert_eq!(normalize_flight_number(" ba456 "), "BA456");
    }
}
