//! Static reference data.
//!
//! The mock dataset is used whenever live provider access is unavailable,
//! and always backs airport search. It is built once at startup and handed
//! to the services as a read-only value.

use crate::model::{Airport, Flight};

/// Read-only airports and flights shared by the search services.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    airports: Vec<Airport>,
    flights: Vec<Flight>,
}

impl Dataset {
    /// Create a dataset from explicit records.
    #[must_use]
    pub fn new(airports: Vec<Airport>, flights: Vec<Flight>) -> Self {
        Self { airports, flights }
    }

    /// The bundled mock dataset.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_airports(), builtin_flights())
    }

    /// All airports, in dataset order.
    #[must_use]
    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    /// All flights, in dataset order.
    #[must_use]
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }
}

fn builtin_airports() -> Vec<Airport> {
    vec![
        Airport::new("JFK", "John F. Kennedy International Airport", "New York", "United States"),
        Airport::new("LHR", "Heathrow Airport", "London", "United Kingdom"),
        Airport::new("LAX", "Los Angeles International Airport", "Los Angeles", "United States"),
        Airport::new("CDG", "Charles de Gaulle Airport", "Paris", "France"),
        Airport::new("DXB", "Dubai International Airport", "Dubai", "United Arab Emirates"),
        Airport::new("ORD", "O'Hare International Airport", "Chicago", "United States"),
        Airport::new(
            "SFO",
            "San Francisco International Airport",
            "San Francisco",
            "United States",
        ),
        Airport::new("DEL", "Indira Gandhi International Airport", "New Delhi", "India"),
        Airport::new("BOM", "Chhatrapati Shivaji International Airport", "Mumbai", "India"),
        Airport::new("BLR", "Kempegowda International Airport", "Bangalore", "India"),
        Airport::new("COK", "Cochin International Airport", "Kochi", "India"),
        Airport::new("SYD", "Sydney Airport", "Sydney", "Australia"),
        Airport::new("SIN", "Singapore Changi Airport", "Singapore", "Singapore"),
        Airport::new("HKG", "Hong Kong International Airport", "Hong Kong", "Hong Kong"),
        Airport::new("NRT", "Narita International Airport", "Tokyo", "Japan"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn mock_flight(
    number: &str,
    airline: &str,
    from: &str,
    to: &str,
    departs: &str,
    arrives: &str,
    zones: (&str, &str),
    status: &str,
) -> Flight {
    Flight {
        flight_number: number.to_string(),
        airline: airline.to_string(),
        start_location: from.to_string(),
        end_location: to.to_string(),
        start_time: departs.to_string(),
        end_time: arrives.to_string(),
        time_zone_start: zones.0.to_string(),
        time_zone_end: zones.1.to_string(),
        status: status.to_string(),
    }
}

fn builtin_flights() -> Vec<Flight> {
    vec![
        mock_flight(
            "AA123",
            "American Airlines",
            "JFK - New York",
            "LHR - London",
            "2025-12-18T18:30:00",
            "2025-12-19T06:30:00",
            ("EST", "GMT"),
            "On Time",
        ),
        mock_flight(
            "BA456",
            "British Airways",
            "LHR - London",
            "DXB - Dubai",
            "2025-12-20T09:15:00",
            "2025-12-20T20:15:00",
            ("GMT", "GST"),
            "Delayed",
        ),
        mock_flight(
            "DL789",
            "Delta",
            "LAX - Los Angeles",
            "HND - Tokyo",
            "2025-12-21T11:00:00",
            "2025-12-22T15:30:00",
            ("PST", "JST"),
            "Scheduled",
        ),
        mock_flight(
            "QF1",
            "Qantas",
            "SYD - Sydney",
            "SIN - Singapore",
            "2025-12-22T16:00:00",
            "2025-12-22T21:20:00",
            ("AEDT", "SGT"),
            "On Time",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sizes() {
        let data = Dataset::builtin();
        assert_eq!(data.airports().len(), 15);
        assert_eq!(data.flights().len(), 4);
    }

    #[test]
    fn test_builtin_codes_are_uppercase_iata() {
        for airport in Dataset::builtin().airports() {
            assert_eq!(airport.iata.len(), 3);
            assert_eq!(airport.iata, airport.iata.to_uppercase());
        }
    }

    #[test]
    fn test_empty_dataset() {
        let data = Dataset::default();
        assert!(data.airports().is_empty());
        assert!(data.flights().is_empty());
    }
}
