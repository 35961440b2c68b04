//! Provider record normalization.

use crate::model::{
    format_location, normalize_flight_number, Flight, DEFAULT_TIME_ZONE, UNKNOWN_AIRLINE,
    UNKNOWN_STATUS,
};

use super::{ProviderEndpoint, ProviderFlight};

/// Airport code used when the provider omits one.
pub const UNKNOWN_CODE: &str = "N/A";

/// Airport name used when the provider omits one.
pub const UNKNOWN_AIRPORT: &str = "Unknown Airport";

/// Map a provider record into the canonical [`Flight`].
///
/// `queried_number` is the flight number the caller searched for, used when
/// the record carries no usable flight code of its own.
#[must_use]
pub fn normalize(record: &ProviderFlight, queried_number: Option<&str>) -> Flight {
    let departure = record.departure.as_ref();
    let arrival = record.arrival.as_ref();

    Flight {
        flight_number: flight_number(record, queried_number),
        airline: record
            .airline
            .as_ref()
            .and_then(|a| text(a.name.as_ref()))
            .unwrap_or(UNKNOWN_AIRLINE)
            .to_string(),
        start_location: location(departure),
        end_location: location(arrival),
        start_time: scheduled(departure),
        end_time: scheduled(arrival),
        time_zone_start: time_zone(departure),
        time_zone_end: time_zone(arrival),
        status: text(record.flight_status.as_ref())
            .unwrap_or(UNKNOWN_STATUS)
            .to_string(),
    }
}

fn flight_number(record: &ProviderFlight, queried_number: Option<&str>) -> String {
    let code = record.flight.as_ref();
    if let Some(iata) = code.and_then(|c| text(c.iata.as_ref())) {
        return normalize_flight_number(iata);
    }

    let airline = record.airline.as_ref().and_then(|a| text(a.iata.as_ref()));
    let number = code.and_then(|c| text(c.number.as_ref()));
    if let (Some(airline), Some(number)) = (airline, number) {
        return normalize_flight_number(&format!("{airline}{number}"));
    }

    queried_number.map(normalize_flight_number).unwrap_or_default()
}

fn location(endpoint: Option<&ProviderEndpoint>) -> String {
    let code = endpoint
        .and_then(|e| text(e.iata.as_ref()))
        .map_or_else(|| UNKNOWN_CODE.to_string(), str::to_uppercase);
    let name = endpoint
        .and_then(|e| text(e.airport.as_ref()))
        .unwrap_or(UNKNOWN_AIRPORT);
    format_location(&code, name)
}

fn scheduled(endpoint: Option<&ProviderEndpoint>) -> String {
    endpoint
        .and_then(|e| text(e.scheduled.as_ref()))
        .unwrap_or_default()
        .to_string()
}

fn time_zone(endpoint: Option<&ProviderEndpoint>) -> String {
    endpoint
        .and_then(|e| text(e.timezone.as_ref()))
        .unwrap_or(DEFAULT_TIME_ZONE)
        .to_string()
}

/// A present, non-blank string field.
fn text(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}
