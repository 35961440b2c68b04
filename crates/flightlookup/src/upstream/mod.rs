//! Upstream flight-data provider.
//!
//! The provider is reached through the [`FlightProvider`] trait so that the
//! flight search service does not depend on a particular vendor:
//!
//! - **Schema**: [`ProviderResponse`] and friends describe the provider
//!   payload with every field optional, since providers omit fields freely.
//!
//! - **Normalization**: [`normalize`] turns a provider record into the
//!   canonical [`Flight`](crate::model::Flight), substituting defaults.
//!
//! - **HTTP**: [`AviationStack`] performs the single GET per query and
//!   reuses answers for a short window through [`ResponseCache`].

mod aviationstack;
mod cache;
mod normalize;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use aviationstack::AviationStack;
pub use cache::ResponseCache;
pub use normalize::{normalize, UNKNOWN_AIRPORT, UNKNOWN_CODE};

/// A query the provider understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderQuery {
    /// Flights with the given IATA flight code.
    FlightNumber(String),
    /// Flights on a date between two airports.
    Route {
        /// Flight date, `YYYY-MM-DD`.
        date: String,
        /// Departure airport IATA code.
        dep_iata: String,
        /// Arrival airport IATA code.
        arr_iata: String,
    },
}

impl ProviderQuery {
    /// Query-string parameters for this query, excluding credentials.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::FlightNumber(number) => vec![("flight_iata", number.clone())],
            Self::Route {
                date,
                dep_iata,
                arr_iata,
            } => vec![
                ("flight_date", date.clone()),
                ("dep_iata", dep_iata.clone()),
                ("arr_iata", arr_iata.clone()),
            ],
        }
    }

    /// Stable key identifying this query in the response cache.
    #[must_use]
    pub fn cache_key(&self) -> String {
        self.params()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Top-level provider payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderResponse {
    /// Flight records, when the query succeeded.
    pub data: Option<Vec<ProviderFlight>>,
    /// Error description, when the provider rejected the query.
    pub error: Option<ProviderError>,
}

/// Error object returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderError {
    /// Provider error code; a string or a number depending on the error.
    pub code: Option<serde_json::Value>,
    /// Human-readable description.
    pub info: Option<String>,
    /// Alternate description field used by some error kinds.
    pub message: Option<String>,
}

impl ProviderError {
    /// The best available description of this error.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.info.clone().or_else(|| self.message.clone())
    }
}

/// One flight record as the provider shapes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderFlight {
    /// Flight date, `YYYY-MM-DD`.
    pub flight_date: Option<String>,
    /// Status such as `scheduled`, `active` or `landed`.
    pub flight_status: Option<String>,
    /// Departure side.
    pub departure: Option<ProviderEndpoint>,
    /// Arrival side.
    pub arrival: Option<ProviderEndpoint>,
    /// Operating airline.
    pub airline: Option<ProviderAirline>,
    /// Flight identifiers.
    pub flight: Option<ProviderFlightCode>,
}

/// Departure or arrival details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoint {
    /// Airport name.
    pub airport: Option<String>,
    /// Time zone name, e.g. `America/New_York`.
    pub timezone: Option<String>,
    /// Airport IATA code.
    pub iata: Option<String>,
    /// Scheduled time, ISO-8601.
    pub scheduled: Option<String>,
    /// Estimated time, ISO-8601.
    pub estimated: Option<String>,
    /// Actual time, ISO-8601.
    pub actual: Option<String>,
}

/// Airline details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderAirline {
    /// Airline name.
    pub name: Option<String>,
    /// Airline IATA code.
    pub iata: Option<String>,
}

/// Flight identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderFlightCode {
    /// Numeric part of the flight code.
    pub number: Option<String>,
    /// Full IATA flight code, e.g. `AA123`.
    pub iata: Option<String>,
    /// Full ICAO flight code, e.g. `AAL123`.
    pub icao: Option<String>,
}

/// A source of live flight data.
#[async_trait::async_trait]
pub trait FlightProvider: Send + Sync + std::fmt::Debug {
    /// The name of this provider (for logging).
    fn name(&self) -> &'static str;

    /// Perform one lookup against the provider.
    ///
    /// A provider-level rejection is not an error here: it comes back as a
    /// [`ProviderResponse`] with `error` set, and the caller decides.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached, answers with a
    /// non-success status, or sends a body that is not a provider payload.
    async fn fetch(&self, query: &ProviderQuery) -> Result<ProviderResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_number_params() {
        let q = ProviderQuery::FlightNumber("AA123".to_string());
        assert_eq!(q.params(), vec![("flight_iata", "AA123".to_string())]);
        assert_eq!(q.cache_key(), "flight_iata=AA123");
    }

    #[test]
    fn test_route_params() {
        let q = ProviderQuery::Route {
            date: "2025-12-18".to_string(),
            dep_iata: "JFK".to_string(),
            arr_iata: "LHR".to_string(),
        };
        assert_eq!(
            q.cache_key(),
            "flight_date=2025-12-18&dep_iata=JFK&arr_iata=LHR"
        );
    }

    #[test]
    fn test_partial_payload_deserializes() {
        let json = r#"{"data": [{"flight": {"iata": "aa123"}, "departure": null}]}"#;
        let payload: ProviderResponse = serde_json::from_str(json).unwrap();
        let data = payload.data.unwrap();
        assert_eq!(data.len(), 1);
        assert!(data[0].departure.is_none());
        assert!(data[0].airline.is_none());
        assert!(payload.error.is_none());
    }

    #[test]
    fn test_error_payload_deserializes() {
        let json =
            r#"{"error": {"code": 101, "info": "You have not supplied an API Access Key."}}"#;
        let payload: ProviderResponse = serde_json::from_str(json).unwrap();
        assert!(payload.data.is_none());
        let error = payload.error.unwrap();
        assert_eq!(
            error.description().as_deref(),
            Some("You have not supplied an API Access Key.")
        );
    }

    #[test]
    fn test_error_description_falls_back_to_message() {
        let error = ProviderError {
            message: Some("rate limited".to_string()),
            ..ProviderError::default()
        };
        assert_eq!(error.description().as_deref(), Some("rate limited"));
        assert!(ProviderError::default().description().is_none());
    }

    #[test]
    fn test_empty_object_is_empty_payload() {
        let payload: ProviderResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(payload, ProviderResponse::default());
    }
}
