//! Flight search.
//!
//! Lookups go to the live provider when one is configured and to the mock
//! dataset otherwise. Provider payloads are interpreted here: records are
//! normalized, provider-reported errors become [`Error::UpstreamRejected`],
//! and a payload with neither data nor error means "no flights".

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::model::{location_code, normalize_flight_number, Flight};
use crate::upstream::{normalize, FlightProvider, ProviderQuery, ProviderResponse};

/// A date and airport pair to search between.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteQuery {
    /// Flight date, `YYYY-MM-DD`.
    pub date: String,
    /// Departure IATA code.
    pub origin: String,
    /// Arrival IATA code.
    pub destination: String,
}

impl RouteQuery {
    /// Create a route query.
    ///
    /// Airport fields accept either a bare code or an `"IATA - Name"` label;
    /// only the trimmed, uppercased code is kept.
    #[must_use]
    pub fn new(date: &str, origin: &str, destination: &str) -> Self {
        Self {
            date: date.trim().to_string(),
            origin: location_code(origin).to_uppercase(),
            destination: location_code(destination).to_uppercase(),
        }
    }

    /// Whether all three parts are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.date.is_empty() && !self.origin.is_empty() && !self.destination.is_empty()
    }

    fn matches(&self, flight: &Flight) -> bool {
        flight.origin_code().eq_ignore_ascii_case(&self.origin)
            && flight.destination_code().eq_ignore_ascii_case(&self.destination)
            && flight.start_time.starts_with(&self.date)
    }
}

/// A flight lookup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightQuery {
    /// Exact flight-number lookup.
    Number(String),
    /// Flights on a date between two airports.
    Route(RouteQuery),
    /// The full mock flight list, used for did-you-mean suggestions.
    Catalog,
}

/// The query-string shape of `GET /flights`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightParams {
    /// Flight number for an exact lookup.
    #[serde(rename = "flightNumber", skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    /// Route date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_date: Option<String>,
    /// Route departure code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dep_iata: Option<String>,
    /// Route arrival code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arr_iata: Option<String>,
}

impl From<&FlightParams> for FlightQuery {
    fn from(params: &FlightParams) -> Self {
        if let Some(number) = params.flight_number.as_deref().filter(|n| !n.is_empty()) {
            return Self::Number(number.to_string());
        }
        if params.flight_date.is_none() && params.dep_iata.is_none() && params.arr_iata.is_none()
        {
            return Self::Catalog;
        }
        Self::Route(RouteQuery::new(
            params.flight_date.as_deref().unwrap_or_default(),
            params.dep_iata.as_deref().unwrap_or_default(),
            params.arr_iata.as_deref().unwrap_or_default(),
        ))
    }
}

impl From<&FlightQuery> for FlightParams {
    fn from(query: &FlightQuery) -> Self {
        match query {
            FlightQuery::Number(number) => Self {
                flight_number: Some(number.clone()),
                ..Self::default()
            },
            FlightQuery::Route(route) => Self {
                flight_date: Some(route.date.clone()),
                dep_iata: Some(route.origin.clone()),
                arr_iata: Some(route.destination.clone()),
                ..Self::default()
            },
            FlightQuery::Catalog => Self::default(),
        }
    }
}

/// Where flight lookups are answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// A provider is configured.
    Live,
    /// No provider; the mock dataset answers.
    Mock,
    /// No provider and mock fallback disabled; lookups fail.
    Unconfigured,
}

impl std::fmt::Display for LookupMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Mock => write!(f, "mock"),
            Self::Unconfigured => write!(f, "unconfigured"),
        }
    }
}

/// Flight lookup over the provider or the mock dataset.
#[derive(Debug, Clone)]
pub struct FlightSearch {
    dataset: Arc<Dataset>,
    provider: Option<Arc<dyn FlightProvider>>,
    mock_fallback: bool,
}

impl FlightSearch {
    /// Create a flight search.
    ///
    /// Without a provider, lookups use `dataset` when `mock_fallback` is set
    /// and fail with [`Error::ProviderNotConfigured`] otherwise.
    #[must_use]
    pub fn new(
        dataset: Arc<Dataset>,
        provider: Option<Arc<dyn FlightProvider>>,
        mock_fallback: bool,
    ) -> Self {
        Self {
            dataset,
            provider,
            mock_fallback,
        }
    }

    /// Where lookups are answered from.
    #[must_use]
    pub fn mode(&self) -> LookupMode {
        match (&self.provider, self.mock_fallback) {
            (Some(_), _) => LookupMode::Live,
            (None, true) => LookupMode::Mock,
            (None, false) => LookupMode::Unconfigured,
        }
    }

    /// Run a flight lookup.
    ///
    /// An incomplete route or a blank flight number yields an empty result
    /// without contacting the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is required but not configured, the
    /// provider call fails, or the provider reports an error.
    pub async fn search(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        match query {
            FlightQuery::Catalog => Ok(self.dataset.flights().to_vec()),
            FlightQuery::Number(number) => self.search_number(number).await,
            FlightQuery::Route(route) => self.search_route(route).await,
        }
    }

    async fn search_number(&self, number: &str) -> Result<Vec<Flight>> {
        let number = normalize_flight_number(number);
        if number.is_empty() {
            return Ok(Vec::new());
        }

        match &self.provider {
            Some(provider) => {
                debug!(provider = provider.name(), %number, "live flight-number lookup");
                let response = provider
                    .fetch(&ProviderQuery::FlightNumber(number.clone()))
                    .await?;
                interpret(response, Some(&number))
            }
            None if self.mock_fallback => {
                let flights: Vec<Flight> = self
                    .dataset
                    .flights()
                    .iter()
                    .filter(|f| f.matches_number(&number))
                    .cloned()
                    .collect();
                debug!(%number, count = flights.len(), "mock flight-number lookup");
                Ok(flights)
            }
            None => Err(Error::ProviderNotConfigured),
        }
    }

    async fn search_route(&self, route: &RouteQuery) -> Result<Vec<Flight>> {
        if !route.is_complete() {
            debug!(?route, "incomplete route query");
            return Ok(Vec::new());
        }

        match &self.provider {
            Some(provider) => {
                debug!(provider = provider.name(), ?route, "live route lookup");
                let response = provider
                    .fetch(&ProviderQuery::Route {
                        date: route.date.clone(),
                        dep_iata: route.origin.clone(),
                        arr_iata: route.destination.clone(),
                    })
                    .await?;
                interpret(response, None)
            }
            None if self.mock_fallback => Ok(self
                .dataset
                .flights()
                .iter()
                .filter(|f| route.matches(f))
                .cloned()
                .collect()),
            None => Err(Error::ProviderNotConfigured),
        }
    }
}

/// Turn a provider payload into flights or an error.
fn interpret(response: ProviderResponse, queried_number: Option<&str>) -> Result<Vec<Flight>> {
    match response {
        ProviderResponse {
            data: Some(records),
            ..
        } => Ok(records
            .iter()
            .map(|record| normalize(record, queried_number))
            .collect()),
        ProviderResponse {
            data: None,
            error: Some(error),
        } => {
            info!(?error, "provider rejected the query");
            Err(Error::upstream_rejected(error.description()))
        }
        ProviderResponse {
            data: None,
            error: None,
        } => Ok(Vec::new()),
    }
}

/// Flights from `catalog` whose number contains `text`, ignoring case.
///
/// Used for the did-you-mean list; exact lookups never use substring
/// matching.
#[must_use]
pub fn suggest_flights(catalog: &[Flight], text: &str) -> Vec<Flight> {
    let needle = normalize_flight_number(text);
    if needle.is_empty() {
        return Vec::new();
    }
    catalog
        .iter()
        .filter(|f| f.flight_number.to_uppercase().contains(&needle))
        .cloned()
        .collect()
}
