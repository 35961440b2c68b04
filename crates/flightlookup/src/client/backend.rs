//! Where the lookup client sends its queries.

use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::flights::{suggest_flights, FlightParams, FlightQuery};
use crate::model::{Airport, Flight};
use crate::server::ErrorBody;
use crate::services::Services;

/// Query surface the lookup client depends on.
#[async_trait::async_trait]
pub trait LookupBackend: Send + Sync + std::fmt::Debug {
    /// Run a flight lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    async fn search_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>>;

    /// Run an airport search.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    async fn search_airports(&self, query: &str) -> Result<Vec<Airport>>;

    /// Did-you-mean flights for partially typed `text`.
    ///
    /// Filters the mock catalog by substring.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched.
    async fn flight_suggestions(&self, text: &str) -> Result<Vec<Flight>> {
        let catalog = self.search_flights(&FlightQuery::Catalog).await?;
        Ok(suggest_flights(&catalog, text))
    }
}

#[async_trait::async_trait]
impl LookupBackend for Services {
    async fn search_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        self.flights.search(query).await
    }

    async fn search_airports(&self, query: &str) -> Result<Vec<Airport>> {
        Ok(self.airports.search(query))
    }
}

/// Backend that talks to a running flightlookup server.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a backend for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::backend(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized + Sync,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "lookup request");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("server returned HTTP {status}"),
            };
            return Err(Error::backend(message));
        }

        response
            .json()
            .await
            .map_err(|e| Error::backend(e.to_string()))
    }
}

#[async_trait::async_trait]
impl LookupBackend for HttpBackend {
    async fn search_flights(&self, query: &FlightQuery) -> Result<Vec<Flight>> {
        self.get("/flights", &FlightParams::from(query)).await
    }

    async fn search_airports(&self, query: &str) -> Result<Vec<Airport>> {
        self.get("/airports", &[("search", query)]).await
    }
}
