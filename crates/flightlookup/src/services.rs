//! The lookup services wired together from configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::airports::AirportSearch;
use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::flights::{FlightSearch, LookupMode};
use crate::upstream::{AviationStack, FlightProvider};

/// Airport and flight search sharing one dataset.
#[derive(Debug, Clone)]
pub struct Services {
    /// Airport autocomplete.
    pub airports: AirportSearch,
    /// Flight lookup.
    pub flights: FlightSearch,
    status: ProviderStatus,
}

/// Whether live lookups are available, as reported by `GET /status`.
///
/// The key itself is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    /// A provider access key is configured.
    pub has_api_key: bool,
    /// Length of the configured key, 0 when absent.
    pub key_length: usize,
    /// Where flight lookups are answered from.
    pub mode: LookupMode,
}

impl Services {
    /// Assemble services from explicit parts.
    #[must_use]
    pub fn new(
        dataset: Arc<Dataset>,
        provider: Option<Arc<dyn FlightProvider>>,
        mock_fallback: bool,
        key_length: usize,
    ) -> Self {
        let flights = FlightSearch::new(Arc::clone(&dataset), provider, mock_fallback);
        let status = ProviderStatus {
            has_api_key: key_length > 0,
            key_length,
            mode: flights.mode(),
        };
        Self {
            airports: AirportSearch::new(dataset),
            flights,
            status,
        }
    }

    /// Services over the bundled dataset, with no provider.
    #[must_use]
    pub fn mock() -> Self {
        Self::new(Arc::new(Dataset::builtin()), None, true, 0)
    }

    /// Build services from configuration over the bundled dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = AviationStack::from_config(config)?
            .map(|p| Arc::new(p) as Arc<dyn FlightProvider>);
        let key_length = config.access_key().map_or(0, str::len);
        let services = Self::new(
            Arc::new(Dataset::builtin()),
            provider,
            config.upstream.mock_fallback,
            key_length,
        );
        info!(mode = %services.status.mode, "lookup services ready");
        Ok(services)
    }

    /// Provider availability summary.
    #[must_use]
    pub fn status(&self) -> &ProviderStatus {
        &self.status
    }
}
