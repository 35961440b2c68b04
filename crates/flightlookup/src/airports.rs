//! Airport autocomplete search.

use std::sync::Arc;

use tracing::trace;

use crate::dataset::Dataset;
use crate::model::Airport;

/// Shortest query that produces results.
pub const MIN_QUERY_LEN: usize = 2;

/// Largest number of airports returned by one search.
pub const MAX_RESULTS: usize = 10;

/// Substring search over the reference airports.
#[derive(Debug, Clone)]
pub struct AirportSearch {
    dataset: Arc<Dataset>,
}

impl AirportSearch {
    /// Create a search over the given dataset.
    #[must_use]
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    /// Find airports whose code, name or city contains `query`.
    ///
    /// Queries shorter than [`MIN_QUERY_LEN`] characters return nothing.
    /// Matching ignores case, results keep dataset order and are capped at
    /// [`MAX_RESULTS`].
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<Airport> {
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let matches: Vec<Airport> = self
            .dataset
            .airports()
            .iter()
            .filter(|airport| airport.matches(&needle))
            .take(MAX_RESULTS)
            .cloned()
            .collect();

        trace!(query, count = matches.len(), "airport search");
        matches
    }
}
