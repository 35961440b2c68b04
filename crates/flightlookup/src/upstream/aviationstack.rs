//! HTTP client for the aviationstack flights endpoint.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::{Error, Result};

use super::{FlightProvider, ProviderQuery, ProviderResponse, ResponseCache};

/// Live provider backed by the aviationstack REST API.
#[derive(Debug)]
pub struct AviationStack {
    client: reqwest::Client,
    base_url: String,
    access_key: String,
    cache: ResponseCache<ProviderResponse>,
}

impl AviationStack {
    /// Create a provider for `base_url` authenticated with `access_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        timeout: Duration,
        cache_ttl: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            access_key: access_key.into(),
            cache: ResponseCache::new(cache_ttl),
        })
    }

    /// Build the provider described by `config`.
    ///
    /// Returns `None` when no access key is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(access_key) = config.access_key() else {
            return Ok(None);
        };
        Self::new(
            config.upstream.base_url.clone(),
            access_key,
            config.upstream_timeout(),
            config.cache_ttl(),
        )
        .map(Some)
    }
}

#[async_trait::async_trait]
impl FlightProvider for AviationStack {
    fn name(&self) -> &'static str {
        "aviationstack"
    }

    async fn fetch(&self, query: &ProviderQuery) -> Result<ProviderResponse> {
        let key = query.cache_key();
        if let Some(cached) = self.cache.get(&key).await {
            debug!(query = %key, "serving provider answer from cache");
            return Ok(cached);
        }

        debug!(query = %key, "querying provider");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("access_key", self.access_key.as_str())])
            .query(&query.params())
            .send()
            .await
            .inspect_err(|e| warn!(query = %key, error = %e, "provider request failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                query = %key,
                status = status.as_u16(),
                %body,
                "provider returned an error status"
            );
            return Err(Error::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ProviderResponse = response
            .json()
            .await
            .inspect_err(|e| {
                warn!(query = %key, error = %e, "provider payload could not be decoded");
            })?;

        if payload.error.is_none() {
            self.cache.insert(key, payload.clone()).await;
        }
        Ok(payload)
    }
}
