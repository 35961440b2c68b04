//! Error types for flightlookup.
//!
//! Every failure the lookup services can produce is described here. Upstream
//! and configuration failures carry enough detail for logs, while
//! [`Error::public_message`] gives the short string that is safe to show to
//! an end user.

use std::net::SocketAddr;

use thiserror::Error;

/// Message returned to callers for any upstream transport or status failure.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch flight data";

/// Message returned when live lookups are required but no access key is set.
pub const NOT_CONFIGURED_MESSAGE: &str = "Flight data provider is not configured";

/// Fallback when the provider reports an error without any description.
pub const PROVIDER_ERROR_FALLBACK: &str = "Upstream provider returned an error";

/// The main error type for flightlookup operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Upstream Errors ===
    /// Live lookups were requested but no provider access key is configured.
    #[error("flight data provider is not configured")]
    ProviderNotConfigured,

    /// The provider answered with a non-success HTTP status.
    #[error("upstream returned HTTP {status}: {body}")]
    UpstreamStatus {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Raw response body, kept for logging only.
        body: String,
    },

    /// The request to the provider could not be completed or decoded.
    #[error("upstream request failed: {0}")]
    UpstreamRequest(#[from] reqwest::Error),

    /// The lookup did not finish within the request timeout.
    #[error("upstream did not answer within {secs}s")]
    UpstreamTimeout {
        /// The timeout that elapsed, in seconds.
        secs: u64,
    },

    /// The provider answered successfully but reported a logical error.
    #[error("upstream rejected the query: {message}")]
    UpstreamRejected {
        /// Provider-supplied description (or a generic fallback).
        message: String,
    },

    // === Client Errors ===
    /// A lookup backend failed to answer a client request.
    #[error("lookup backend failed: {0}")]
    Backend(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Server Errors ===
    /// Failed to bind the HTTP listener.
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        /// Address that could not be bound.
        addr: SocketAddr,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === I/O Errors ===
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for flightlookup operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an upstream rejection from the provider's optional message.
    ///
    /// A missing or blank message is replaced by [`PROVIDER_ERROR_FALLBACK`].
    #[must_use]
    pub fn upstream_rejected(message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| PROVIDER_ERROR_FALLBACK.to_string());
        Self::UpstreamRejected { message }
    }

    /// Create a new backend error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error originated from the upstream provider.
    #[must_use]
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            Self::UpstreamStatus { .. }
                | Self::UpstreamRequest(_)
                | Self::UpstreamTimeout { .. }
                | Self::UpstreamRejected { .. }
        )
    }

    /// The message that may be shown to an end user.
    ///
    /// Status codes, response bodies and transport details never leave the
    /// service; only the provider's own logical error text is passed through.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::ProviderNotConfigured => NOT_CONFIGURED_MESSAGE.to_string(),
            Self::UpstreamStatus { .. }
            | Self::UpstreamRequest(_)
            | Self::UpstreamTimeout { .. } => FETCH_FAILED_MESSAGE.to_string(),
            Self::UpstreamRejected { message } => message.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}
