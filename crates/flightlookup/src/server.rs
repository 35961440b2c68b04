//! HTTP surface.
//!
//! Exposes the search services as JSON endpoints:
//!
//! - `GET /airports?search=<s>`
//! - `GET /flights?flightNumber=<n>`
//! - `GET /flights?flight_date=<d>&dep_iata=<o>&arr_iata=<a>`
//! - `GET /status`
//!
//! Every failure is answered with HTTP 500 and `{ "error": <message> }`,
//! where the message is [`Error::public_message`]. A flight lookup that runs
//! past the request timeout fails the same way.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::flights::{FlightParams, FlightQuery};
use crate::model::{Airport, Flight};
use crate::services::{ProviderStatus, Services};

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// User-safe error message.
    pub error: String,
}

/// Query string of `GET /airports`.
#[derive(Debug, Default, Deserialize)]
struct AirportParams {
    search: Option<String>,
}

#[derive(Debug, Clone)]
struct AppState {
    services: Arc<Services>,
    request_timeout: Duration,
}

/// Build the router over `services`.
///
/// Flight lookups still running after `request_timeout` are abandoned and
/// answered as a fetch failure.
pub fn router(services: Arc<Services>, request_timeout: Duration) -> Router {
    Router::new()
        .route("/airports", get(airports))
        .route("/flights", get(flights))
        .route("/status", get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState {
            services,
            request_timeout,
        })
}

/// A running HTTP server.
#[derive(Debug)]
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_sender: oneshot::Sender<()>,
    join_handle: JoinHandle<Result<()>>,
}

impl ServerHandle {
    /// Bind `config.server.addr` and start serving in a background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(config: &Config, services: Arc<Services>) -> Result<Self> {
        let addr = config.server.addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::Bind { addr, source })?;
        let addr = listener.local_addr()?;
        let app = router(services, config.request_timeout());

        let (shutdown_sender, shutdown_receiver) = oneshot::channel();
        let join_handle = tokio::spawn(async move {
            info!("starting HTTP server on {addr}");
            serve(listener, app, async move {
                // A dropped sender also means shut down
                let _ = shutdown_receiver.await;
                info!("starting graceful shutdown for HTTP server...");
            })
            .await
        });

        Ok(Self {
            addr,
            shutdown_sender,
            join_handle,
        })
    }

    /// The address actually bound, with any ephemeral port resolved.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for clients of this server.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop accepting connections and wait for in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the server task failed.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_sender.send(());
        self.join_handle
            .await
            .map_err(|e| Error::internal(format!("HTTP server task failed: {e}")))??;
        info!("HTTP server has been shut down.");
        Ok(())
    }
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Resolves when the process receives Ctrl-C.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_upstream_error() {
            warn!(error = %self.0, "upstream lookup failed");
        } else {
            error!(error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.public_message(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

async fn airports(
    State(state): State<AppState>,
    Query(params): Query<AirportParams>,
) -> Json<Vec<Airport>> {
    let search = params.search.unwrap_or_default();
    Json(state.services.airports.search(&search))
}

async fn flights(
    State(state): State<AppState>,
    Query(params): Query<FlightParams>,
) -> std::result::Result<Json<Vec<Flight>>, ApiError> {
    let query = FlightQuery::from(&params);
    let search = state.services.flights.search(&query);
    let flights = tokio::time::timeout(state.request_timeout, search)
        .await
        .map_err(|_| Error::UpstreamTimeout {
            secs: state.request_timeout.as_secs(),
        })??;
    Ok(Json(flights))
}

async fn status(State(state): State<AppState>) -> Json<ProviderStatus> {
    Json(state.services.status().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::flights::tests::FakeProvider;
    use crate::upstream::ProviderResponse;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.server.addr = SocketAddr::from(([127, 0, 0, 1], 0));
        config
    }

    fn flight_number_url(server: &ServerHandle) -> String {
        format!("{}/flights?flightNumber=AA123", server.url())
    }

    async fn get_json(url: &str) -> (u16, serde_json::Value) {
        let response = reqwest::get(url).await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_flight_number_endpoint() {
        crate::logging::init_test_logging();
        let server = ServerHandle::start(&test_config(), Arc::new(Services::mock()))
            .await
            .unwrap();

        let (status, body) = get_json(&flight_number_url(&server)).await;
        assert_eq!(status, 200);
        let flights = body.as_array().unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0]["flightNumber"], "AA123");
        assert_eq!(flights[0]["status"], "On Time");

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_airports_endpoint() {
        let server = ServerHandle::start(&test_config(), Arc::new(Services::mock()))
            .await
            .unwrap();

        let (_, body) = get_json(&format!("{}/airports?search=jo", server.url())).await;
        assert!(body
            .as_array()
            .unwrap()
            .iter()
            .any(|a| a["iata"] == "JFK"));

        let (_, short) = get_json(&format!("{}/airports?search=j", server.url())).await;
        assert_eq!(short, serde_json::json!([]));

        let (_, missing) = get_json(&format!("{}/airports", server.url())).await;
        assert_eq!(missing, serde_json::json!([]));

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_incomplete_route_is_empty_array() {
        let server = ServerHandle::start(&test_config(), Arc::new(Services::mock()))
            .await
            .unwrap();

        let (status, body) = get_json(&format!(
            "{}/flights?flight_date=2025-12-18&dep_iata=JFK",
            server.url()
        ))
        .await;
        assert_eq!(status, 200);
        assert_eq!(body, serde_json::json!([]));

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unconfigured_is_500() {
        let services = Services::new(Arc::new(Dataset::builtin()), None, false, 0);
        let server = ServerHandle::start(&test_config(), Arc::new(services))
            .await
            .unwrap();

        let (status, body) = get_json(&flight_number_url(&server)).await;
        assert_eq!(status, 500);
        assert_eq!(body["error"], "Flight data provider is not configured");

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_provider_failure_is_generic_500() {
        let provider = FakeProvider::answering(Err(Error::UpstreamStatus {
            status: 401,
            body: "{\"secret\": true}".to_string(),
        }));
        let services = Services::new(Arc::new(Dataset::builtin()), Some(provider), true, 8);
        let server = ServerHandle::start(&test_config(), Arc::new(services))
            .await
            .unwrap();

        let (status, body) = get_json(&flight_number_url(&server)).await;
        assert_eq!(status, 500);
        assert_eq!(
            body,
            serde_json::json!({ "error": "Failed to fetch flight data" })
        );

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_slow_provider_is_generic_500() {
        let provider =
            FakeProvider::answering_after(Ok(ProviderResponse::default()), Duration::from_secs(3));
        let services = Services::new(Arc::new(Dataset::builtin()), Some(provider), true, 8);
        let mut config = test_config();
        config.server.request_timeout_secs = 1;
        let server = ServerHandle::start(&config, Arc::new(services))
            .await
            .unwrap();

        let (status, body) = get_json(&flight_number_url(&server)).await;
        assert_eq!(status, 500);
        assert_eq!(
            body,
            serde_json::json!({ "error": "Failed to fetch flight data" })
        );

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let provider = FakeProvider::answering(Ok(ProviderResponse::default()));
        let services = Services::new(Arc::new(Dataset::builtin()), Some(provider), true, 32);
        let server = ServerHandle::start(&test_config(), Arc::new(services))
            .await
            .unwrap();

        let (_, body) = get_json(&format!("{}/status", server.url())).await;
        assert_eq!(
            body,
            serde_json::json!({ "hasApiKey": true, "keyLength": 32, "mode": "live" })
        );

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_error() {
        let first = ServerHandle::start(&test_config(), Arc::new(Services::mock()))
            .await
            .unwrap();
        let mut config = test_config();
        config.server.addr = first.addr();

        let err = ServerHandle::start(&config, Arc::new(Services::mock()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Bind { .. }));

        first.shutdown().await.unwrap();
    }
}
