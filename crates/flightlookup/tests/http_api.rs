//! End-to-end tests: the lookup server in live mode against a local stand-in
//! for the flight-data provider, both on ephemeral ports.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use flightlookup::client::{DebounceTiming, Field, HttpBackend, LookupBackend, LookupClient};
use flightlookup::server::ServerHandle;
use flightlookup::{Config, FlightQuery, RouteQuery, Services};

const ACCESS_KEY: &str = "test-key";

#[derive(Debug, Default)]
struct FakeProvider {
    hits: AtomicUsize,
}

async fn provider_flights(
    State(provider): State<Arc<FakeProvider>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    provider.hits.fetch_add(1, Ordering::SeqCst);

    if params.get("access_key").map(String::as_str) != Some(ACCESS_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "code": "invalid_access_key" } })),
        )
            .into_response();
    }

    if params.contains_key("flight_date") {
        return Json(json!({
            "data": [
                {
                    "flight_status": "active",
                    "departure": { "iata": params["dep_iata"], "airport": "Heathrow" },
                    "arrival": { "iata": params["arr_iata"] },
                    "airline": { "name": "British Airways", "iata": "BA" },
                    "flight": { "number": "456" }
                }
            ]
        }))
        .into_response();
    }

    match params.get("flight_iata").map(String::as_str) {
        Some("AA123") => Json(json!({
            "pagination": { "count": 1 },
            "data": [
                {
                    "flight_date": "2025-12-18",
                    "flight_status": "scheduled",
                    "departure": {
                        "airport": "John F Kennedy International",
                        "timezone": "America/New_York",
                        "iata": "JFK",
                        "scheduled": "2025-12-18T18:30:00+00:00"
                    },
                    "arrival": {
                        "airport": "Heathrow",
                        "timezone": "Europe/London",
                        "iata": "LHR",
                        "scheduled": "2025-12-19T06:30:00+00:00"
                    },
                    "airline": { "name": "American Airlines", "iata": "AA" },
                    "flight": { "number": "123", "iata": "AA123", "icao": "AAL123" }
                }
            ]
        }))
        .into_response(),
        Some("XX1") => Json(json!({
            "error": {
                "code": "function_access_restricted",
                "info": "Your plan does not support this."
            }
        }))
        .into_response(),
        Some("ERR1") => (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response(),
        Some("BAD1") => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => Json(json!({ "pagination": { "count": 0 } })).into_response(),
    }
}

async fn start_provider() -> (String, Arc<FakeProvider>) {
    let provider = Arc::new(FakeProvider::default());
    let app = Router::new()
        .route("/v1/flights", get(provider_flights))
        .with_state(Arc::clone(&provider));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1/flights"), provider)
}

fn live_config(base_url: &str, key: &str) -> Config {
    let mut config = Config::default();
    config.server.addr = SocketAddr::from(([127, 0, 0, 1], 0));
    config.upstream.base_url = base_url.to_string();
    config.upstream.access_key = Some(key.to_string());
    config
}

async fn start_server(config: &Config) -> ServerHandle {
    let services = Services::from_config(config).unwrap();
    ServerHandle::start(config, Arc::new(services)).await.unwrap()
}

async fn get_json(url: &str) -> (u16, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_live_flight_number_lookup() {
    let (provider_url, provider) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;

    let (status, body) = get_json(&format!("{}/flights?flightNumber=aa123", server.url())).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!([{
            "flightNumber": "AA123",
            "airline": "American Airlines",
            "startLocation": "JFK - John F Kennedy International",
            "endLocation": "LHR - Heathrow",
            "startTime": "2025-12-18T18:30:00+00:00",
            "endTime": "2025-12-19T06:30:00+00:00",
            "timeZoneStart": "America/New_York",
            "timeZoneEnd": "Europe/London",
            "status": "scheduled"
        }])
    );
    assert_eq!(provider.hits.load(Ordering::SeqCst), 1);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_repeat_lookup_is_served_from_cache() {
    let (provider_url, provider) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;

    for number in ["AA123", " aa123 ", "AA123"] {
        let url = format!("{}/flights?flightNumber={number}", server.url());
        let (status, _) = get_json(&url).await;
        assert_eq!(status, 200);
    }
    assert_eq!(provider.hits.load(Ordering::SeqCst), 1);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_live_route_lookup_fills_defaults() {
    let (provider_url, _) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;

    let (status, body) = get_json(&format!(
        "{}/flights?flight_date=2025-12-20&dep_iata=lhr&arr_iata=dxb",
        server.url()
    ))
    .await;
    assert_eq!(status, 200);
    let flight = &body[0];
    assert_eq!(flight["flightNumber"], "BA456");
    assert_eq!(flight["startLocation"], "LHR - Heathrow");
    assert_eq!(flight["endLocation"], "DXB - Unknown Airport");
    assert_eq!(flight["startTime"], "");
    assert_eq!(flight["timeZoneStart"], "UTC");
    assert_eq!(flight["status"], "active");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_provider_error_payload_is_passed_through() {
    let (provider_url, _) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;

    let (status, body) = get_json(&format!("{}/flights?flightNumber=XX1", server.url())).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Your plan does not support this." }));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_provider_failures_are_generic() {
    let (provider_url, _) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;

    for number in ["ERR1", "BAD1"] {
        let url = format!("{}/flights?flightNumber={number}", server.url());
        let (status, body) = get_json(&url).await;
        assert_eq!(status, 500);
        assert_eq!(body, json!({ "error": "Failed to fetch flight data" }));
    }

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rejected_key_is_generic() {
    let (provider_url, _) = start_provider().await;
    let server = start_server(&live_config(&provider_url, "wrong-key")).await;

    let (status, body) = get_json(&format!("{}/flights?flightNumber=AA123", server.url())).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "Failed to fetch flight data" }));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_empty_provider_answer_is_no_flights() {
    let (provider_url, _) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;

    let (status, body) = get_json(&format!("{}/flights?flightNumber=ZZ999", server.url())).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([]));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_incomplete_route_never_reaches_provider() {
    let (provider_url, provider) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;

    let (status, body) = get_json(&format!(
        "{}/flights?flight_date=2025-12-20&arr_iata=DXB",
        server.url()
    ))
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([]));
    assert_eq!(provider.hits.load(Ordering::SeqCst), 0);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_status_reports_key_without_revealing_it() {
    let (provider_url, _) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;

    let response = reqwest::get(format!("{}/status", server.url()))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!response.contains(ACCESS_KEY));
    let body: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(body["hasApiKey"], true);
    assert_eq!(body["keyLength"], ACCESS_KEY.len());
    assert_eq!(body["mode"], "live");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_mock_mode_examples() {
    let mut config = Config::default();
    config.server.addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let server = start_server(&config).await;

    let (_, flights) = get_json(&format!("{}/flights?flightNumber=AA123", server.url())).await;
    assert_eq!(flights.as_array().unwrap().len(), 1);
    assert_eq!(flights[0]["status"], "On Time");

    let (_, airports) = get_json(&format!("{}/airports?search=jo", server.url())).await;
    assert!(airports
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a["iata"] == "JFK"));

    let (_, catalog) = get_json(&format!("{}/flights", server.url())).await;
    assert_eq!(catalog.as_array().unwrap().len(), 4);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_http_backend_against_live_server() {
    let (provider_url, _) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;
    let backend = HttpBackend::new(&server.url(), Duration::from_secs(5)).unwrap();

    let flights = backend
        .search_flights(&FlightQuery::Route(RouteQuery::new(
            "2025-12-20",
            "LHR - Heathrow Airport",
            "DXB - Dubai International Airport",
        )))
        .await
        .unwrap();
    assert_eq!(flights[0].flight_number, "BA456");

    let err = backend
        .search_flights(&FlightQuery::Number("XX1".to_string()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Your plan does not support this."));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_lookup_client_over_http() {
    let (provider_url, _) = start_provider().await;
    let server = start_server(&live_config(&provider_url, ACCESS_KEY)).await;
    let backend = Arc::new(HttpBackend::new(&server.url(), Duration::from_secs(5)).unwrap());
    let timing = DebounceTiming {
        flight: Duration::from_millis(20),
        airport: Duration::from_millis(20),
    };
    let client = LookupClient::spawn(backend, timing);

    client.input(Field::FlightNumber, "ERR1").unwrap();
    client.submit().unwrap();
    let state = client.settle(|s| !s.is_loading()).await.unwrap();
    assert_eq!(
        state.notice().map(|n| n.to_string()).as_deref(),
        Some("An error occurred while fetching flight details.")
    );

    client.input(Field::FlightNumber, "AA123").unwrap();
    client.submit().unwrap();
    let state = client.settle(|s| !s.is_loading()).await.unwrap();
    assert_eq!(state.notice(), None);
    assert_eq!(state.results()[0].airline, "American Airlines");

    client.shutdown().await.unwrap();
    server.shutdown().await.unwrap();
}
