//! Tests for the HTTP client: construction, response decoding and retries
//!
//! Retry behaviour is checked against a scripted HTTP listener on localhost
//! that answers one canned response per connection.

use crate::Error;
use crate::app::services::geocoder::{GeocodeResponse, GeocodeService, MapQuestClient};
use crate::config::GeocodingConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const POINT_BODY: &str = r#"{"info":{"statuscode":0,"messages":[]},"results":[{"providedLocation":{"location":"A"},"locations":[{"geocodeQuality":"POINT","latLng":{"lat":44.0,"lng":-92.0}}]}]}"#;

const ERROR_BODY: &str = r#"{"error":"unavailable"}"#;

async fn read_request_head(socket: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

/// Serve `responses` in order, one per connection; the last one repeats
async fn scripted_server(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let (status, body) = responses[n.min(responses.len() - 1)];
            let reason = match status {
                200 => "OK",
                400 => "Bad Request",
                _ => "Service Unavailable",
            };
            read_request_head(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}/geocoding/v1/batch", addr), hits)
}

fn local_client(endpoint: String, max_retries: u32) -> MapQuestClient {
    let config = GeocodingConfig {
        endpoint,
        api_key: Some("test-key".to_string()),
        timeout_secs: 5,
        max_retries,
        retry_backoff_ms: 0,
        ..GeocodingConfig::default()
    };
    MapQuestClient::new(&config).unwrap()
}

fn addresses() -> Vec<String> {
    vec!["A".to_string()]
}

#[test]
fn test_client_requires_api_key() {
    let config = GeocodingConfig {
        api_key: None,
        ..GeocodingConfig::default()
    };
    assert!(matches!(
        MapQuestClient::new(&config),
        Err(Error::Configuration { .. })
    ));

    let blank = GeocodingConfig {
        api_key: Some("   ".to_string()),
        ..GeocodingConfig::default()
    };
    assert!(MapQuestClient::new(&blank).is_err());
}

#[test]
fn test_client_builds_with_key() {
    let config = GeocodingConfig {
        api_key: Some("test-key".to_string()),
        ..GeocodingConfig::default()
    };
    assert!(MapQuestClient::new(&config).is_ok());
}

#[test]
fn test_decode_batch_response() {
    let body = r#"{
        "info": { "statuscode": 0 },
        "results": [
            {
                "providedLocation": { "location": "100 MAIN ST, ROCHESTER, MN 55902" },
                "locations": [
                    { "geocodeQuality": "ADDRESS", "latLng": { "lat": 44.02, "lng": -92.47 } },
                    { "geocodeQuality": "CITY", "latLng": { "lat": 44.0, "lng": -92.4 } }
                ]
            },
            {
                "providedLocation": { "location": "NOWHERE" },
                "locations": []
            }
        ]
    }"#;

    let response: GeocodeResponse = serde_json::from_str(body).unwrap();

    assert_eq!(response.results.len(), 2);
    assert_eq!(response.info.statuscode, 0);
    let first = &response.results[0];
    assert_eq!(first.address(), "100 MAIN ST, ROCHESTER, MN 55902");
    assert_eq!(first.best_location().unwrap().lat_lng.lat, 44.02);
    assert!(response.results[1].best_location().is_none());
}

#[test]
fn test_best_location_skips_imprecise_candidates() {
    let body = r#"{
        "providedLocation": { "location": "X" },
        "locations": [
            { "geocodeQuality": "ZIP", "latLng": { "lat": 1.0, "lng": 1.0 } },
            { "geocodeQuality": "POINT", "latLng": { "lat": 2.0, "lng": 2.0 } }
        ]
    }"#;

    let result: crate::app::services::geocoder::GeocodeResult =
        serde_json::from_str(body).unwrap();
    assert_eq!(result.best_location().unwrap().lat_lng.lat, 2.0);
}

#[tokio::test]
async fn test_server_error_is_retried_then_succeeds() {
    let (endpoint, hits) = scripted_server(vec![(503, ERROR_BODY), (200, POINT_BODY)]).await;
    let client = local_client(endpoint, 1);

    let results = client.geocode_batch(&addresses()).await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].best_location().unwrap().lat_lng.lat, 44.0);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let (endpoint, hits) = scripted_server(vec![(400, ERROR_BODY), (200, POINT_BODY)]).await;
    let client = local_client(endpoint, 3);

    let error = client.geocode_batch(&addresses()).await.unwrap_err();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(matches!(error, Error::Http { .. }));
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_no_retry_when_retries_disabled() {
    let (endpoint, hits) = scripted_server(vec![(503, ERROR_BODY), (200, POINT_BODY)]).await;
    let client = local_client(endpoint, 0);

    let error = client.geocode_batch(&addresses()).await.unwrap_err();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(error.is_transient());
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let (endpoint, hits) = scripted_server(vec![(503, ERROR_BODY)]).await;
    let client = local_client(endpoint, 2);

    assert!(client.geocode_batch(&addresses()).await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_service_status_code_fails_batch() {
    let body = r#"{"info":{"statuscode":403,"messages":["Invalid key"]},"results":[]}"#;
    let (endpoint, hits) = scripted_server(vec![(200, body)]).await;
    let client = local_client(endpoint, 1);

    let error = client.geocode_batch(&addresses()).await.unwrap_err();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(matches!(error, Error::Geocoding { .. }));
    assert!(error.to_string().contains("Invalid key"));
}

#[tokio::test]
async fn test_refused_connection_is_transient() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = local_client(format!("http://{}/batch", addr), 0);

    let error = client.geocode_batch(&addresses()).await.unwrap_err();

    assert!(error.is_transient());
}
