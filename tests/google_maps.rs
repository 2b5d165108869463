use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fareline::api::FareAPI;
use fareline::clock::FixedClock;
use fareline::engine::Engine;
use fareline::entities::{FareRequest, Location, TrafficLevel};
use fareline::external::DistanceMatrix;
use fareline::pricing::PricingConfig;
use fareline::random::FixedRandom;

const MATRIX_PATH: &str = "/maps/api/distancematrix/json";

fn points() -> (Location, Location) {
    (
        Location::new("MG Road, Bangalore", 12.9756, 77.6066),
        Location::new("Whitefield, Bangalore", 12.9698, 77.75),
    )
}

fn matrix_body(distance: f64, duration: f64, in_traffic: f64) -> serde_json::Value {
    json!({
        "status": "OK",
        "rows": [{
            "elements": [{
                "status": "OK",
                "distance": { "text": "17.4 km", "value": distance },
                "duration": { "text": "40 mins", "value": duration },
                "duration_in_traffic": { "text": "55 mins", "value": in_traffic }
            }]
        }]
    })
}

#[tokio::test]
async fn route_comes_from_distance_matrix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MATRIX_PATH))
        .and(query_param("origins", "12.9756,77.6066"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(matrix_body(17_400.0, 2_400.0, 3_300.0)))
        .expect(1)
        .mount(&server)
        .await;

    let (pickup, dropoff) = points();
    let route = DistanceMatrix::new(server.uri(), "test-key")
        .find_route(&pickup, &dropoff)
        .await
        .unwrap();

    assert_eq!(route.distance_meters, 17_400.0);
    assert_eq!(route.duration_minutes, 55.0);
    // 3300 / 2400 = 1.375
    assert_eq!(route.traffic_level, TrafficLevel::Heavy);
}

#[tokio::test]
async fn client_error_is_invalid_input() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MATRIX_PATH))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let (pickup, dropoff) = points();
    let err = DistanceMatrix::new(server.uri(), "test-key")
        .find_route(&pickup, &dropoff)
        .await
        .unwrap_err();

    assert_eq!(err.code, 101);
}

#[tokio::test]
async fn refused_request_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MATRIX_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "REQUEST_DENIED", "rows": [] })),
        )
        .mount(&server)
        .await;

    let (pickup, dropoff) = points();
    let err = DistanceMatrix::new(server.uri(), "test-key")
        .find_route(&pickup, &dropoff)
        .await
        .unwrap_err();

    assert_eq!(err.code, 4);
}

#[tokio::test]
async fn engine_estimates_route_when_maps_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MATRIX_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let engine = Engine::builder(PricingConfig::default())
        .clock(FixedClock(
            chrono::DateTime::parse_from_rfc3339("2024-01-10T13:00:00+05:30").unwrap(),
        ))
        .random(FixedRandom(0.5))
        .route_resolver(DistanceMatrix::new(server.uri(), "test-key"))
        .build();

    let (pickup, dropoff) = points();
    let result = engine
        .compare_fares(FareRequest::new(pickup, dropoff))
        .await
        .unwrap();

    assert_eq!(result.quotes.len(), 3);
}
