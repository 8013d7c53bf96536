// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::{json, Value};
use std::sync::Arc;
use strava_export::config::Config;
use strava_export::routes::create_router;
use strava_export::AppState;

pub const TEST_TOKEN: &str = "test-access-token";

/// Config pointing both Strava base URLs at a mock server.
#[allow(dead_code)]
pub fn test_config(server_uri: &str) -> Config {
    Config {
        strava_api_url: server_uri.to_string(),
        strava_oauth_url: format!("{server_uri}/oauth"),
        ..Config::default()
    }
}

/// Create a test app talking to a mock Strava at `server_uri`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(server_uri: &str) -> (axum::Router, Arc<AppState>) {
    create_test_app_with(test_config(server_uri))
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::from_config(config));
    (create_router(state.clone()), state)
}

/// GET request carrying the test token as a Bearer header.
#[allow(dead_code)]
pub fn authed_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

/// Raw Strava summary record as returned by `/athlete/activities`.
#[allow(dead_code)]
pub fn summary_json(id: u64, start_local: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Activity {id}"),
        "sport_type": "Ride",
        "start_date": start_local,
        "start_date_local": start_local,
        "distance": 25000.0,
        "moving_time": 3600,
        "total_elevation_gain": 250.0,
        "average_speed": 6.944,
        "max_speed": 15.0,
        "average_watts": 180.0,
        "max_watts": 520,
        "kilojoules": 648.0,
        "resource_state": 2
    })
}

/// A page of `count` summaries, one per day starting 2024-03-01.
#[allow(dead_code)]
pub fn summary_page(count: u64) -> Value {
    let records: Vec<Value> = (1..=count)
        .map(|i| {
            let day = (i - 1) % 28 + 1;
            summary_json(i, &format!("2024-03-{day:02}T08:00:00Z"))
        })
        .collect();
    Value::Array(records)
}

/// Raw Strava detail record as returned by `/activities/{id}`.
#[allow(dead_code)]
pub fn details_json(id: u64) -> Value {
    json!({
        "id": id,
        "average_cadence": 88.0,
        "average_heartrate": 140.5,
        "max_heartrate": 172.0,
        "calories": 800.0,
        "device_name": "Garmin Edge 530",
        "gear": { "id": "b1", "name": "Road bike" }
    })
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
