// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spreadsheet export and logout endpoint tests against a mock Strava.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

#[tokio::test]
async fn test_export_returns_workbook() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/athlete/activities"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "60"))
        .and(query_param("after", "1709251199"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            common::summary_json(3, "2024-03-09T08:00:00Z"),
            common::summary_json(1, "2024-03-01T08:00:00Z"),
            common::summary_json(2, "2024-03-05T08:00:00Z"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/activities/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::details_json(0)))
        .expect(3)
        .mount(&server)
        .await;

    let (app, _) = common::create_test_app(&server.uri());
    let response = app
        .oneshot(common::authed_get("/api/export?from=2024-03-01"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"strava-export.xlsx\""
    );

    let body = axum::body::to_bytes(response.into_body(), 10 * 1024 * 1024)
        .await
        .unwrap();
    assert!(body.starts_with(b"PK"));
}

#[tokio::test]
async fn test_export_of_empty_range_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/athlete/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (app, _) = common::create_test_app(&server.uri());
    let response = app
        .oneshot(common::authed_get(
            "/api/export?from=2030-01-01&to=2030-01-31",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_export_rate_limited_detail_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/athlete/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::summary_page(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/activities/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::details_json(1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/activities/2"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let (app, _) = common::create_test_app(&server.uri());
    let response = app
        .oneshot(common::authed_get("/api/export"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

fn logout_request() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/logout")
        .header(header::COOKIE, format!("strava_token={}", common::TEST_TOKEN))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_logout_deauthorizes_and_clears_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/deauthorize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": common::TEST_TOKEN
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = common::create_test_app(&server.uri());
    let response = app.oneshot(logout_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("strava_token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_logout_with_revoked_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/deauthorize"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = common::create_test_app(&server.uri());
    let response = app.oneshot(logout_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_logout_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/deauthorize"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (app, _) = common::create_test_app(&server.uri());
    let response = app.oneshot(logout_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
