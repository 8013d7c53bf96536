// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;

/// Failure while talking to Strava or converting what it returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("No Strava access token was supplied")]
    AuthenticationMissing,

    #[error("Strava rate limit reached")]
    RateLimited,

    #[error("Strava returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Request to Strava failed: {0}")]
    Network(String),

    #[error("Unexpected Strava response: {0}")]
    Decode(String),

    #[error("Strava did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Moving time {0}s cannot be converted into a duration")]
    InvalidDuration(i64),

    #[error("Enrichment task failed: {0}")]
    Task(String),
}

/// A fetch error tied to the activity it happened for.
///
/// `activity_id` is `None` for failures of the listing call itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct ActivityError {
    pub activity_id: Option<u64>,
    pub error: FetchError,
}

impl ActivityError {
    pub fn new(activity_id: u64, error: FetchError) -> Self {
        Self {
            activity_id: Some(activity_id),
            error,
        }
    }

    /// Error that applies to the whole page rather than one record.
    pub fn page(error: FetchError) -> Self {
        Self {
            activity_id: None,
            error,
        }
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Strava rate limit reached")]
    RateLimited,

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::AuthenticationMissing => AppError::Unauthorized,
            FetchError::RateLimited => AppError::RateLimited,
            other => AppError::StravaApi(other.to_string()),
        }
    }
}

impl From<ActivityError> for AppError {
    fn from(err: ActivityError) -> Self {
        err.error.into()
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                Some("Strava rate limit reached, try again later".to_string()),
            ),
            AppError::StravaApi(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
