// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for listing activities and fetching their details.
//!
//! Handles:
//! - Paginated activity listing with date bounds
//! - Per-activity detail lookup
//! - Token deauthorization on logout
//! - Rate limit detection (surfaced separately from other failures)

use crate::config::Config;
use crate::error::FetchError;
use crate::models::ActivityQuery;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Strava OAuth access token supplied by the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// The two Strava calls the activity pipeline depends on.
pub trait ActivityApi: Send + Sync + 'static {
    /// List the athlete's activities for one page of `query`.
    fn list_activities(
        &self,
        token: &AccessToken,
        query: &ActivityQuery,
    ) -> impl Future<Output = Result<Vec<StravaActivitySummary>, FetchError>> + Send;

    /// Fetch the detail record of one activity.
    fn get_activity_details(
        &self,
        token: &AccessToken,
        activity_id: u64,
    ) -> impl Future<Output = Result<StravaActivityDetails, FetchError>> + Send;
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_url: String,
    oauth_url: String,
}

impl StravaClient {
    /// Create a new Strava client against the given base URLs.
    pub fn new(api_url: impl Into<String>, oauth_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            api_url: api_url.into(),
            oauth_url: oauth_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.strava_api_url, &config.strava_oauth_url)
    }

    /// Deauthorize the application for a user.
    ///
    /// POST https://www.strava.com/oauth/deauthorize
    /// Authorization: Bearer {access_token}
    ///
    /// This invalidates all access and refresh tokens for the user.
    pub async fn deauthorize(&self, token: &AccessToken) -> Result<(), FetchError> {
        let url = format!("{}/deauthorize", self.oauth_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        check_status(response).await?;
        tracing::info!("Strava deauthorization successful");
        Ok(())
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &AccessToken,
        params: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token.secret())
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let response = check_status(response).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

impl ActivityApi for StravaClient {
    async fn list_activities(
        &self,
        token: &AccessToken,
        query: &ActivityQuery,
    ) -> Result<Vec<StravaActivitySummary>, FetchError> {
        let url = format!("{}/athlete/activities", self.api_url);
        self.get_json(&url, token, &query.upstream_params()).await
    }

    async fn get_activity_details(
        &self,
        token: &AccessToken,
        activity_id: u64,
    ) -> Result<StravaActivityDetails, FetchError> {
        let url = format!("{}/activities/{}", self.api_url, activity_id);
        self.get_json(&url, token, &[]).await
    }
}

/// Check response status and map failures onto `FetchError`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!("Strava rate limit hit (429)");
        return Err(FetchError::RateLimited);
    }

    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Upstream {
        status: status.as_u16(),
        body,
    })
}

/// Summary activity for list endpoints.
///
/// Strava reports `start_date_local` with a `Z` suffix even though it is
/// wall-clock time; it is parsed as UTC and used as naive local time.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub sport_type: Option<String>,
    pub start_date: DateTime<Utc>,
    pub start_date_local: DateTime<Utc>,
    /// Meters
    #[serde(default)]
    pub distance: f64,
    /// Seconds
    #[serde(default)]
    pub moving_time: i64,
    /// Meters
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Meters per second
    #[serde(default)]
    pub average_speed: f64,
    /// Meters per second
    #[serde(default)]
    pub max_speed: f64,
    pub average_watts: Option<f64>,
    pub max_watts: Option<f64>,
    pub kilojoules: Option<f64>,
}

/// Detailed activity fields used for enrichment.
///
/// Everything is optional; activities without a heart rate monitor or
/// gear simply omit the fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StravaActivityDetails {
    pub average_cadence: Option<f64>,
    #[serde(rename = "average_heartrate")]
    pub average_heart_rate: Option<f64>,
    #[serde(rename = "max_heartrate")]
    pub max_heart_rate: Option<f64>,
    pub calories: Option<f64>,
    pub device_name: Option<String>,
    pub gear: Option<StravaGear>,
}

/// Gear (bike or shoes) attached to an activity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StravaGear {
    pub name: Option<String>,
}
