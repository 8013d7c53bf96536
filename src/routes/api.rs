// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for token holders.

use crate::config::{PartialPolicy, TOKEN_COOKIE};
use crate::error::{AppError, FetchError, Result};
use crate::export::{build_workbook, prepare_export, CONTENT_TYPE, FILE_NAME};
use crate::models::{Activity, ActivityQuery};
use crate::services::{AccessToken, DetailLevel, PageResult};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// API routes (require an access token).
/// The token middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(get_activities))
        .route("/api/export", get(export_activities))
        .route("/api/logout", post(logout))
}

/// Apply the partial-failure policy to a fetched page.
///
/// A failed listing or a rate limit anywhere always fails the request.
/// Other per-activity errors fail it only under `PartialPolicy::Discard`.
pub fn settle_page(page: PageResult, policy: PartialPolicy) -> Result<PageResult> {
    if let Some(err) = page.page_error() {
        return Err(err.clone().into());
    }
    if page.hit_rate_limit() {
        return Err(AppError::RateLimited);
    }
    if policy == PartialPolicy::Discard {
        if let Some(err) = page.errors.first() {
            return Err(err.clone().into());
        }
    }
    if !page.errors.is_empty() {
        tracing::warn!(
            errors = page.errors.len(),
            returned = page.activities.len(),
            "Returning partial page"
        );
    }
    Ok(page)
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesParams {
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    page: u32,
    /// First day to include (YYYY-MM-DD)
    from: Option<String>,
    /// Last day to include (YYYY-MM-DD)
    to: Option<String>,
    /// Fetch per-activity details as well
    #[serde(default)]
    detailed: bool,
}

fn default_page() -> u32 {
    1
}

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityView>,
    pub page: u32,
    pub per_page: u32,
    pub has_before: bool,
    pub has_after: bool,
    pub link_before: Option<String>,
    pub link_after: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Number of activities that could not be fetched, when partial pages are allowed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<usize>,
}

/// One activity as shown in the browsing view.
#[derive(Serialize, Clone, Debug)]
pub struct ActivityView {
    pub id: u64,
    pub name: String,
    pub sport_type: Option<String>,
    pub start_time: String,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub duration_secs: u64,
    pub distance_km: f64,
    pub elevation_gain_m: f64,
    pub average_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub average_watts: Option<f64>,
    pub max_watts: Option<u32>,
    pub kilojoules: Option<f64>,
    pub average_cadence: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub max_heart_rate: Option<f64>,
    pub calories: Option<f64>,
    pub gear_name: Option<String>,
    pub device_name: Option<String>,
    pub detailed: bool,
}

impl From<Activity> for ActivityView {
    fn from(a: Activity) -> Self {
        Self {
            start_time: format_utc_rfc3339(a.start_time),
            date: a.date_string(),
            time: a.time_string(),
            duration: a.duration_string(),
            duration_secs: a.duration_secs,
            id: a.id,
            name: a.name,
            sport_type: a.sport_type,
            distance_km: a.distance_km,
            elevation_gain_m: a.elevation_gain_m,
            average_speed_kmh: a.average_speed_kmh,
            max_speed_kmh: a.max_speed_kmh,
            average_watts: a.average_watts,
            max_watts: a.max_watts,
            kilojoules: a.kilojoules,
            average_cadence: a.average_cadence,
            average_heart_rate: a.average_heart_rate,
            max_heart_rate: a.max_heart_rate,
            calories: a.calories,
            gear_name: a.gear_name,
            device_name: a.device_name,
            detailed: a.detailed,
        }
    }
}

/// Link to another page of the same listing.
pub fn page_link(page: u32, query: &ActivityQuery, detailed: bool) -> String {
    let mut link = format!("/api/activities?page={page}");
    if let Some(from) = query.from {
        link.push_str("&from=");
        link.push_str(&urlencoding::encode(&from.to_string()));
    }
    if let Some(to) = query.to {
        link.push_str("&to=");
        link.push_str(&urlencoding::encode(&to.to_string()));
    }
    if detailed {
        link.push_str("&detailed=true");
    }
    link
}

/// Get one page of the user's activities.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Query(params): Query<ActivitiesParams>,
) -> Result<Json<ActivitiesResponse>> {
    let query = ActivityQuery::parse(
        params.page,
        state.config.page_size,
        params.from.as_deref(),
        params.to.as_deref(),
    )?;

    tracing::debug!(
        page = query.page,
        from = ?query.from,
        to = ?query.to,
        detailed = params.detailed,
        "Fetching activities"
    );

    let detail = if params.detailed {
        DetailLevel::Full
    } else {
        DetailLevel::Summary
    };

    let policy = state.config.partial_policy;
    let page = settle_page(
        state.pipeline.fetch_page(Some(&token), &query, detail).await,
        policy,
    )?;

    // A full page means Strava may have more, unless the page number is maxed out
    let next_page = query
        .page
        .checked_add(1)
        .filter(|_| page.listed == query.per_page as usize);
    let has_before = query.page > 1;
    let has_after = next_page.is_some();

    Ok(Json(ActivitiesResponse {
        link_before: has_before.then(|| page_link(query.page - 1, &query, params.detailed)),
        link_after: next_page.map(|next| page_link(next, &query, params.detailed)),
        errors: (policy == PartialPolicy::Allow).then_some(page.errors.len()),
        activities: page.activities.into_iter().map(ActivityView::from).collect(),
        page: query.page,
        per_page: query.per_page,
        has_before,
        has_after,
        from: query.from,
        to: query.to,
    }))
}

// ─── Export ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct ExportParams {
    from: Option<String>,
    to: Option<String>,
}

/// Export detailed activities in a date range as an `.xlsx` download.
async fn export_activities(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse> {
    let query = ActivityQuery::parse(
        1,
        state.config.export_page_size,
        params.from.as_deref(),
        params.to.as_deref(),
    )?;

    tracing::info!(from = ?query.from, to = ?query.to, "Exporting activities");

    let page = state
        .pipeline
        .fetch_page(Some(&token), &query, DetailLevel::Full)
        .await;
    let page = settle_page(page, state.config.partial_policy)?;

    let sheet = prepare_export(page.activities)?;
    let workbook = build_workbook(&sheet)?;

    tracing::info!(
        rows = sheet.activities().len(),
        title = sheet.title(),
        bytes = workbook.len(),
        "Export ready"
    );

    Ok((
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{FILE_NAME}\""),
            ),
        ],
        workbook,
    ))
}

// ─── Logout ──────────────────────────────────────────────────

/// Revoke the token with Strava and clear the token cookie.
///
/// A token Strava already rejects counts as revoked.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<AccessToken>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar)> {
    match state.strava.deauthorize(&token).await {
        Ok(()) => {}
        Err(FetchError::Upstream { status: 401, .. }) => {
            tracing::info!("Token already revoked upstream");
        }
        Err(e) => return Err(e.into()),
    }

    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    Ok((StatusCode::NO_CONTENT, jar))
}
