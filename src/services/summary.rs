// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity summary fetching and unit conversion.

use crate::error::{ActivityError, FetchError};
use crate::models::activity::{meters_to_km, mps_to_kmh, round2};
use crate::models::{Activity, ActivityQuery};
use crate::services::strava::{AccessToken, ActivityApi, StravaActivitySummary};

/// One page of converted summaries plus non-fatal per-record errors.
#[derive(Debug, Default)]
pub struct SummaryBatch {
    pub activities: Vec<Activity>,
    pub errors: Vec<ActivityError>,
}

/// Fetch one page of summaries and convert them, keeping upstream order.
///
/// Listing failures abort the call. Conversion problems are collected per
/// record and the record is still returned.
pub async fn fetch_summaries<A: ActivityApi>(
    api: &A,
    token: Option<&AccessToken>,
    query: &ActivityQuery,
) -> Result<SummaryBatch, FetchError> {
    let token = token.ok_or(FetchError::AuthenticationMissing)?;
    let summaries = api.list_activities(token, query).await?;

    tracing::debug!(
        page = query.page,
        per_page = query.per_page,
        count = summaries.len(),
        "Fetched activity summaries"
    );

    let mut batch = SummaryBatch {
        activities: Vec::with_capacity(summaries.len()),
        errors: Vec::new(),
    };

    for summary in &summaries {
        let (activity, error) = convert_summary(summary);
        if let Some(error) = error {
            tracing::warn!(activity_id = summary.id, error = %error, "Summary conversion problem");
            batch.errors.push(ActivityError::new(summary.id, error));
        }
        batch.activities.push(activity);
    }

    Ok(batch)
}

/// Convert a raw summary into an `Activity`.
///
/// A negative moving time yields a zero duration and an `InvalidDuration`
/// error for the caller to collect.
pub fn convert_summary(summary: &StravaActivitySummary) -> (Activity, Option<FetchError>) {
    let (duration_secs, error) = match u64::try_from(summary.moving_time) {
        Ok(secs) => (secs, None),
        Err(_) => (0, Some(FetchError::InvalidDuration(summary.moving_time))),
    };

    let activity = Activity {
        id: summary.id,
        name: summary.name.clone(),
        sport_type: summary.sport_type.clone(),
        start_time: summary.start_date,
        start_time_local: summary.start_date_local.naive_utc(),
        distance_km: meters_to_km(summary.distance),
        duration_secs,
        elevation_gain_m: round2(summary.total_elevation_gain),
        average_speed_kmh: mps_to_kmh(summary.average_speed),
        max_speed_kmh: mps_to_kmh(summary.max_speed),
        average_watts: summary.average_watts.map(round2),
        max_watts: summary.max_watts.map(|w| w.max(0.0).round() as u32),
        kilojoules: summary.kilojoules.map(round2),
        average_cadence: None,
        average_heart_rate: None,
        max_heart_rate: None,
        calories: None,
        gear_name: None,
        device_name: None,
        detailed: false,
    };

    (activity, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(moving_time: i64) -> StravaActivitySummary {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Lunch Run",
            "sport_type": "Run",
            "start_date": "2024-03-01T11:00:00Z",
            "start_date_local": "2024-03-01T12:00:00Z",
            "distance": 12345.0,
            "moving_time": moving_time,
            "total_elevation_gain": 101.456,
            "average_speed": 5.0,
            "max_speed": 7.25,
            "average_watts": 201.234,
            "max_watts": 480,
            "kilojoules": 650.119
        }))
        .unwrap()
    }

    #[test]
    fn test_convert_summary_units() {
        let (activity, error) = convert_summary(&summary(3723));

        assert!(error.is_none());
        assert_eq!(activity.id, 7);
        assert_eq!(activity.distance_km, 12.35);
        assert_eq!(activity.duration_secs, 3723);
        assert_eq!(activity.elevation_gain_m, 101.46);
        assert_eq!(activity.average_speed_kmh, 18.0);
        assert_eq!(activity.max_speed_kmh, 26.1);
        assert_eq!(activity.average_watts, Some(201.23));
        assert_eq!(activity.max_watts, Some(480));
        assert_eq!(activity.kilojoules, Some(650.12));
        assert_eq!(activity.time_string(), "12:00:00");
        assert!(!activity.detailed);
    }

    #[test]
    fn test_negative_moving_time_is_collected_not_fatal() {
        let (activity, error) = convert_summary(&summary(-5));

        assert_eq!(error, Some(FetchError::InvalidDuration(-5)));
        assert_eq!(activity.duration_secs, 0);
        assert_eq!(activity.distance_km, 12.35);
    }
}
