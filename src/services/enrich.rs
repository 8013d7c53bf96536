// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-activity detail enrichment.

use crate::error::FetchError;
use crate::models::activity::round2;
use crate::models::Activity;
use crate::services::strava::{AccessToken, ActivityApi, StravaActivityDetails};

/// Fetch the detail record for `activity` and merge it in.
///
/// Makes exactly one request. On failure the activity is dropped and the
/// error returned; nothing is retried.
pub async fn enrich_activity<A: ActivityApi>(
    api: &A,
    token: Option<&AccessToken>,
    mut activity: Activity,
) -> Result<Activity, FetchError> {
    let token = token.ok_or(FetchError::AuthenticationMissing)?;
    let details = api.get_activity_details(token, activity.id).await?;

    apply_details(&mut activity, &details);
    Ok(activity)
}

/// Merge detail fields into a summary activity and mark it detailed.
pub fn apply_details(activity: &mut Activity, details: &StravaActivityDetails) {
    activity.average_cadence = details.average_cadence.map(round2);
    activity.average_heart_rate = details.average_heart_rate.map(round2);
    activity.max_heart_rate = details.max_heart_rate.map(round2);
    activity.calories = details.calories.map(round2);
    activity.gear_name = details.gear.as_ref().and_then(|g| g.name.clone());
    activity.device_name = details.device_name.clone();
    activity.detailed = true;
}
