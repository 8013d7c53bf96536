// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity model shared by the listing page and the spreadsheet export.

use crate::time_utils::{format_date, format_duration, format_time};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// One Strava activity, converted to display units.
///
/// Created from a summary record; the detail fields stay `None` until
/// enrichment succeeds, at which point `detailed` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    /// Activity name/title
    pub name: String,
    /// Sport type (Ride, Run, Hike, etc.)
    pub sport_type: Option<String>,
    /// Start time in UTC
    pub start_time: DateTime<Utc>,
    /// Start time as shown on the athlete's watch
    pub start_time_local: NaiveDateTime,
    /// Distance in kilometers
    pub distance_km: f64,
    /// Moving time in seconds
    pub duration_secs: u64,
    /// Elevation gain in meters
    pub elevation_gain_m: f64,
    /// Average speed in km/h
    pub average_speed_kmh: f64,
    /// Max speed in km/h
    pub max_speed_kmh: f64,
    pub average_watts: Option<f64>,
    pub max_watts: Option<u32>,
    pub kilojoules: Option<f64>,

    // ─── Detail fields ───────────────────────────────────────────
    pub average_cadence: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub max_heart_rate: Option<f64>,
    pub calories: Option<f64>,
    /// Name of the bike or shoes
    pub gear_name: Option<String>,
    /// Recording device (e.g. "Garmin Edge 530")
    pub device_name: Option<String>,
    /// Whether the detail fields were fetched
    pub detailed: bool,
}

impl Activity {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn date_string(&self) -> String {
        format_date(self.start_time_local)
    }

    pub fn time_string(&self) -> String {
        format_time(self.start_time_local)
    }

    pub fn duration_string(&self) -> String {
        format_duration(self.duration_secs)
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Meters to kilometers, rounded to two decimal places.
pub fn meters_to_km(meters: f64) -> f64 {
    (meters / 10.0).round() / 100.0
}

/// Meters per second to km/h, rounded to two decimal places.
pub fn mps_to_kmh(mps: f64) -> f64 {
    (mps * 360.0).round() / 100.0
}
