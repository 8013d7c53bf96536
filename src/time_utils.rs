// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time conversion and formatting.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Unix timestamp of midnight (UTC) at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Last second of the day before `date`, as a Unix timestamp.
pub fn last_second_before(date: NaiveDate) -> i64 {
    start_of_day(date) - 1
}

/// First second of the day after `date`, as a Unix timestamp.
pub fn first_second_after(date: NaiveDate) -> i64 {
    start_of_day(date) + Duration::days(1).num_seconds()
}

/// `dd.mm.yyyy`
pub fn format_date(local: NaiveDateTime) -> String {
    local.format("%d.%m.%Y").to_string()
}

/// `HH:MM:SS`
pub fn format_time(local: NaiveDateTime) -> String {
    local.format("%H:%M:%S").to_string()
}

/// Format a number of seconds as `H:MM:SS`.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}
