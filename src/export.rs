// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Spreadsheet export of detailed activities.
//!
//! Row 1 carries a title naming the covered months, row 2 the column
//! headers, and every following row one activity in chronological order.

use crate::error::AppError;
use crate::models::Activity;
use chrono::{Datelike, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

pub const SHEET_NAME: &str = "Strava-Export";
pub const FILE_NAME: &str = "strava-export.xlsx";
pub const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADERS: [&str; 14] = [
    "Date",
    "Name",
    "Distance (km)",
    "Moving Time",
    "Elevation Gain (m)",
    "Calories",
    "Avg Speed (km/h)",
    "Max Speed (km/h)",
    "Avg Cadence",
    "Avg Heart Rate",
    "Max Heart Rate",
    "Avg Watts",
    "Max Watts",
    "Gear",
];

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No activities to export")]
    Empty,

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Empty => {
                AppError::NotFound("No activities in the selected range".to_string())
            }
            ExportError::Xlsx(e) => AppError::Internal(anyhow::anyhow!("XLSX export failed: {e}")),
        }
    }
}

/// Order activities by local start time, oldest first.
pub fn sort_chronologically(activities: &mut [Activity]) {
    activities.sort_by_key(|a| (a.start_time_local, a.id));
}

/// Rows and title of an export, in chronological order.
///
/// Only `prepare_export` builds one, so a workbook is never written from
/// unsorted rows.
#[derive(Debug, Clone)]
pub struct ExportSheet {
    title: String,
    activities: Vec<Activity>,
}

impl ExportSheet {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }
}

/// Sort `activities` and derive the title from the first and last one.
pub fn prepare_export(mut activities: Vec<Activity>) -> Result<ExportSheet, ExportError> {
    sort_chronologically(&mut activities);

    let title = match (activities.first(), activities.last()) {
        (Some(first), Some(last)) => export_title(first.start_time_local, last.start_time_local),
        _ => return Err(ExportError::Empty),
    };

    Ok(ExportSheet { title, activities })
}

/// Title for the covered period.
///
/// Same month: `March - 2024`. Same year: `January - March (2024)`.
/// Otherwise: `December (2023) - January (2024)`.
pub fn export_title(first: NaiveDateTime, last: NaiveDateTime) -> String {
    let first_month = first.format("%B");
    let last_month = last.format("%B");

    if first.year() == last.year() && first.month() == last.month() {
        format!("{first_month} - {}", first.year())
    } else if first.year() == last.year() {
        format!("{first_month} - {last_month} ({})", first.year())
    } else {
        format!(
            "{first_month} ({}) - {last_month} ({})",
            first.year(),
            last.year()
        )
    }
}

/// Write `sheet` as an `.xlsx` workbook.
pub fn build_workbook(sheet: &ExportSheet) -> Result<Vec<u8>, ExportError> {
    let activities = sheet.activities();
    let title = sheet.title();

    let date_format = Format::new().set_num_format("dd.mm.yyyy hh:mm:ss");
    let duration_format = Format::new().set_num_format("[h]:mm:ss");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    worksheet.merge_range(0, 0, 0, (HEADERS.len() - 1) as u16, title, &Format::new())?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(1, col as u16, *header)?;
    }

    for (i, activity) in activities.iter().enumerate() {
        let row = (i + 2) as u32;

        worksheet.write_datetime_with_format(row, 0, &activity.start_time_local, &date_format)?;
        worksheet.write_string(row, 1, &activity.name)?;
        worksheet.write_number(row, 2, activity.distance_km)?;
        worksheet.write_number_with_format(
            row,
            3,
            activity.duration().as_secs_f64() / SECONDS_PER_DAY,
            &duration_format,
        )?;
        worksheet.write_number(row, 4, activity.elevation_gain_m)?;

        let optional = [
            (5, activity.calories),
            (6, Some(activity.average_speed_kmh)),
            (7, Some(activity.max_speed_kmh)),
            (8, activity.average_cadence),
            (9, activity.average_heart_rate),
            (10, activity.max_heart_rate),
            (11, activity.average_watts),
            (12, activity.max_watts.map(f64::from)),
        ];
        for (col, value) in optional {
            if let Some(value) = value {
                worksheet.write_number(row, col, value)?;
            }
        }

        if let Some(gear) = &activity.gear_name {
            worksheet.write_string(row, 13, gear)?;
        }
    }

    tracing::debug!(rows = activities.len(), title = %title, "Built export workbook");

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn activity(id: u64, local: NaiveDateTime) -> Activity {
        Activity {
            id,
            name: format!("Ride {id}"),
            sport_type: Some("Ride".to_string()),
            start_time: local.and_utc(),
            start_time_local: local,
            distance_km: 42.19,
            duration_secs: 5025,
            elevation_gain_m: 410.5,
            average_speed_kmh: 30.22,
            max_speed_kmh: 61.0,
            average_watts: Some(190.5),
            max_watts: Some(612),
            kilojoules: Some(950.0),
            average_cadence: Some(87.0),
            average_heart_rate: Some(140.2),
            max_heart_rate: Some(171.0),
            calories: Some(1012.0),
            gear_name: Some("Road bike".to_string()),
            device_name: None,
            detailed: true,
        }
    }

    #[test]
    fn test_title_same_month() {
        assert_eq!(export_title(at(2024, 3, 1), at(2024, 3, 28)), "March - 2024");
    }

    #[test]
    fn test_title_same_year() {
        assert_eq!(
            export_title(at(2024, 1, 5), at(2024, 3, 2)),
            "January - March (2024)"
        );
    }

    #[test]
    fn test_title_across_years() {
        assert_eq!(
            export_title(at(2023, 12, 30), at(2024, 1, 2)),
            "December (2023) - January (2024)"
        );
    }

    #[test]
    fn test_sort_chronologically_by_local_start() {
        let mut activities = vec![
            activity(3, at(2024, 3, 9)),
            activity(1, at(2024, 3, 1)),
            activity(2, at(2024, 3, 5)),
        ];

        sort_chronologically(&mut activities);

        let ids: Vec<u64> = activities.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_prepare_export_sorts_and_titles() {
        let sheet = prepare_export(vec![
            activity(3, at(2024, 3, 9)),
            activity(1, at(2023, 12, 30)),
            activity(2, at(2024, 1, 5)),
        ])
        .unwrap();

        let ids: Vec<u64> = sheet.activities().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(sheet.title(), "December (2023) - March (2024)");
    }

    #[test]
    fn test_prepare_export_rejects_empty() {
        assert!(matches!(prepare_export(Vec::new()), Err(ExportError::Empty)));
    }

    #[test]
    fn test_build_workbook_produces_xlsx() {
        let sheet =
            prepare_export(vec![activity(2, at(2024, 3, 5)), activity(1, at(2024, 3, 1))]).unwrap();

        let bytes = build_workbook(&sheet).unwrap();

        // XLSX files are zip archives
        assert!(bytes.starts_with(b"PK"));
    }
}
