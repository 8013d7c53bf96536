// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request-scoped activity query: page, page size and an inclusive day range.

use crate::time_utils::{first_second_after, last_second_before};
use chrono::NaiveDate;

/// Largest page size Strava accepts.
pub const MAX_PER_PAGE: u32 = 200;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parameters for one listing request.
///
/// `from` and `to` are inclusive calendar days. They become the half-open
/// upstream range `(after, before)` where `after` is the last second of the
/// day before `from` and `before` is midnight after `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    pub page: u32,
    pub per_page: u32,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ActivityQuery {
    /// Query for one page without a date range.
    pub fn new(page: u32, per_page: u32) -> Result<Self, QueryError> {
        if page < 1 {
            return Err(QueryError::InvalidPage);
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(QueryError::InvalidPerPage(per_page));
        }
        Ok(Self {
            page,
            per_page,
            from: None,
            to: None,
        })
    }

    /// Build a query from raw request values.
    ///
    /// Empty date strings are treated as absent.
    pub fn parse(
        page: u32,
        per_page: u32,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, QueryError> {
        let mut query = Self::new(page, per_page)?;
        query.from = parse_day("from", from)?;
        query.to = parse_day("to", to)?;

        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(QueryError::InvertedRange { from, to });
            }
        }

        Ok(query)
    }

    /// Upstream `after` bound (exclusive), if a start day was given.
    pub fn after_timestamp(&self) -> Option<i64> {
        self.from.map(last_second_before)
    }

    /// Upstream `before` bound (exclusive), if an end day was given.
    pub fn before_timestamp(&self) -> Option<i64> {
        self.to.map(first_second_after)
    }

    /// Query parameters for the Strava listing endpoint.
    pub fn upstream_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(after) = self.after_timestamp() {
            params.push(("after", after.to_string()));
        }
        if let Some(before) = self.before_timestamp() {
            params.push(("before", before.to_string()));
        }
        params
    }
}

fn parse_day(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, QueryError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| QueryError::InvalidDate {
                field,
                value: value.to_string(),
            }),
    }
}

/// Query validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("Page must be greater than 0")]
    InvalidPage,

    #[error("Page size must be between 1 and 200, got {0}")]
    InvalidPerPage(u32),

    #[error("Invalid '{field}' parameter {value:?}: expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("'from' ({from}) is after 'to' ({to})")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
}

impl From<QueryError> for crate::error::AppError {
    fn from(err: QueryError) -> Self {
        crate::error::AppError::BadRequest(err.to_string())
    }
}
