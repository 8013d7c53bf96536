// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Export: browse Strava activities and export them to a spreadsheet
//!
//! This crate provides the backend API that lists a user's Strava
//! activities page by page and builds detailed `.xlsx` exports for a
//! date range.

pub mod config;
pub mod error;
pub mod export;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{ActivityPipeline, StravaClient};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: Arc<StravaClient>,
    pub pipeline: ActivityPipeline<StravaClient>,
}

impl AppState {
    /// Wire the Strava client and activity pipeline from configuration.
    pub fn from_config(config: Config) -> Self {
        let strava = Arc::new(StravaClient::from_config(&config));
        let pipeline = ActivityPipeline::from_config(Arc::clone(&strava), &config);
        Self {
            config,
            strava,
            pipeline,
        }
    }
}
