// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod enrich;
pub mod strava;
pub mod summary;

pub use activity::{ActivityPipeline, DetailLevel, PageResult};
pub use strava::{AccessToken, ActivityApi, StravaClient};
