// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Export API Server
//!
//! Lists a user's Strava activities page by page and exports a date range
//! of detailed activities as a spreadsheet.

use std::sync::Arc;
use strava_export::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        api_url = %config.strava_api_url,
        enrich_concurrency = config.enrich_concurrency,
        enrich_timeout = ?config.enrich_timeout,
        partial_policy = ?config.partial_policy,
        "Starting Strava-Export API"
    );

    let addr = format!("{}:{}", config.http_address, config.port);

    // Build shared state and router
    let state = Arc::new(AppState::from_config(config));
    let app = strava_export::routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_export=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .try_init()?;

    Ok(())
}
