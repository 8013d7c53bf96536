// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity aggregation pipeline.
//!
//! Handles the core workflow:
//! 1. Fetch one page of activity summaries from Strava
//! 2. Optionally fan out one detail request per activity (bounded)
//! 3. Join the results and collect per-activity errors

use crate::config::Config;
use crate::error::{ActivityError, FetchError};
use crate::models::{Activity, ActivityQuery};
use crate::services::enrich::enrich_activity;
use crate::services::strava::{AccessToken, ActivityApi};
use crate::services::summary::{fetch_summaries, SummaryBatch};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};

/// How much to fetch for each activity on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// Listing endpoint only.
    Summary,
    /// Listing plus one detail request per activity.
    Full,
}

/// Outcome of fetching one page.
///
/// `activities` holds everything that succeeded. For `DetailLevel::Full` it
/// is in completion order, not upstream order. `listed` is the number of
/// records the listing returned, before any were dropped by enrichment.
#[derive(Debug, Default)]
pub struct PageResult {
    pub activities: Vec<Activity>,
    pub listed: usize,
    pub rate_limited: bool,
    pub errors: Vec<ActivityError>,
    pub(crate) listing_failed: bool,
}

impl PageResult {
    fn failed(error: FetchError) -> Self {
        Self {
            activities: Vec::new(),
            listed: 0,
            rate_limited: matches!(error, FetchError::RateLimited),
            errors: vec![ActivityError::page(error)],
            listing_failed: true,
        }
    }

    /// True if neither the listing nor any activity reported an error.
    pub fn is_complete(&self) -> bool {
        !self.rate_limited && self.errors.is_empty()
    }

    /// True if Strava throttled the listing or any detail request.
    pub fn hit_rate_limit(&self) -> bool {
        self.rate_limited
            || self
                .errors
                .iter()
                .any(|e| matches!(e.error, FetchError::RateLimited))
    }

    /// The listing error that aborted the whole page, if any.
    pub fn page_error(&self) -> Option<&ActivityError> {
        if self.listing_failed {
            self.errors.first()
        } else {
            None
        }
    }
}

/// Fetches pages of activities, enriching them on request.
pub struct ActivityPipeline<A> {
    api: Arc<A>,
    concurrency: usize,
    timeout: Duration,
}

impl<A: ActivityApi> ActivityPipeline<A> {
    /// `concurrency` caps in-flight detail requests; `timeout` bounds each one.
    pub fn new(api: Arc<A>, concurrency: usize, timeout: Duration) -> Self {
        Self {
            api,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    pub fn from_config(api: Arc<A>, config: &Config) -> Self {
        Self::new(api, config.enrich_concurrency, config.enrich_timeout)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch one page of activities.
    ///
    /// Listing failures (missing token, rate limit, upstream error) return an
    /// empty page with a single page-level error and no detail requests are
    /// made. Detail failures are collected next to the activities that did
    /// succeed. Dropping the returned future aborts outstanding detail
    /// requests.
    pub async fn fetch_page(
        &self,
        token: Option<&AccessToken>,
        query: &ActivityQuery,
        detail: DetailLevel,
    ) -> PageResult {
        let SummaryBatch {
            activities,
            mut errors,
        } = match fetch_summaries(self.api.as_ref(), token, query).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(page = query.page, error = %e, "Activity listing failed");
                return PageResult::failed(e);
            }
        };

        let listed = activities.len();
        let activities = match detail {
            DetailLevel::Summary => activities,
            DetailLevel::Full => {
                let (enriched, enrich_errors) = self.enrich_all(token, activities).await;
                errors.extend(enrich_errors);
                enriched
            }
        };

        tracing::info!(
            page = query.page,
            detail = ?detail,
            count = activities.len(),
            errors = errors.len(),
            "Fetched activity page"
        );

        PageResult {
            activities,
            listed,
            rate_limited: false,
            errors,
            listing_failed: false,
        }
    }

    /// Enrich every activity concurrently and join the results.
    async fn enrich_all(
        &self,
        token: Option<&AccessToken>,
        activities: Vec<Activity>,
    ) -> (Vec<Activity>, Vec<ActivityError>) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut task_activity: HashMap<Id, u64> = HashMap::with_capacity(activities.len());

        for activity in activities {
            let activity_id = activity.id;
            let api = Arc::clone(&self.api);
            let token = token.cloned();
            let semaphore = Arc::clone(&semaphore);
            let deadline = self.timeout;

            let handle = tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return Err(ActivityError::new(
                            activity_id,
                            FetchError::Task("enrichment limiter closed".to_string()),
                        ))
                    }
                };

                match tokio::time::timeout(
                    deadline,
                    enrich_activity(api.as_ref(), token.as_ref(), activity),
                )
                .await
                {
                    Ok(result) => result.map_err(|e| ActivityError::new(activity_id, e)),
                    Err(_) => Err(ActivityError::new(
                        activity_id,
                        FetchError::Timeout(deadline),
                    )),
                }
            });
            task_activity.insert(handle.id(), activity_id);
        }

        let mut enriched = Vec::with_capacity(tasks.len());
        let mut errors = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(activity)) => enriched.push(activity),
                Ok(Err(e)) => {
                    tracing::warn!(activity_id = ?e.activity_id, error = %e.error, "Activity enrichment failed");
                    errors.push(e);
                }
                Err(join_err) => {
                    let error = FetchError::Task(join_err.to_string());
                    match task_activity.get(&join_err.id()) {
                        Some(&activity_id) => {
                            tracing::error!(activity_id, error = %join_err, "Enrichment task did not complete");
                            errors.push(ActivityError::new(activity_id, error));
                        }
                        None => {
                            tracing::error!(error = %join_err, "Enrichment task did not complete");
                            errors.push(ActivityError::page(error));
                        }
                    }
                }
            }
        }

        (enriched, errors)
    }
}
