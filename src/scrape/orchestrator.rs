//! Refresh cycle orchestration
//!
//! One cycle walks `Idle → FetchingListing → ParsingListing → FetchingProfiles →
//! ParsingProfiles → Publishing → Idle`. The rate limiter gates the first
//! transition. Work in progress lives in locals owned by the cycle; readers of
//! the [`SnapshotStore`] only ever see whole snapshots.

use crate::config::Config;
use crate::links::SiteLinks;
use crate::model::{Post, User};
use crate::scrape::fetcher::Fetcher;
use crate::scrape::listing::parse_listing_at;
use crate::scrape::profile::parse_profile;
use crate::state::{RateLimiter, SnapshotStore};
use crate::GlanceError;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};

/// Where the orchestrator is within a refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Idle,
    FetchingListing,
    ParsingListing,
    FetchingProfiles,
    ParsingProfiles,
    Publishing,
}

/// Summary of a completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Generation number of the published snapshot
    pub generation: u64,
    pub posts: usize,
    /// Distinct authors whose profile was requested
    pub profiles_requested: usize,
    pub profiles_refreshed: usize,
    pub profiles_failed: usize,
}

/// Drives refresh cycles and owns the published snapshot
pub struct Orchestrator {
    config: Arc<Config>,
    links: SiteLinks,
    fetcher: Fetcher,
    limiter: RateLimiter,
    store: Arc<SnapshotStore>,
    stage: CycleStage,
}

impl Orchestrator {
    /// Creates an orchestrator with a fresh snapshot store
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run cycles
    /// * `Err(GlanceError)` - The base URL or HTTP client could not be set up
    pub fn new(config: Config) -> Result<Self, GlanceError> {
        Self::with_store(config, Arc::new(SnapshotStore::new()))
    }

    /// Creates an orchestrator that publishes into an existing store
    pub fn with_store(config: Config, store: Arc<SnapshotStore>) -> Result<Self, GlanceError> {
        let links = SiteLinks::new(&config.source.base_url)?;
        let fetcher = Fetcher::from_config(&config.user_agent, config.schedule.fetch_timeout())?;
        let limiter = RateLimiter::new(config.schedule.min_fetch_interval());

        Ok(Self {
            config: Arc::new(config),
            links,
            fetcher,
            limiter,
            store,
            stage: CycleStage::Idle,
        })
    }

    /// Read handle for the display layer
    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    pub fn stage(&self) -> CycleStage {
        self.stage
    }

    pub fn links(&self) -> &SiteLinks {
        &self.links
    }

    /// Runs one refresh cycle
    ///
    /// The cycle must finish before the next tick, so every fetch is bounded by
    /// the time left until then as well as by the configured fetch timeout.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, GlanceError> {
        let deadline = Instant::now() + self.config.schedule.tick_interval();
        let result = self.run_cycle_until(deadline).await;
        self.set_stage(CycleStage::Idle);
        result
    }

    async fn run_cycle_until(&mut self, deadline: Instant) -> Result<CycleReport, GlanceError> {
        if let Err(e) = self.limiter.try_begin_fetch(Utc::now()) {
            tracing::info!("Skipping refresh: {}", e);
            return Err(e);
        }

        self.set_stage(CycleStage::FetchingListing);
        let listing_url = self.links.listing_url().clone();
        let budget = self.fetch_budget(deadline, listing_url.as_str())?;
        let body = self.fetcher.fetch(&listing_url, budget).await?;

        self.set_stage(CycleStage::ParsingListing);
        let posts = parse_listing_at(&body, Utc::now(), self.config.source.max_posts).map_err(|e| {
            GlanceError::DocumentParse {
                url: listing_url.to_string(),
                message: e.to_string(),
            }
        })?;
        tracing::info!("Got {} posts", posts.len());

        let mut users = self.store.load().users.clone();
        let usernames = distinct_authors(&posts);
        let mut requested = 0;
        let mut refreshed = 0;
        let mut failed = 0;

        if self.config.profiles.enabled && !usernames.is_empty() {
            self.set_stage(CycleStage::FetchingProfiles);
            requested = usernames.len();
            let bodies = self.fetch_profiles(&usernames, deadline).await;

            self.set_stage(CycleStage::ParsingProfiles);
            for (username, body) in bodies {
                match body.and_then(|body| self.parse_profile_body(&username, &body)) {
                    Ok(user) => {
                        users.insert(username, user);
                        refreshed += 1;
                    }
                    Err(e) => {
                        tracing::warn!("Error fetching {}: {}", username, e);
                        failed += 1;
                    }
                }
            }
        }

        self.set_stage(CycleStage::Publishing);
        let post_count = posts.len();
        let generation = self.store.publish(posts, users);
        tracing::info!(
            "Published snapshot {}: {} posts, {} profiles refreshed, {} failed",
            generation,
            post_count,
            refreshed,
            failed
        );

        Ok(CycleReport {
            generation,
            posts: post_count,
            profiles_requested: requested,
            profiles_refreshed: refreshed,
            profiles_failed: failed,
        })
    }

    /// Fetches every profile concurrently and waits for all of them
    async fn fetch_profiles(
        &self,
        usernames: &[String],
        deadline: Instant,
    ) -> Vec<(String, Result<String, GlanceError>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.profiles.max_concurrent));
        let fetch_timeout = self.config.schedule.fetch_timeout();
        let mut tasks = JoinSet::new();

        for username in usernames {
            let username = username.clone();
            let url = self.links.user_url(&username);
            let fetcher = self.fetcher.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let body = match semaphore.acquire_owned().await {
                    Ok(_permit) => match remaining_budget(deadline, fetch_timeout) {
                        Some(budget) => fetcher.fetch(&url, budget).await,
                        None => Err(GlanceError::Timeout {
                            url: url.to_string(),
                        }),
                    },
                    Err(_) => Err(GlanceError::Transport {
                        url: url.to_string(),
                        message: "profile fetch pool closed".to_string(),
                    }),
                };
                (username, body)
            });
        }

        let mut results = Vec::with_capacity(usernames.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!("Profile fetch task failed: {}", e),
            }
        }
        results
    }

    fn parse_profile_body(&self, username: &str, body: &str) -> Result<User, GlanceError> {
        let url = self.links.user_url(username).to_string();
        let users = parse_profile(username, body).map_err(|e| GlanceError::DocumentParse {
            url: url.clone(),
            message: e.to_string(),
        })?;

        users.into_iter().next().ok_or(GlanceError::DocumentParse {
            url,
            message: "no parsable profile record".to_string(),
        })
    }

    fn fetch_budget(&self, deadline: Instant, url: &str) -> Result<Duration, GlanceError> {
        remaining_budget(deadline, self.config.schedule.fetch_timeout()).ok_or_else(|| {
            GlanceError::Timeout {
                url: url.to_string(),
            }
        })
    }

    fn set_stage(&mut self, stage: CycleStage) {
        if self.stage != stage {
            tracing::trace!("Cycle stage {:?} -> {:?}", self.stage, stage);
            self.stage = stage;
        }
    }

    /// Runs cycles on a fixed tick until `shutdown` flips to `true`
    ///
    /// The first cycle starts immediately. A cycle that fails is logged and the
    /// previous snapshot stays published; the next tick is the retry.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.schedule.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Refreshing {} every {:?}",
            self.links.listing_url(),
            self.config.schedule.tick_interval()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            // Shutdown cancels an in-flight cycle; dropping it aborts any
            // pending profile fetches and leaves the published snapshot as is.
            let cancelled = tokio::select! {
                result = self.run_cycle() => {
                    match result {
                        Ok(_) => {}
                        Err(e) if e.is_throttled() => {}
                        Err(e) => tracing::error!("Refresh failed: {}", e),
                    }
                    false
                }
                changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
            };

            if cancelled {
                self.set_stage(CycleStage::Idle);
                tracing::info!("Refresh cancelled by shutdown");
                break;
            }
        }

        tracing::info!("Shutting down refresh loop");
    }
}

/// Distinct non-empty author handles, in rank order
fn distinct_authors(posts: &[Post]) -> Vec<String> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter(|post| !post.username.is_empty())
        .filter(|post| seen.insert(post.username.as_str()))
        .map(|post| post.username.clone())
        .collect()
}

/// The smaller of `fetch_timeout` and the time left before `deadline`
///
/// Returns `None` once the deadline has passed.
fn remaining_budget(deadline: Instant, fetch_timeout: Duration) -> Option<Duration> {
    let left = deadline.checked_duration_since(Instant::now())?;
    if left.is_zero() {
        return None;
    }
    Some(left.min(fetch_timeout))
}
