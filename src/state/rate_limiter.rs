use crate::GlanceError;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Returns whether a fetch may start at `now`
///
/// A fetch is allowed when nothing has been fetched yet, or when at least
/// `min_interval` has passed since `last_fetch`.
pub fn is_fetch_allowed(
    now: DateTime<Utc>,
    min_interval: Duration,
    last_fetch: Option<DateTime<Utc>>,
) -> bool {
    match last_fetch {
        Some(last) => now >= earliest_retry(last, min_interval),
        None => true,
    }
}

fn earliest_retry(last_fetch: DateTime<Utc>, min_interval: Duration) -> DateTime<Utc> {
    let interval = chrono::Duration::from_std(min_interval).unwrap_or(chrono::Duration::MAX);
    last_fetch
        .checked_add_signed(interval)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Advisory guard against refetching the listing too often
///
/// This is a gate, not a queue: a throttled caller skips its cycle instead of
/// waiting for the interval to pass.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_fetch: Option<DateTime<Utc>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_fetch: None,
        }
    }

    /// Checks the guard and, when allowed, records `now` as the last fetch
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The fetch may proceed; `now` is now the last fetch time
    /// * `Err(GlanceError::Throttled)` - Too early; state is unchanged
    pub fn try_begin_fetch(&mut self, now: DateTime<Utc>) -> Result<(), GlanceError> {
        if let Some(last) = self.last_fetch {
            if !is_fetch_allowed(now, self.min_interval, Some(last)) {
                return Err(GlanceError::Throttled {
                    last_fetch: last,
                    retry_at: earliest_retry(last, self.min_interval),
                });
            }
        }

        self.last_fetch = Some(now);
        Ok(())
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
