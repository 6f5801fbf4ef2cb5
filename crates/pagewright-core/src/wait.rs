//! The wait/poll engine.
//!
//! [`Poller`] repeatedly runs a read-only probe against driver state until it
//! yields a value or the timeout elapses. It parks between probes with
//! [`tokio::time::sleep`], never spins, and always probes once more after its
//! last sleep so a condition that turns true exactly at the deadline still
//! counts as success.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use pagewright_core::wait::Poller;
//!
//! # async fn demo(driver: &dyn pagewright_core::driver::BrowserDriver) {
//! let poller = Poller::new(Duration::from_secs(10));
//! let url = poller
//!     .until("url contains /dashboard", move || async move {
//!         let url = driver.current_url().await?;
//!         Ok(url.contains("/dashboard").then_some(url))
//!     })
//!     .await;
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::driver::DriverError;
use crate::error::{Interaction, InteractionError};

/// Default time between probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Consecutive identical probes required by [`Poller::until_stable`] when
/// callers have no better figure.
pub const DEFAULT_STABLE_POLLS: u32 = 3;

/// Named timeout tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitTier {
    Short,
    Medium,
    Long,
}

/// Resolved durations for each [`WaitTier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTiers {
    pub short: Duration,
    pub medium: Duration,
    pub long: Duration,
}

impl Default for WaitTiers {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(5),
            medium: Duration::from_secs(10),
            long: Duration::from_secs(30),
        }
    }
}

impl WaitTiers {
    pub fn get(&self, tier: WaitTier) -> Duration {
        match tier {
            WaitTier::Short => self.short,
            WaitTier::Medium => self.medium,
            WaitTier::Long => self.long,
        }
    }
}

/// A timeout, a poll interval and an optional cancellation token.
///
/// Built per call and dropped afterwards; it carries no state between waits.
#[derive(Debug, Clone)]
pub struct Poller {
    timeout: Duration,
    interval: Duration,
    cancel: Option<CancellationToken>,
}

impl Poller {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
            cancel: None,
        }
    }

    /// Sets the poll interval. Zero is raised to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Polls `probe` until it returns `Ok(Some(value))`.
    ///
    /// `Ok(None)` means "not yet". Transient driver errors (stale elements)
    /// are treated the same way; any other error is returned immediately.
    pub async fn until<T, F, Fut>(&self, what: &str, probe: F) -> Interaction<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, DriverError>>,
    {
        self.drive(what, probe, |value| value).await
    }

    /// Polls `probe` until it returns the same value for `required`
    /// consecutive probes, and returns that value.
    ///
    /// Used in place of fixed settle sleeps: an overlay whose bounding box
    /// stops changing has finished animating.
    pub async fn until_stable<T, F, Fut>(&self, what: &str, required: u32, probe: F) -> Interaction<T>
    where
        T: PartialEq + Clone,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, DriverError>>,
    {
        let required = required.max(1);
        let mut last: Option<T> = None;
        let mut streak = 0u32;
        self.drive(what, probe, move |value| match value {
            None => {
                last = None;
                streak = 0;
                None
            }
            Some(current) => {
                if last.as_ref() == Some(&current) {
                    streak += 1;
                } else {
                    streak = 1;
                    last = Some(current);
                }
                if streak >= required {
                    last.clone()
                } else {
                    None
                }
            }
        })
        .await
    }

    async fn drive<T, R, F, Fut, A>(&self, what: &str, mut probe: F, mut accept: A) -> Interaction<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, DriverError>>,
        A: FnMut(Option<T>) -> Option<R>,
    {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut attempts: u32 = 0;

        loop {
            if self.is_cancelled() {
                return Err(InteractionError::Cancelled { what: what.to_string() });
            }

            attempts += 1;
            let outcome = match probe().await {
                Ok(value) => accept(value),
                Err(e) if e.is_transient() => {
                    debug!(what, attempts, error = %e, "transient error, polling again");
                    accept(None)
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(found) = outcome {
                debug!(
                    what,
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "condition met"
                );
                return Ok(found);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(InteractionError::Timeout {
                    what: what.to_string(),
                    waited: now - started,
                });
            }

            self.park((deadline - now).min(self.interval), what).await?;
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |t| t.is_cancelled())
    }

    async fn park(&self, nap: Duration, what: &str) -> Interaction<()> {
        match &self.cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(InteractionError::Cancelled { what: what.to_string() }),
                _ = tokio::time::sleep(nap) => Ok(()),
            },
            None => {
                tokio::time::sleep(nap).await;
                Ok(())
            }
        }
    }
}
