//! Per-client fixed-window rate limiting.
//!
//! Each client id gets a counter that resets once its window is older than
//! the configured length. Requests straddling a window boundary can see up to
//! twice the nominal limit admitted in a short burst; that is the accepted
//! cost of a fixed window over a sliding one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Usage recorded for one client in its current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageWindow {
    pub count: u32,
    pub window_start: Instant,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Rejected,
}

impl Admission {
    pub fn is_allowed(self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Shared rate limiter state. Cheap to clone; clones share the same map.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, UsageWindow>>,
    max_requests: u32,
    window: Duration,
    grace: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_requests,
            window,
            grace: window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_millis(config.window_ms))
            .with_grace(Duration::from_millis(config.sweep_grace_ms))
    }

    /// How long past expiry a window survives [`RateLimiter::sweep_at`].
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Count a request for `client_id` now.
    pub fn admit(&self, client_id: &str) -> Admission {
        self.admit_at(client_id, Instant::now())
    }

    /// Count a request for `client_id` at `now`.
    ///
    /// The lookup, reset and increment happen while holding the entry's shard
    /// lock, so concurrent requests for one client never lose an update.
    pub fn admit_at(&self, client_id: &str, now: Instant) -> Admission {
        let mut entry = self
            .windows
            .entry(client_id.to_string())
            .or_insert(UsageWindow { count: 0, window_start: now });

        if now.saturating_duration_since(entry.window_start) > self.window {
            *entry = UsageWindow { count: 0, window_start: now };
        }
        entry.count = entry.count.saturating_add(1);

        if entry.count > self.max_requests {
            Admission::Rejected
        } else {
            Admission::Allowed
        }
    }

    /// Current window for a client, if one is tracked.
    pub fn usage(&self, client_id: &str) -> Option<UsageWindow> {
        self.windows.get(client_id).map(|w| *w)
    }

    /// Number of clients with a tracked window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Drop windows that expired more than the grace period before `now`.
    /// Returns how many were removed.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let keep_for = self.window + self.grace;
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.window_start) <= keep_for);
        before.saturating_sub(self.windows.len())
    }

    /// Periodically sweep expired windows until shutdown.
    pub async fn run_sweeper(self, every: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(every);
        // The first tick fires immediately; nothing to sweep yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep_at(Instant::now());
                    let remaining = self.tracked_clients();
                    metrics::record_rate_limiter_clients(remaining);
                    if removed > 0 {
                        tracing::debug!(removed, remaining, "Swept expired rate-limit windows");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate-limit sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
