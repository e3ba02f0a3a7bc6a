//! GitHub core API rate-limit budgeting.
//!
//! Listing pages and metadata lookups all count against the core limit.
//! Before a batch of calls the runner checks that enough requests remain and
//! otherwise sleeps until the window resets.

use octocrab::Octocrab;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Maximum time to wait for rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Rate limit information for the core API.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u64,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
    /// Total requests allowed per window.
    pub limit: u64,
}

impl RateLimitInfo {
    /// Seconds to wait before `needed` requests can be made, or `None` if
    /// they fit in the current window (or the window already reset).
    #[must_use]
    pub fn wait_for(&self, needed: u64, now: u64) -> Option<u64> {
        if self.remaining >= needed || self.reset <= now {
            return None;
        }
        Some((self.reset - now).min(MAX_WAIT_SECS))
    }
}

/// Reads the current core rate limit.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: core.remaining as u64,
        reset: core.reset,
        limit: core.limit as u64,
    })
}

/// Waits until `needed` core requests are available.
///
/// The lookup itself is bounded by `timeout`. A failing or slow lookup is not
/// fatal; the calls that follow surface their own errors.
pub async fn ensure_core_budget(octocrab: &Octocrab, needed: u64, timeout: Duration) {
    let info = match tokio::time::timeout(timeout, check_core_rate_limit(octocrab)).await {
        Ok(Ok(info)) => info,
        Ok(Err(e)) => {
            debug!(error = %e, "Could not read rate limit, continuing");
            return;
        }
        Err(_) => {
            warn!(
                timeout_secs = timeout.as_secs_f64(),
                "Rate limit lookup timed out, continuing"
            );
            return;
        }
    };

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if let Some(wait_secs) = info.wait_for(needed, now) {
        if info.reset - now > MAX_WAIT_SECS {
            warn!(
                max_wait = MAX_WAIT_SECS,
                "Rate limit reset too far in future, capping wait time"
            );
        }
        info!(
            remaining = info.remaining,
            needed,
            wait_secs,
            "Rate limit low, waiting for reset"
        );
        tokio::time::sleep(Duration::from_secs(wait_secs)).await;
    }
}
