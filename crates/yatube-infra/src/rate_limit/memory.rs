//! In-memory per-key rate limiter using the governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovernorRateLimiter};

use yatube_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

type KeyedRateLimiter = GovernorRateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window and key.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Load configuration from environment variables under `prefix`,
    /// e.g. `AUTH_RATE_LIMIT_MAX_REQUESTS` for prefix `AUTH_`.
    pub fn from_env(prefix: &str) -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var(format!("{prefix}RATE_LIMIT_MAX_REQUESTS"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: std::env::var(format!("{prefix}RATE_LIMIT_WINDOW_SECS"))
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }
}

/// In-memory rate limiter using the GCRA algorithm, one bucket per key.
///
/// Note: Limits are per-process, not distributed across instances.
pub struct InMemoryRateLimiter {
    limiter: KeyedRateLimiter,
    clock: DefaultClock,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        let burst = NonZeroU32::new(config.max_requests)
            .ok_or_else(|| RateLimitError::InvalidConfig("max_requests must be > 0".into()))?;
        let quota = Quota::with_period(config.window / burst.get())
            .ok_or_else(|| RateLimitError::InvalidConfig("window must be > 0".into()))?
            .allow_burst(burst);

        Ok(Self {
            limiter: KeyedRateLimiter::keyed(quota),
            clock: DefaultClock::default(),
        })
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(_) => Ok(RateLimitResult {
                allowed: true,
                reset_after: Duration::ZERO,
            }),
            Err(not_until) => Ok(RateLimitResult {
                allowed: false,
                reset_after: not_until.wait_time_from(self.clock.now()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_burst_then_reject_per_key() {
        let limiter = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
        })
        .unwrap();

        assert!(limiter.check("10.0.0.1").await.unwrap().allowed);
        assert!(limiter.check("10.0.0.1").await.unwrap().allowed);

        let third = limiter.check("10.0.0.1").await.unwrap();
        assert!(!third.allowed);
        assert!(third.reset_after > Duration::ZERO);

        // Other clients have their own bucket.
        assert!(limiter.check("10.0.0.2").await.unwrap().allowed);
    }

    #[test]
    fn test_zero_requests_is_rejected() {
        let result = InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 0,
            window: Duration::from_secs(60),
        });
        assert!(matches!(result, Err(RateLimitError::InvalidConfig(_))));
    }
}
