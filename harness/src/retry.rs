//! Context-creation retry policy.
//!
//! # Policies
//!
//! - `Unbounded` (default): retry immediately, forever. Under sustained
//!   resource exhaustion this spins; a run never drops a measurement.
//! - `Backoff`: exponential backoff `initial_delay * 2^(n-1)` capped at
//!   `max_delay`, giving up after `max_attempts` failed attempts.
//!
//! Both policies produce identical output when creation succeeds.

use std::time::Duration;

/// Bounded exponential backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Failed attempts tolerated before the run is aborted.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpawnRetry {
    #[default]
    Unbounded,
    Backoff(BackoffConfig),
}

impl SpawnRetry {
    /// Delay to wait after the `failures`-th consecutive failure, or `None` to
    /// give up.
    #[must_use]
    pub fn next_delay(&self, failures: u32) -> Option<Duration> {
        match self {
            SpawnRetry::Unbounded => Some(Duration::ZERO),
            SpawnRetry::Backoff(config) => {
                if failures >= config.max_attempts {
                    return None;
                }
                let factor = 2u32.saturating_pow(failures.saturating_sub(1));
                Some(
                    config
                        .initial_delay
                        .saturating_mul(factor)
                        .min(config.max_delay),
                )
            }
        }
    }
}
