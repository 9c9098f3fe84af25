//! Retry configuration for the management API client
//!
//! Transient failures (transport errors, 429, most 5xx) are retried a fixed
//! number of times with linear jitter backoff.

use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Whether retry is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of retries after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Lower bound of the per-attempt wait in milliseconds
    #[serde(default = "default_min_wait_ms")]
    pub min_wait_ms: u64,

    /// Upper bound of the per-attempt wait in milliseconds
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: default_max_retries(),
            min_wait_ms: default_min_wait_ms(),
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Number of retries actually permitted
    #[must_use]
    pub fn retries(&self) -> u32 {
        if self.enabled { self.max_retries } else { 0 }
    }

    /// Wait before retry number `attempt` (1-based)
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        linear_jitter_backoff(
            Duration::from_millis(self.min_wait_ms),
            Duration::from_millis(self.max_wait_ms),
            attempt,
        )
    }
}

/// Linear backoff with jitter
///
/// Picks a random base in `[min, max)` and scales it by the attempt number.
/// When `max <= min` the base is `min`.
pub fn linear_jitter_backoff(min: Duration, max: Duration, attempt: u32) -> Duration {
    let attempt = attempt.max(1);
    if max <= min {
        return min * attempt;
    }

    let span = (max - min).as_nanos() as u64;
    let jitter = rand::thread_rng().gen_range(0..span);
    (min + Duration::from_nanos(jitter)) * attempt
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_min_wait_ms() -> u64 {
    1000
}

fn default_max_wait_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.min_wait_ms, 1000);
        assert_eq!(config.max_wait_ms, 5000);
        assert_eq!(config.retries(), 3);
    }

    #[test]
    fn test_disabled_has_no_retries() {
        assert_eq!(RetryConfig::disabled().retries(), 0);
    }

    #[test]
    fn test_backoff_stays_within_linear_bounds() {
        let min = Duration::from_millis(100);
        let max = Duration::from_millis(500);
        for attempt in 1..=4 {
            for _ in 0..50 {
                let wait = linear_jitter_backoff(min, max, attempt);
                assert!(wait >= min * attempt, "{wait:?} below bound");
                assert!(wait < max * attempt, "{wait:?} above bound");
            }
        }
    }

    #[test]
    fn test_backoff_without_span_is_linear() {
        let min = Duration::from_millis(200);
        assert_eq!(linear_jitter_backoff(min, min, 1), min);
        assert_eq!(linear_jitter_backoff(min, min, 3), min * 3);
        assert_eq!(
            linear_jitter_backoff(min, Duration::from_millis(10), 2),
            min * 2
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: RetryConfig = toml::from_str("max_retries = 5").unwrap();
        assert!(config.enabled);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.min_wait_ms, 1000);
    }
}
