//! Reconnect backoff.

use std::time::Duration;

/// Exponential backoff between connection attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Reconnect at all after the first attempt or a dropped connection.
    pub enabled: bool,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Give up after this many consecutive failures. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    pub const fn with_defaults() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            max_attempts: None,
        }
    }

    /// Connect once and stop when that connection ends.
    pub const fn never() -> Self {
        Self {
            enabled: false,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_attempts: Some(0),
        }
    }

    /// Delay before retry number `attempt` (0-based), or `None` to give up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        if self.max_attempts.is_some_and(|max| attempt >= max) {
            return None;
        }
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        Some(
            self.initial_delay
                .saturating_mul(factor)
                .min(self.max_delay),
        )
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_until_cap() {
        let policy = ReconnectPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(700),
            ..ReconnectPolicy::default()
        };
        let delays: Vec<u128> = (0..5)
            .map(|n| policy.delay_for(n).unwrap().as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 700, 700]);
    }

    #[test]
    fn test_never_gives_up_immediately() {
        assert_eq!(ReconnectPolicy::never().delay_for(0), None);
    }

    #[test]
    fn test_max_attempts() {
        let policy = ReconnectPolicy {
            max_attempts: Some(2),
            ..ReconnectPolicy::default()
        };
        assert!(policy.delay_for(1).is_some());
        assert!(policy.delay_for(2).is_none());
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(u32::MAX), Some(policy.max_delay));
    }
}
