// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! What the transport loop does between retries of a transient failure.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Pause strategy for transient I/O conditions.
///
/// `attempt` starts at 1 and resets whenever a call makes progress.
pub trait RetryStrategy {
    fn wait_before_retry(&mut self, attempt: u32);
}

/// Retry immediately. Lowest latency, burns a core while the socket is not ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyPoll;

impl RetryStrategy for BusyPoll {
    fn wait_before_retry(&mut self, _attempt: u32) {
        std::hint::spin_loop();
    }
}

/// Sleep `initial * 2^(attempt - 1)`, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
        }
    }

    /// Delay used before the given retry attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial
            .checked_mul(1u32 << exponent)
            .map_or(self.max, |d| d.min(self.max))
    }
}

impl RetryStrategy for ExponentialBackoff {
    fn wait_before_retry(&mut self, attempt: u32) {
        std::thread::sleep(self.delay_for(attempt));
    }
}

/// Configuration-level retry selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPolicy {
    #[default]
    BusyPoll,
    ExponentialBackoff { initial: Duration, max: Duration },
}

impl RetryStrategy for RetryPolicy {
    fn wait_before_retry(&mut self, attempt: u32) {
        match self {
            RetryPolicy::BusyPoll => BusyPoll.wait_before_retry(attempt),
            RetryPolicy::ExponentialBackoff { initial, max } => {
                ExponentialBackoff::new(*initial, *max).wait_before_retry(attempt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_until_cap() {
        let backoff =
            ExponentialBackoff::new(Duration::from_micros(10), Duration::from_micros(100));
        assert_eq!(backoff.delay_for(1), Duration::from_micros(10));
        assert_eq!(backoff.delay_for(2), Duration::from_micros(20));
        assert_eq!(backoff.delay_for(4), Duration::from_micros(80));
        assert_eq!(backoff.delay_for(5), Duration::from_micros(100));
        assert_eq!(backoff.delay_for(u32::MAX), Duration::from_micros(100));
    }

    #[test]
    fn test_backoff_max_below_initial() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(5), Duration::from_millis(1));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(5));
        assert_eq!(backoff.delay_for(3), Duration::from_millis(5));
    }

    #[test]
    fn test_busy_poll_returns() {
        let mut policy = RetryPolicy::default();
        for attempt in 1..=1000 {
            policy.wait_before_retry(attempt);
        }
    }
}
