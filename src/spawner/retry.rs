//! Adaptive wait interval for the launch loop.
//!
//! The interval moves by one second at a time and only after two consecutive failures of the
//! same kind: sustained throttling slows the loop down, sustained other failures speed it back
//! up towards the floor.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{CloudError, IsThrottled};

/// Consecutive same-kind failures needed before the interval moves.
pub const HYSTERESIS_STREAK: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Explicit throttling signal from the provider.
    RateLimited,
    /// Anything else, capacity errors and transport failures included.
    OtherTransient,
}

impl FailureKind {
    pub fn classify(err: &CloudError) -> Self {
        if err.is_throttled() {
            FailureKind::RateLimited
        } else {
            FailureKind::OtherTransient
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial_wait_secs: u64,
    pub floor_secs: u64,
    /// Failed attempts between status reports; `0` disables them.
    pub status_every: u64,
}

impl From<&RetryConfig> for BackoffPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            initial_wait_secs: cfg.initial_wait_secs.max(cfg.minimum_wait_secs),
            floor_secs: cfg.minimum_wait_secs,
            status_every: cfg.status_every,
        }
    }
}

/// Counters owned by the retry controller, threaded through each iteration by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    /// Failed launch attempts so far.
    pub total_attempts: u64,
    /// Failed attempts since the last status report.
    pub since_status: u64,
    pub wait_secs: u64,
    /// Consecutive throttled failures not yet turned into a slow-down.
    pub throttle_streak: u32,
    /// Consecutive other failures above the floor not yet turned into a speed-up.
    pub speedup_streak: u32,
}

impl RetryState {
    pub fn new(policy: &BackoffPolicy) -> Self {
        Self {
            total_attempts: 0,
            since_status: 0,
            wait_secs: policy.initial_wait_secs,
            throttle_streak: 0,
            speedup_streak: 0,
        }
    }

    #[must_use]
    pub fn record_failure(self, kind: FailureKind, policy: &BackoffPolicy) -> Self {
        let mut next = Self {
            total_attempts: self.total_attempts + 1,
            since_status: self.since_status + 1,
            ..self
        };

        match kind {
            FailureKind::RateLimited => {
                next.speedup_streak = 0;
                next.throttle_streak += 1;
                if next.throttle_streak == HYSTERESIS_STREAK {
                    next.wait_secs += 1;
                    next.throttle_streak = 0;
                }
            }
            FailureKind::OtherTransient => {
                next.throttle_streak = 0;
                if next.wait_secs > policy.floor_secs {
                    next.speedup_streak += 1;
                }
                if next.speedup_streak == HYSTERESIS_STREAK {
                    next.wait_secs = next.wait_secs.saturating_sub(1).max(policy.floor_secs);
                    next.speedup_streak = 0;
                }
            }
        }
        next
    }

    pub fn status_due(&self, policy: &BackoffPolicy) -> bool {
        policy.status_every > 0 && self.since_status >= policy.status_every
    }

    #[must_use]
    pub fn status_reported(self) -> Self {
        Self {
            since_status: 0,
            ..self
        }
    }

    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    const POLICY: BackoffPolicy = BackoffPolicy {
        initial_wait_secs: 1,
        floor_secs: 1,
        status_every: 10,
    };

    fn run(kinds: &[FailureKind], policy: &BackoffPolicy) -> Vec<RetryState> {
        let mut state = RetryState::new(policy);
        kinds
            .iter()
            .map(|kind| {
                state = state.record_failure(*kind, policy);
                state
            })
            .collect()
    }

    #[test]
    fn classify_splits_throttling_from_everything_else() {
        let service = |status: StatusCode| CloudError::Service {
            status,
            code: String::new(),
            message: String::new(),
            opc_request_id: None,
        };
        assert_eq!(
            FailureKind::classify(&service(StatusCode::TOO_MANY_REQUESTS)),
            FailureKind::RateLimited
        );
        assert_eq!(
            FailureKind::classify(&service(StatusCode::INTERNAL_SERVER_ERROR)),
            FailureKind::OtherTransient
        );
        assert_eq!(
            FailureKind::classify(&CloudError::UnexpectedResponse("x".to_string())),
            FailureKind::OtherTransient
        );
    }

    #[test]
    fn throttling_grows_interval_by_one_every_two_failures() {
        let states = run(&[FailureKind::RateLimited; 7], &POLICY);
        let waits: Vec<u64> = states.iter().map(|s| s.wait_secs).collect();
        assert_eq!(waits, vec![1, 2, 2, 3, 3, 4, 4]);
        assert!(waits.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn other_failures_shrink_interval_down_to_floor() {
        let policy = BackoffPolicy {
            initial_wait_secs: 4,
            floor_secs: 2,
            status_every: 10,
        };
        let states = run(&[FailureKind::OtherTransient; 8], &policy);
        let waits: Vec<u64> = states.iter().map(|s| s.wait_secs).collect();
        assert_eq!(waits, vec![4, 3, 3, 2, 2, 2, 2, 2]);
        // At the floor the speed-up counter no longer moves.
        assert_eq!(states.last().map(|s| s.speedup_streak), Some(0));
    }

    #[test]
    fn other_failure_interrupts_a_throttle_streak() {
        let states = run(
            &[
                FailureKind::RateLimited,
                FailureKind::OtherTransient,
                FailureKind::RateLimited,
            ],
            &POLICY,
        );
        assert_eq!(states[2].wait_secs, 1);
        assert_eq!(states[2].throttle_streak, 1);
    }

    #[test]
    fn slow_down_then_speed_up_scenario() {
        let states = run(
            &[
                FailureKind::RateLimited,
                FailureKind::RateLimited,
                FailureKind::OtherTransient,
                FailureKind::OtherTransient,
            ],
            &POLICY,
        );

        assert_eq!(states[1].wait_secs, 2);

        assert_eq!(states[2].throttle_streak, 0);
        assert_eq!(states[2].speedup_streak, 1);
        assert_eq!(states[2].wait_secs, 2);

        assert_eq!(states[3].wait_secs, 1);
        assert_eq!(states[3].speedup_streak, 0);
    }

    #[test]
    fn status_is_due_every_tenth_failure() {
        let mut state = RetryState::new(&POLICY);
        let mut reports = 0;
        for i in 0..35 {
            let kind = if i % 3 == 0 {
                FailureKind::RateLimited
            } else {
                FailureKind::OtherTransient
            };
            state = state.record_failure(kind, &POLICY);
            if state.status_due(&POLICY) {
                reports += 1;
                state = state.status_reported();
            }
        }
        assert_eq!(reports, 3);
        assert_eq!(state.total_attempts, 35);
        assert_eq!(state.since_status, 5);
    }

    #[test]
    fn zero_status_every_disables_reports() {
        let policy = BackoffPolicy {
            status_every: 0,
            ..POLICY
        };
        let states = run(&[FailureKind::OtherTransient; 20], &policy);
        assert!(states.iter().all(|s| !s.status_due(&policy)));
    }
}
