//! Retry policy and backoff state machine
//!
//! The fetch loop is driven by [`RetryState`]. Transitions are pure functions
//! of the current state, the attempt outcome and a jitter sample, so the whole
//! backoff schedule can be tested without timers. Sleeping goes through the
//! [`Sleeper`] trait for the same reason.

use crate::config::RetryConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Bounds for retrying a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (>= 1)
    pub max_attempts: u32,

    /// Delay after the first failed attempt, doubled for each later one
    pub base_delay: Duration,

    /// Cap on any single delay, jitter included
    pub max_delay: Duration,

    /// Upper bound of the uniform random jitter added to each delay
    pub jitter: Duration,
}

impl RetryPolicy {
    /// Backoff before the attempt following `attempt` (1-based)
    ///
    /// `min(base * 2^(attempt - 1) + jitter, max)`
    pub fn delay_for(&self, attempt: u32, jitter: Duration) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let backoff = self.base_delay.saturating_mul(1u32 << exponent);
        backoff.saturating_add(jitter).min(self.max_delay)
    }

    /// Draws a jitter sample in `[0, self.jitter]`
    pub fn sample_jitter(&self) -> Duration {
        random_between(Duration::ZERO, self.jitter)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: Duration::from_millis(config.jitter_ms),
        }
    }
}

/// Result of a single attempt, as seen by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure,
}

/// Position of a fetch in its retry schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Attempt `n` (1-based) is in flight
    Attempting(u32),

    /// Attempt `attempt` failed; the next one starts after `delay`
    Waiting { attempt: u32, delay: Duration },

    /// Attempt `attempts` succeeded
    Succeeded { attempts: u32 },

    /// All `attempts` failed
    Exhausted { attempts: u32 },
}

impl RetryState {
    pub fn initial() -> Self {
        RetryState::Attempting(1)
    }

    /// Applies the outcome of the in-flight attempt
    ///
    /// Only meaningful in `Attempting`; other states are returned unchanged.
    pub fn on_outcome(self, policy: &RetryPolicy, outcome: AttemptOutcome, jitter: Duration) -> Self {
        let RetryState::Attempting(attempt) = self else {
            return self;
        };

        match outcome {
            AttemptOutcome::Success => RetryState::Succeeded { attempts: attempt },
            AttemptOutcome::Failure if attempt >= policy.max_attempts => {
                RetryState::Exhausted { attempts: attempt }
            }
            AttemptOutcome::Failure => RetryState::Waiting {
                attempt,
                delay: policy.delay_for(attempt, jitter),
            },
        }
    }

    /// Leaves `Waiting` once the delay has elapsed
    pub fn resume(self) -> Self {
        match self {
            RetryState::Waiting { attempt, .. } => RetryState::Attempting(attempt + 1),
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetryState::Succeeded { .. } | RetryState::Exhausted { .. }
        )
    }
}

/// Suspends the current task; injected so tests can skip real waits
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Production sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Uniform random duration in `[low, high]` with millisecond resolution
pub fn random_between(low: Duration, high: Duration) -> Duration {
    let low_ms = low.as_millis() as u64;
    let high_ms = high.as_millis() as u64;
    if high_ms <= low_ms {
        return low;
    }
    Duration::from_millis(rand::thread_rng().gen_range(low_ms..=high_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            jitter: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = policy(5);
        assert_eq!(policy.delay_for(1, Duration::ZERO), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2, Duration::ZERO), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3, Duration::ZERO), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_adds_jitter() {
        let policy = policy(5);
        assert_eq!(
            policy.delay_for(2, Duration::from_millis(30)),
            Duration::from_millis(230)
        );
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = policy(10);
        assert_eq!(policy.delay_for(4, Duration::from_millis(5)), Duration::from_millis(805));
        assert_eq!(policy.delay_for(5, Duration::ZERO), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(60, Duration::from_millis(50)), Duration::from_millis(1000));
    }

    #[test]
    fn test_sample_jitter_within_bounds() {
        let policy = policy(3);
        for _ in 0..100 {
            assert!(policy.sample_jitter() <= Duration::from_millis(50));
        }
    }

    #[test]
    fn test_success_on_first_attempt() {
        let state = RetryState::initial().on_outcome(&policy(3), AttemptOutcome::Success, Duration::ZERO);
        assert_eq!(state, RetryState::Succeeded { attempts: 1 });
        assert!(state.is_terminal());
    }

    #[test]
    fn test_failure_waits_then_resumes() {
        let policy = policy(3);
        let state = RetryState::initial().on_outcome(&policy, AttemptOutcome::Failure, Duration::ZERO);
        assert_eq!(
            state,
            RetryState::Waiting {
                attempt: 1,
                delay: Duration::from_millis(100)
            }
        );
        assert!(!state.is_terminal());
        assert_eq!(state.resume(), RetryState::Attempting(2));
    }

    #[test]
    fn test_exhausts_after_max_attempts() {
        let policy = policy(3);
        let mut state = RetryState::initial();
        let mut attempts = 0;

        while !state.is_terminal() {
            attempts += 1;
            state = state
                .on_outcome(&policy, AttemptOutcome::Failure, Duration::ZERO)
                .resume();
        }

        assert_eq!(attempts, 3);
        assert_eq!(state, RetryState::Exhausted { attempts: 3 });
    }

    #[test]
    fn test_single_attempt_policy_never_waits() {
        let state = RetryState::initial().on_outcome(&policy(1), AttemptOutcome::Failure, Duration::ZERO);
        assert_eq!(state, RetryState::Exhausted { attempts: 1 });
    }

    #[test]
    fn test_terminal_states_ignore_outcomes() {
        let policy = policy(3);
        let done = RetryState::Succeeded { attempts: 2 };
        assert_eq!(done.on_outcome(&policy, AttemptOutcome::Failure, Duration::ZERO), done);
        assert_eq!(done.resume(), done);
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            max_attempts: 0,
            base_delay_ms: 250,
            max_delay_ms: 4000,
            jitter_ms: 10,
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_millis(4000));
        assert_eq!(policy.jitter, Duration::from_millis(10));
    }

    #[test]
    fn test_random_between_degenerate_range() {
        let d = Duration::from_millis(300);
        assert_eq!(random_between(d, d), d);
        assert_eq!(random_between(d, Duration::from_millis(100)), d);
    }
}
