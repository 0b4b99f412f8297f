// src/resilience/circuit_breaker.rs
//
// Consecutive-failure circuit breaker.
//
// State is shared by every caller of one executor. The mutex guarding it is
// never held across an await, and observer callbacks run after it is released.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::time::Instant;

use super::observer::ResilienceObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half_open"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    pub break_duration: Duration,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            break_duration: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
struct Break {
    since: Instant,
    opened_at: DateTime<Local>,
    cause: String,
}

#[derive(Debug, Clone)]
enum Phase {
    Closed,
    Open(Break),
    HalfOpen { last: Break, trial_in_flight: bool },
}

#[derive(Debug)]
struct BreakerState {
    phase: Phase,
    consecutive_failures: u32,
}

/// Why a call was not admitted
#[derive(Debug, Clone)]
pub struct Rejection {
    pub opened_at: DateTime<Local>,
    pub cause: String,
}

/// Outcome of recording a failure
#[derive(Debug, Clone)]
pub(crate) enum FailureOutcome {
    StillClosed,
    Opened { opened_at: DateTime<Local> },
}

enum Transition {
    Break { failures: u32, cause: String },
    HalfOpen,
    Reset,
}

pub struct CircuitBreaker {
    settings: BreakerSettings,
    state: Mutex<BreakerState>,
    observer: Arc<dyn ResilienceObserver>,
}

impl CircuitBreaker {
    pub fn new(settings: BreakerSettings, observer: Arc<dyn ResilienceObserver>) -> Self {
        Self {
            settings,
            state: Mutex::new(BreakerState {
                phase: Phase::Closed,
                consecutive_failures: 0,
            }),
            observer,
        }
    }

    pub fn settings(&self) -> BreakerSettings {
        self.settings
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // A panic inside the critical section leaves plain data behind; keep going.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current state as seen by a caller right now.
    /// An Open breaker whose break has elapsed reports HalfOpen.
    pub fn state(&self) -> CircuitState {
        let state = self.lock();
        match &state.phase {
            Phase::Closed => CircuitState::Closed,
            Phase::Open(b) if b.since.elapsed() >= self.settings.break_duration => {
                CircuitState::HalfOpen
            }
            Phase::Open(_) => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Ask to run one call. While HalfOpen only a single trial is admitted.
    pub fn acquire(&self) -> Result<CallPermit<'_>, Rejection> {
        let mut transition = None;
        let result = {
            let mut state = self.lock();
            match state.phase.clone() {
                Phase::Closed => Ok(false),
                Phase::Open(b) if b.since.elapsed() >= self.settings.break_duration => {
                    state.phase = Phase::HalfOpen {
                        last: b,
                        trial_in_flight: true,
                    };
                    transition = Some(Transition::HalfOpen);
                    Ok(true)
                }
                Phase::Open(b) => Err(Rejection {
                    opened_at: b.opened_at,
                    cause: b.cause,
                }),
                Phase::HalfOpen {
                    last,
                    trial_in_flight: false,
                } => {
                    state.phase = Phase::HalfOpen {
                        last,
                        trial_in_flight: true,
                    };
                    Ok(true)
                }
                Phase::HalfOpen { last, .. } => Err(Rejection {
                    opened_at: last.opened_at,
                    cause: last.cause,
                }),
            }
        };
        self.notify(transition);

        result.map(|trial| CallPermit {
            breaker: self,
            trial,
            settled: false,
        })
    }

    fn record_success(&self, trial: bool) {
        let mut transition = None;
        {
            let mut state = self.lock();
            state.consecutive_failures = 0;
            if trial && matches!(state.phase, Phase::HalfOpen { .. }) {
                state.phase = Phase::Closed;
                transition = Some(Transition::Reset);
            }
        }
        self.notify(transition);
    }

    fn record_failure(&self, trial: bool, cause: &str) -> FailureOutcome {
        let mut transition = None;
        let outcome = {
            let mut state = self.lock();
            state.consecutive_failures = state.consecutive_failures.saturating_add(1);

            let should_open = match state.phase {
                Phase::HalfOpen { .. } => trial,
                Phase::Closed => state.consecutive_failures >= self.settings.failure_threshold,
                Phase::Open(_) => false,
            };

            if should_open {
                let opened_at = Local::now();
                state.phase = Phase::Open(Break {
                    since: Instant::now(),
                    opened_at,
                    cause: cause.to_string(),
                });
                transition = Some(Transition::Break {
                    failures: state.consecutive_failures,
                    cause: cause.to_string(),
                });
                FailureOutcome::Opened { opened_at }
            } else {
                match &state.phase {
                    Phase::Open(b) => FailureOutcome::Opened {
                        opened_at: b.opened_at,
                    },
                    _ => FailureOutcome::StillClosed,
                }
            }
        };
        self.notify(transition);
        outcome
    }

    fn notify(&self, transition: Option<Transition>) {
        match transition {
            Some(Transition::Break { failures, cause }) => {
                self.observer
                    .on_break(failures, self.settings.break_duration, &cause)
            }
            Some(Transition::HalfOpen) => self.observer.on_half_open(),
            Some(Transition::Reset) => self.observer.on_reset(),
            None => {}
        }
    }
}

/// Admission ticket for one call.
///
/// Must be settled with [`CallPermit::succeed`] or [`CallPermit::fail`].
/// A permit dropped unsettled (the call's future was cancelled mid-flight)
/// counts as a failure.
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    settled: bool,
}

impl CallPermit<'_> {
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    pub fn succeed(mut self) {
        self.settled = true;
        self.breaker.record_success(self.trial);
    }

    pub(crate) fn fail(mut self, cause: &str) -> FailureOutcome {
        self.settled = true;
        self.breaker.record_failure(self.trial, cause)
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker
                .record_failure(self.trial, "call cancelled before completion");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::observer::{LogObserver, MockResilienceObserver};

    fn breaker(threshold: u32, secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(
            BreakerSettings {
                failure_threshold: threshold,
                break_duration: Duration::from_secs(secs),
            },
            Arc::new(LogObserver),
        )
    }

    fn fail_once(b: &CircuitBreaker) -> FailureOutcome {
        b.acquire().expect("admitted").fail("boom")
    }

    #[test]
    fn test_opens_at_threshold() {
        let b = breaker(3, 30);
        fail_once(&b);
        fail_once(&b);
        assert_eq!(b.state(), CircuitState::Closed);
        assert!(matches!(fail_once(&b), FailureOutcome::Opened { .. }));
        assert_eq!(b.state(), CircuitState::Open);
        assert!(b.acquire().is_err());
    }

    #[test]
    fn test_success_resets_counter() {
        let b = breaker(3, 30);
        fail_once(&b);
        fail_once(&b);
        b.acquire().unwrap().succeed();
        assert_eq!(b.consecutive_failures(), 0);
        fail_once(&b);
        assert_eq!(b.state(), CircuitState::Closed);
    }

    #[test]
    fn test_unsettled_permit_counts_as_failure() {
        let b = breaker(1, 30);
        {
            let _permit = b.acquire().unwrap();
        }
        assert_eq!(b.consecutive_failures(), 1);
        assert_eq!(b.state(), CircuitState::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_admits_a_single_trial() {
        let b = breaker(1, 30);
        fail_once(&b);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(b.state(), CircuitState::HalfOpen);

        let trial = b.acquire().expect("trial admitted");
        assert!(trial.is_trial());
        assert!(b.acquire().is_err(), "second caller must wait for the trial");

        trial.succeed();
        assert_eq!(b.state(), CircuitState::Closed);
        assert!(b.acquire().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_trial_restarts_break() {
        let b = breaker(1, 30);
        fail_once(&b);
        tokio::time::advance(Duration::from_secs(30)).await;

        let outcome = b.acquire().unwrap().fail("still down");
        assert!(matches!(outcome, FailureOutcome::Opened { .. }));
        assert_eq!(b.state(), CircuitState::Open);

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(b.state(), CircuitState::Open);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(b.state(), CircuitState::HalfOpen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_every_transition() {
        let mut observer = MockResilienceObserver::new();
        observer
            .expect_on_break()
            .withf(|failures, duration, _| *failures == 2 && *duration == Duration::from_secs(5))
            .times(1)
            .return_const(());
        observer.expect_on_half_open().times(1).return_const(());
        observer.expect_on_reset().times(1).return_const(());

        let b = CircuitBreaker::new(
            BreakerSettings {
                failure_threshold: 2,
                break_duration: Duration::from_secs(5),
            },
            Arc::new(observer),
        );

        fail_once(&b);
        fail_once(&b);
        tokio::time::advance(Duration::from_secs(5)).await;
        b.acquire().unwrap().succeed();
    }
}
