// src/resilience/executor.rs
//
// Retry wrapping a circuit breaker, around any storage call.
//
// RULES:
// - The breaker is consulted before every attempt
// - An Open breaker fails the call at once, no backoff, no further attempts
// - A failure that trips the breaker ends the call the same way
// - Only this module turns storage failures into ResilienceError

use std::future::Future;
use std::sync::Arc;

use super::circuit_breaker::{BreakerSettings, CircuitBreaker, CircuitState, FailureOutcome};
use super::error::{BoxError, ResilienceError};
use super::observer::{LogObserver, ResilienceObserver};
use super::retry::RetryPolicy;
use crate::config::ResilienceConfig;

/// One instance is shared by every unit of work in the process.
pub struct ResilienceExecutor {
    retry: RetryPolicy,
    breaker: CircuitBreaker,
    observer: Arc<dyn ResilienceObserver>,
}

impl ResilienceExecutor {
    pub fn new(
        retry: RetryPolicy,
        breaker: BreakerSettings,
        observer: Arc<dyn ResilienceObserver>,
    ) -> Self {
        Self {
            retry,
            breaker: CircuitBreaker::new(breaker, observer.clone()),
            observer,
        }
    }

    /// Build from configuration, reporting through the `log` facade
    pub fn from_config(config: &ResilienceConfig) -> Self {
        Self::new(
            config.retry_policy(),
            config.breaker_settings(),
            Arc::new(LogObserver),
        )
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.breaker.consecutive_failures()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Run `operation` under the retry and breaker policies.
    ///
    /// `operation` is invoked once per admitted attempt.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        let mut attempt: u32 = 0;

        loop {
            let permit = match self.breaker.acquire() {
                Ok(permit) => permit,
                Err(rejection) => {
                    self.observer.on_rejected(rejection.opened_at);
                    return Err(ResilienceError::circuit_open(
                        rejection.opened_at,
                        rejection.cause,
                        None,
                    ));
                }
            };

            let error: BoxError = match operation().await {
                Ok(value) => {
                    permit.succeed();
                    return Ok(value);
                }
                Err(error) => error.into(),
            };

            let cause = error.to_string();
            match permit.fail(&cause) {
                FailureOutcome::Opened { opened_at } => {
                    return Err(ResilienceError::circuit_open(opened_at, cause, Some(error)));
                }
                FailureOutcome::StillClosed => {}
            }

            if attempt >= self.retry.max_retries {
                return Err(ResilienceError::retry_exhausted(attempt + 1, error));
            }

            attempt += 1;
            let delay = self.retry.delay_for(attempt);
            self.observer.on_retry(attempt, delay, &cause);
            tokio::time::sleep(delay).await;
        }
    }

    /// Like [`execute`](Self::execute), but gives up when `cancel` resolves first.
    ///
    /// An attempt in flight at that moment is recorded as a breaker failure;
    /// cancelling during a backoff sleep leaves the breaker untouched.
    pub async fn execute_with_cancel<T, E, F, Fut, C>(
        &self,
        cancel: C,
        operation: F,
    ) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => Err(ResilienceError::cancelled()),
            result = self.execute(operation) => result,
        }
    }
}

impl Default for ResilienceExecutor {
    fn default() -> Self {
        Self::new(
            RetryPolicy::default(),
            BreakerSettings::default(),
            Arc::new(LogObserver),
        )
    }
}
