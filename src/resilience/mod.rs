// src/resilience/mod.rs
//
// Resilient data access
//
// Provides:
// - Retry with exponential backoff
// - Consecutive-failure circuit breaker
// - Observer hook for retry attempts and breaker transitions
// - The executor every repository call goes through

pub mod circuit_breaker;
pub mod error;
pub mod executor;
pub mod observer;
pub mod retry;

#[cfg(test)]
mod executor_tests;

pub use circuit_breaker::{BreakerSettings, CallPermit, CircuitBreaker, CircuitState, Rejection};
pub use error::{BoxError, ResilienceError};
pub use executor::ResilienceExecutor;
pub use observer::{LogObserver, ResilienceObserver};
pub use retry::RetryPolicy;
