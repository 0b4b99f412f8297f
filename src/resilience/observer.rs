// src/resilience/observer.rs
//
// Structured hook for retry attempts and breaker transitions.
// Operators read these to tell a sustained outage from a transient blip.

use std::time::Duration;

use chrono::{DateTime, Local};
use log::{info, warn};

use super::error::MESSAGE_TIMESTAMP;

#[cfg_attr(test, mockall::automock)]
pub trait ResilienceObserver: Send + Sync {
    /// A failed attempt will be retried after `delay`
    fn on_retry(&self, attempt: u32, delay: Duration, error: &str);

    /// The breaker moved to Open
    fn on_break(&self, consecutive_failures: u32, break_duration: Duration, error: &str);

    /// The break elapsed; the next call is a trial
    fn on_half_open(&self);

    /// A trial succeeded; the breaker is Closed again
    fn on_reset(&self);

    /// A call was short-circuited while Open
    fn on_rejected(&self, opened_at: DateTime<Local>);
}

/// Default observer: writes every event through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

fn now() -> String {
    Local::now().format(MESSAGE_TIMESTAMP).to_string()
}

impl ResilienceObserver for LogObserver {
    fn on_retry(&self, attempt: u32, delay: Duration, error: &str) {
        info!(
            "event=db_retry attempt={} at={} delay_ms={} error={}",
            attempt,
            now(),
            delay.as_millis(),
            error
        );
    }

    fn on_break(&self, consecutive_failures: u32, break_duration: Duration, error: &str) {
        warn!(
            "event=circuit_open at={} failures={} break_secs={} error={}",
            now(),
            consecutive_failures,
            break_duration.as_secs_f64(),
            error
        );
    }

    fn on_half_open(&self) {
        info!("event=circuit_half_open at={} next call is a trial", now());
    }

    fn on_reset(&self) {
        info!("event=circuit_closed at={} service is operational", now());
    }

    fn on_rejected(&self, opened_at: DateTime<Local>) {
        warn!(
            "event=circuit_rejected at={} opened_at={}",
            now(),
            opened_at.format(MESSAGE_TIMESTAMP)
        );
    }
}
