// src/resilience/executor_tests.rs
//
// Executor behaviour under simulated storage failures.
// Time is paused, so backoff sleeps and break durations advance instantly.

use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::circuit_breaker::{BreakerSettings, CircuitState};
use super::error::ResilienceError;
use super::executor::ResilienceExecutor;
use super::observer::{LogObserver, MockResilienceObserver};
use super::retry::RetryPolicy;

// ============================================================================
// HELPERS
// ============================================================================

fn executor(max_retries: u32, threshold: u32) -> ResilienceExecutor {
    ResilienceExecutor::new(
        RetryPolicy::new(max_retries, Duration::from_secs(1)),
        BreakerSettings {
            failure_threshold: threshold,
            break_duration: Duration::from_secs(30),
        },
        Arc::new(LogObserver),
    )
}

/// Operation that fails the first `failures` times, then returns `"ok"`
fn flaky(
    calls: &Arc<AtomicU32>,
    failures: u32,
) -> impl FnMut() -> std::future::Ready<Result<&'static str, io::Error>> {
    let calls = calls.clone();
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        if n < failures {
            std::future::ready(Err(io::Error::other("database is locked")))
        } else {
            std::future::ready(Ok("ok"))
        }
    }
}

fn always_failing(
    calls: &Arc<AtomicU32>,
) -> impl FnMut() -> std::future::Ready<Result<(), io::Error>> {
    let calls = calls.clone();
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Err(io::Error::other("connection refused")))
    }
}

// ============================================================================
// CIRCUIT BREAKER THROUGH THE EXECUTOR
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_three_failures_open_the_circuit_and_next_call_fails_fast() {
    let exec = executor(3, 3);
    let calls = Arc::new(AtomicU32::new(0));

    let result = exec.execute(always_failing(&calls)).await;

    assert!(matches!(result, Err(ResilienceError::CircuitOpen { source: Some(_), .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(exec.circuit_state(), CircuitState::Open);

    // Immediately after: rejected without touching the operation
    let result = exec.execute(always_failing(&calls)).await;
    assert!(matches!(result, Err(ResilienceError::CircuitOpen { source: None, .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_trial_after_break_closes_the_circuit() {
    let exec = executor(0, 3);
    let calls = Arc::new(AtomicU32::new(0));

    for _ in 0..3 {
        let _ = exec.execute(always_failing(&calls)).await;
    }
    assert_eq!(exec.circuit_state(), CircuitState::Open);

    tokio::time::advance(Duration::from_secs(30)).await;
    assert_eq!(exec.circuit_state(), CircuitState::HalfOpen);

    let ok_calls = Arc::new(AtomicU32::new(0));
    let result = exec.execute(flaky(&ok_calls, 0)).await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(ok_calls.load(Ordering::SeqCst), 1);
    assert_eq!(exec.circuit_state(), CircuitState::Closed);
    assert_eq!(exec.consecutive_failures(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_trial_reopens_without_retrying() {
    let exec = executor(3, 1);
    let calls = Arc::new(AtomicU32::new(0));

    let _ = exec.execute(always_failing(&calls)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    tokio::time::advance(Duration::from_secs(30)).await;
    let result = exec.execute(always_failing(&calls)).await;

    assert!(matches!(result, Err(ResilienceError::CircuitOpen { .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 2, "only the trial runs");
    assert_eq!(exec.circuit_state(), CircuitState::Open);
}

// ============================================================================
// RETRY
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_two_failures_then_success_is_transparent() {
    let exec = executor(3, 3);
    let calls = Arc::new(AtomicU32::new(0));

    let started = tokio::time::Instant::now();
    let result = exec.execute(flaky(&calls, 2)).await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // 2s + 4s of backoff
    assert_eq!(started.elapsed(), Duration::from_secs(6));
    // the intermediate failures were counted, then the success reset them
    assert_eq!(exec.consecutive_failures(), 0);
    assert_eq!(exec.circuit_state(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_retry_exhausted_while_circuit_stays_closed() {
    let exec = executor(2, 10);
    let calls = Arc::new(AtomicU32::new(0));

    let result = exec.execute(always_failing(&calls)).await;

    match result {
        Err(ResilienceError::RetryExhausted { attempts, source, .. }) => {
            assert_eq!(attempts, 3);
            assert_eq!(source.to_string(), "connection refused");
        }
        other => panic!("expected retry exhausted, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(exec.circuit_state(), CircuitState::Closed);
    assert_eq!(exec.consecutive_failures(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_observer_reports_each_retry_with_its_delay() {
    let mut observer = MockResilienceObserver::new();
    observer
        .expect_on_retry()
        .withf(|attempt, delay, _| *attempt == 1 && *delay == Duration::from_millis(20))
        .times(1)
        .return_const(());
    observer
        .expect_on_retry()
        .withf(|attempt, delay, _| *attempt == 2 && *delay == Duration::from_millis(40))
        .times(1)
        .return_const(());

    let exec = ResilienceExecutor::new(
        RetryPolicy::new(3, Duration::from_millis(10)),
        BreakerSettings::default(),
        Arc::new(observer),
    );
    let calls = Arc::new(AtomicU32::new(0));

    assert!(exec.execute(flaky(&calls, 2)).await.is_ok());
}

// ============================================================================
// CANCELLATION & CONCURRENCY
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_cancelled_in_flight_call_counts_as_failure() {
    let exec = executor(3, 3);

    let result: Result<(), _> = exec
        .execute_with_cancel(tokio::time::sleep(Duration::from_secs(1)), || {
            std::future::pending::<Result<(), io::Error>>()
        })
        .await;

    assert!(matches!(result, Err(ResilienceError::Cancelled(_))));
    assert_eq!(exec.consecutive_failures(), 1);
    assert_eq!(exec.circuit_state(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_keeps_recorded_failures() {
    let exec = executor(3, 3);
    let calls = Arc::new(AtomicU32::new(0));

    // first attempt fails at t=0, backoff is 2s, cancel fires at 1s
    let result = exec
        .execute_with_cancel(
            tokio::time::sleep(Duration::from_secs(1)),
            always_failing(&calls),
        )
        .await;

    assert!(matches!(result, Err(ResilienceError::Cancelled(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(exec.consecutive_failures(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_executor_under_concurrent_callers() {
    let exec = Arc::new(executor(0, 5));
    let calls = Arc::new(AtomicU32::new(0));

    let mut handles = Vec::new();
    for _ in 0..20 {
        let exec = exec.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            exec.execute(always_failing(&calls)).await
        }));
    }

    let mut open = 0;
    for handle in handles {
        if let Err(ResilienceError::CircuitOpen { .. }) = handle.await.unwrap() {
            open += 1;
        }
    }

    assert_eq!(exec.circuit_state(), CircuitState::Open);
    // every call either ran and failed, or was rejected; at least the
    // threshold ran before the breaker opened
    assert!(calls.load(Ordering::SeqCst) >= 5);
    assert!(open >= 20 - calls.load(Ordering::SeqCst) as usize);
}
