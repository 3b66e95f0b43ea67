//! Behavior tests for the polling loop, cancellation, and lifecycle control.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tickwatch_core::{
    monitor, CancelToken, ConfigError, Decision, Monitor, PollInterval, RuleSet, Symbol,
    WaitOutcome, MIN_POLL_INTERVAL,
};
use tickwatch_tests::{Event, FailingProvider, RecordingObserver, StaticProvider};

fn tsla() -> Symbol {
    Symbol::parse("tsla").expect("valid symbol")
}

#[tokio::test]
async fn bounded_wait_returns_promptly_once_cancelled() {
    // A wait of an hour must still unblock within a small tolerance of the
    // token being set 50ms in.
    let token = CancelToken::new();
    let waiter = token.clone();
    let started = Instant::now();

    let wait = tokio::spawn(async move { waiter.wait_for(Duration::from_secs(3600)).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let outcome = wait.await.expect("wait task should not panic");
    let elapsed = started.elapsed();

    assert_eq!(outcome, WaitOutcome::Cancelled);
    assert!(elapsed >= Duration::from_millis(50));
    assert!(
        elapsed < Duration::from_millis(500),
        "cancel took {elapsed:?} to unblock the wait"
    );
}

#[test]
fn interval_below_the_floor_refuses_startup_without_touching_the_provider() {
    let provider = Arc::new(FailingProvider::default());

    let error = PollInterval::new(Duration::from_secs(5)).expect_err("must refuse");

    assert_eq!(
        error,
        ConfigError::IntervalBelowFloor {
            requested_secs: 5,
            floor_secs: MIN_POLL_INTERVAL.as_secs(),
        }
    );
    assert_eq!(provider.calls(), 0, "no fetch may happen before the floor check");
}

#[tokio::test]
async fn fetch_failure_skips_evaluation_and_retries_next_tick() {
    let provider = Arc::new(FailingProvider::default());
    let observer = Arc::new(RecordingObserver::default());
    let monitor = Monitor::new(provider.clone(), RuleSet::default())
        .with_observer(observer.clone());

    let cancel = CancelToken::new();
    let task = tokio::spawn(monitor.run(tsla(), cancel.clone(), Duration::from_millis(100)));

    tokio::time::sleep(Duration::from_millis(350)).await;
    cancel.cancel();
    task.await.expect("loop should exit cleanly");

    // The loop kept retrying at its cadence, never faster.
    assert!(provider.calls() >= 2, "loop must retry after a failed fetch");
    assert!(provider.calls() <= 5, "loop must wait out the full interval");

    // Every attempt was reported as no-data; the evaluator never ran.
    assert_eq!(observer.no_data_count(), provider.calls());
    assert_eq!(observer.decision_count(), 0);
    assert_eq!(observer.stopped_count(), 1);
}

#[tokio::test]
async fn successful_ticks_report_a_decision_each() {
    let provider = Arc::new(StaticProvider::with_fields(&[
        ("52WeekChange", 0.1),
        ("regularMarketOpen", 100.0),
        ("regularMarketPrice", 90.0),
    ]));
    let observer = Arc::new(RecordingObserver::default());
    let monitor = Monitor::new(provider.clone(), RuleSet::default())
        .with_observer(observer.clone());

    let cancel = CancelToken::new();
    let task = tokio::spawn(monitor.run(tsla(), cancel.clone(), Duration::from_millis(100)));

    tokio::time::sleep(Duration::from_millis(250)).await;
    cancel.cancel();
    task.await.expect("loop should exit cleanly");

    assert_eq!(observer.tick_count(), observer.decision_count());
    assert!(observer.decisions().iter().all(Decision::is_buy));
}

#[tokio::test]
async fn shutdown_interrupts_a_long_wait_and_joins_the_task() {
    let provider = Arc::new(StaticProvider::with_fields(&[
        ("52WeekChange", -0.2),
        ("regularMarketOpen", 100.0),
        ("regularMarketPrice", 105.0),
    ]));
    let observer = Arc::new(RecordingObserver::default());
    let monitor = Monitor::new(provider.clone(), RuleSet::default())
        .with_observer(observer.clone());

    let interval = PollInterval::new(Duration::from_secs(3600)).expect("valid interval");
    let handle = monitor::spawn(monitor, tsla(), interval);

    // Let the first tick land, then interrupt the hour-long wait.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let started = Instant::now();
    handle.shutdown().await.expect("monitor should join cleanly");

    assert!(
        started.elapsed() < Duration::from_millis(500),
        "shutdown must not wait out the interval"
    );
    assert_eq!(provider.calls(), 1);
    assert_eq!(observer.stopped_count(), 1);
    assert_eq!(observer.events().last(), Some(&Event::Stopped));
}

#[tokio::test]
async fn cancelling_before_the_first_wait_stops_after_one_tick() {
    let provider = Arc::new(StaticProvider::with_fields(&[("52WeekChange", 0.1)]));
    let observer = Arc::new(RecordingObserver::default());
    let monitor = Monitor::new(provider.clone(), RuleSet::default())
        .with_observer(observer.clone());

    let cancel = CancelToken::new();
    cancel.cancel();
    monitor
        .run(tsla(), cancel, Duration::from_secs(3600))
        .await;

    assert_eq!(provider.calls(), 1);
    assert_eq!(observer.stopped_count(), 1);
}
