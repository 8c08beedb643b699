//! Integration tests for the tick clock and loop driver.
//!
//! Uses `start_paused = true` so Tokio auto-advances time whenever the
//! runtime is idle; `sleep_until` resolves as soon as nothing else can run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nickforge_tick::{Scheduler, TickClock, TickConfig, TickLoop, TickPolicy};
use tokio::sync::oneshot;

// =========================================================================
// Helpers
// =========================================================================

fn config_20hz() -> TickConfig {
    TickConfig {
        initial_jitter_us: 0,
        ..TickConfig::with_rate(20)
    }
}

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_twenty_hz() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.tick_rate_hz, 20);
    assert_eq!(cfg.tick_duration(), Duration::from_millis(50));
    assert_eq!(cfg.policy, TickPolicy::Skip);
}

#[test]
fn test_validated_clamps_rate() {
    assert_eq!(TickConfig::with_rate(0).validated().tick_rate_hz, 1);
    assert_eq!(
        TickConfig::with_rate(1000).validated().tick_rate_hz,
        TickConfig::MAX_TICK_RATE_HZ
    );
}

#[test]
fn test_validated_clamps_threshold() {
    let cfg = TickConfig {
        budget_warn_threshold: 3.0,
        ..TickConfig::default()
    }
    .validated();
    assert_eq!(cfg.budget_warn_threshold, 1.0);
}

// =========================================================================
// TickClock
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_tick_fires_and_increments() {
    let mut clock = TickClock::new(config_20hz());

    let info = clock.wait_for_tick().await;
    assert_eq!(info.tick, 1);
    assert_eq!(info.dt, Duration::from_millis(50));
    assert!(!info.overrun);
    assert_eq!(clock.tick_count(), 1);
    assert_eq!(clock.stats().total_ticks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_increment_monotonically() {
    let mut clock = TickClock::new(config_20hz());
    for expected in 1..=5 {
        assert_eq!(clock.wait_for_tick().await.tick, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_late_wakeup_is_overrun_and_skips() {
    let mut clock = TickClock::new(config_20hz());
    clock.wait_for_tick().await;

    // Stall the "primary context" for three ticks' worth of time.
    tokio::time::advance(Duration::from_millis(200)).await;

    let info = clock.wait_for_tick().await;
    assert!(info.overrun);
    assert!(info.ticks_skipped >= 2, "skipped {}", info.ticks_skipped);
    assert_eq!(clock.stats().total_overruns, 1);
}

#[tokio::test(start_paused = true)]
async fn test_pause_prevents_ticks() {
    let mut clock = TickClock::new(config_20hz());
    clock.wait_for_tick().await;

    clock.pause();
    let result = tokio::time::timeout(Duration::from_secs(1), clock.wait_for_tick()).await;
    assert!(result.is_err(), "paused clock should pend");
}

#[tokio::test(start_paused = true)]
async fn test_resume_allows_ticks_again() {
    let mut clock = TickClock::new(config_20hz());
    clock.wait_for_tick().await;
    clock.pause();
    clock.pause();
    clock.resume();
    clock.resume();
    assert!(!clock.is_paused());

    assert_eq!(clock.wait_for_tick().await.tick, 2);
}

#[test]
fn test_record_tick_end_without_tick_is_noop() {
    let mut clock = TickClock::new(config_20hz());
    clock.record_tick_end();
    assert_eq!(clock.stats().max_tick_time, Duration::ZERO);
}

// =========================================================================
// TickLoop
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_loop_runs_primary_tasks_after_delay() {
    let tick_loop = TickLoop::new(config_20hz());
    let scheduler = tick_loop.scheduler();
    let (done_tx, done_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let observed = Arc::clone(&scheduler);
    scheduler.run_task_later(
        3,
        Box::new(move || {
            let _ = done_tx.send(observed.current_tick());
        }),
    );

    let handle = tokio::spawn(tick_loop.run_until(async {
        let _ = stop_rx.await;
    }));

    let ran_on = done_rx.await.unwrap();
    assert_eq!(ran_on, 3);

    stop_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_loop_runs_worker_tasks_off_loop() {
    let tick_loop = TickLoop::new(config_20hz());
    let scheduler = tick_loop.scheduler();
    let (done_tx, done_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let loop_thread = std::thread::current().id();
    scheduler.run_task_later_async(
        2,
        Box::new(move || {
            let _ = done_tx.send(std::thread::current().id());
        }),
    );

    let handle = tokio::spawn(tick_loop.run_until(async {
        let _ = stop_rx.await;
    }));

    // The current-thread runtime drives the loop on this thread, so a
    // worker task must have landed on a blocking-pool thread.
    let worker_thread = done_rx.await.unwrap();
    assert_ne!(worker_thread, loop_thread);

    stop_tx.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_loop_survives_panicking_task() {
    let tick_loop = TickLoop::new(config_20hz());
    let scheduler = tick_loop.scheduler();
    let ran = Arc::new(AtomicUsize::new(0));
    let (done_tx, done_rx) = oneshot::channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    scheduler.run_task(Box::new(|| panic!("boom")));
    let counter = Arc::clone(&ran);
    scheduler.run_task_later(
        2,
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = done_tx.send(());
        }),
    );

    let handle = tokio::spawn(tick_loop.run_until(async {
        let _ = stop_rx.await;
    }));

    done_rx.await.unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 1);

    stop_tx.send(()).unwrap();
    handle.await.unwrap();
}
