//! Fixed-timestep clock for the primary context.
//!
//! The clock only decides *when* a tick fires; what runs on a tick is the
//! [`TaskQueue`](crate::TaskQueue)'s business. Hosts normally keep the
//! default 20 Hz so tick-denominated delays match the game's own ticks.

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the loop wakes up late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Skip the missed tick(s) and schedule the next one from now.
    #[default]
    Skip,
    /// Keep the original cadence; the next tick fires at its planned time
    /// even if that is immediately.
    Drop,
}

/// Configuration for [`TickClock`].
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz. Clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    pub policy: TickPolicy,
    /// Fraction of the tick budget (0.0–1.0) above which a tick's work is
    /// reported with a warning.
    pub budget_warn_threshold: f64,
    /// Random jitter (0–max µs) added to the first tick only.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 20,
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// A config for `tick_rate_hz` with defaults for everything else.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz == 0 {
            warn!("tick_rate_hz of 0 is not allowed for the primary context; using 1");
            self.tick_rate_hz = 1;
        }
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum; clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}

// ---------------------------------------------------------------------------
// Tick info and stats
// ---------------------------------------------------------------------------

/// Returned by [`TickClock::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    pub dt: Duration,
    /// `true` if the clock woke up more than 10% of a tick late.
    pub overrun: bool,
    pub ticks_skipped: u64,
}

/// Running counters kept by the clock.
#[derive(Debug, Clone, Default)]
pub struct TickStats {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
    /// Longest tick body observed via [`TickClock::record_tick_end`].
    pub max_tick_time: Duration,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Fires ticks at a fixed rate.
pub struct TickClock {
    config: TickConfig,
    tick_duration: Duration,
    tick_count: u64,
    next_tick: TokioInstant,
    /// Set by `wait_for_tick`, consumed by `record_tick_end`.
    tick_start: Option<Instant>,
    paused: bool,
    stats: TickStats,
}

impl TickClock {
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let jitter = if config.initial_jitter_us > 0 {
            Duration::from_micros(rand::rng().random_range(0..config.initial_jitter_us))
        } else {
            Duration::ZERO
        };

        debug!(
            rate_hz = config.tick_rate_hz,
            budget_ms = tick_duration.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick clock created"
        );

        Self {
            config,
            tick_duration,
            tick_count: 0,
            next_tick: TokioInstant::now() + tick_duration + jitter,
            tick_start: None,
            paused: false,
            stats: TickStats::default(),
        }
    }

    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits for the next tick. Pends forever while paused, so it can sit
    /// in a `tokio::select!` next to a shutdown branch.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        if self.paused {
            std::future::pending::<()>().await;
        }

        let next = self.next_tick;
        let dur = self.tick_duration;
        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;
        self.tick_start = Some(Instant::now());

        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > dur / 10;
        let mut ticks_skipped = 0u64;

        self.next_tick = match self.config.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped = (late_by.as_nanos() / dur.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "primary context fell behind; skipping ahead"
                        );
                    }
                }
                now + dur
            }
            TickPolicy::Drop => next + dur,
        };

        if overrun {
            self.stats.total_overruns += 1;
        }
        self.stats.total_skipped += ticks_skipped;
        self.stats.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: dur,
            overrun,
            ticks_skipped,
        }
    }

    /// Marks the end of the current tick's work for budget reporting.
    /// A no-op if no tick is in progress.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();
        if elapsed > self.stats.max_tick_time {
            self.stats.max_tick_time = elapsed;
        }

        let utilization = elapsed.as_secs_f64() / self.tick_duration.as_secs_f64();
        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick work approaching budget"
            );
        }
    }

    /// Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "tick clock paused");
        }
    }

    /// Resets the next deadline to one tick from now, so time spent paused
    /// doesn't count as overrun.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.next_tick = TokioInstant::now() + self.tick_duration;
            debug!(tick = self.tick_count, "tick clock resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }
}
