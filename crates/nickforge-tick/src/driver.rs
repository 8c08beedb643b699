//! Tokio driver for the primary context.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::{ExecutionContext, ScheduledTask, TaskQueue, TickClock, TickConfig};

/// Owns the primary context: fires ticks from a [`TickClock`] and runs the
/// [`TaskQueue`] on each one.
///
/// Primary tasks run inline on the loop's own task, one after another.
/// Worker tasks are handed to `tokio::task::spawn_blocking`. A task that
/// panics is logged and dropped; the loop keeps going.
pub struct TickLoop {
    queue: Arc<TaskQueue>,
    clock: TickClock,
}

impl TickLoop {
    pub fn new(config: TickConfig) -> Self {
        Self {
            queue: Arc::new(TaskQueue::new()),
            clock: TickClock::new(config),
        }
    }

    /// Handle to submit work with. Clone it into every component that
    /// schedules tasks.
    pub fn scheduler(&self) -> Arc<TaskQueue> {
        Arc::clone(&self.queue)
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Runs ticks until `shutdown` completes. Work still queued at that
    /// point is dropped.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(rate_hz = self.clock.tick_rate_hz(), "primary tick loop running");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = self.clock.wait_for_tick() => {
                    self.run_due();
                    self.clock.record_tick_end();
                }
            }
        }

        tracing::info!(
            ticks = self.clock.tick_count(),
            dropped = self.queue.pending(),
            "primary tick loop stopped"
        );
    }

    fn run_due(&self) {
        let due = self.queue.advance();
        for task in due.primary {
            run_guarded(task);
        }
        for task in due.worker {
            tokio::task::spawn_blocking(move || run_guarded(task));
        }
    }
}

fn run_guarded(task: ScheduledTask) {
    let context: ExecutionContext = task.context;
    let due_tick = task.due_tick;
    if panic::catch_unwind(AssertUnwindSafe(|| task.run())).is_err() {
        tracing::error!(%context, due_tick, "scheduled task panicked");
    }
}
