//! Tick-indexed task queue.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Where a task must run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionContext {
    /// The host's main tick loop. Required for anything touching live
    /// client or session state.
    Primary,
    /// Any thread off the main loop. For blocking work.
    Worker,
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Worker => f.write_str("worker"),
        }
    }
}

/// Submits work to the primary and worker contexts.
///
/// Everything the overlay core defers goes through this trait: the
/// visibility toggle, the respawn half of a self-update, and skin
/// resolution. The core holds it as `Arc<dyn Scheduler>` and tasks capture
/// clones of that `Arc` to schedule follow-up work from any thread, hence
/// `Send + Sync + 'static`.
///
/// ## Timing
///
/// Delays are in ticks and are never shorter than one tick: a delay of 0
/// means "next tick", not "now". Nothing submitted here ever runs inside
/// the call that submitted it, which is what lets a caller finish its own
/// packet sends before the scheduled ones start.
///
/// Tasks due on the same tick in the same context run in submission order.
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use nickforge_tick::{Scheduler, TaskQueue};
///
/// let queue = TaskQueue::new();
/// let ran = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&ran);
/// queue.run_task(Box::new(move || flag.store(true, Ordering::SeqCst)));
///
/// assert!(!ran.load(Ordering::SeqCst));
/// assert_eq!(queue.tick_inline(), 1);
/// assert!(ran.load(Ordering::SeqCst));
/// ```
///
/// ## Implementing
///
/// Only [`schedule`](Self::schedule) is required; the helpers are the
/// three shapes the core actually uses. [`TaskQueue`] is the in-process
/// implementation, driven by [`TickLoop`](crate::TickLoop) in production
/// and by hand in tests.
pub trait Scheduler: Send + Sync + 'static {
    /// Queues `task` for `context`, due `delay_ticks` (at least one) from
    /// the current tick.
    fn schedule(&self, context: ExecutionContext, delay_ticks: u64, task: Task);

    /// Runs `task` on the primary context during the next tick.
    fn run_task(&self, task: Task) {
        self.schedule(ExecutionContext::Primary, 0, task);
    }

    /// Runs `task` on the primary context after `delay_ticks`.
    fn run_task_later(&self, delay_ticks: u64, task: Task) {
        self.schedule(ExecutionContext::Primary, delay_ticks, task);
    }

    /// Runs `task` on a worker context after `delay_ticks`.
    fn run_task_later_async(&self, delay_ticks: u64, task: Task) {
        self.schedule(ExecutionContext::Worker, delay_ticks, task);
    }
}

/// A task taken off the queue, ready to run.
pub struct ScheduledTask {
    pub context: ExecutionContext,
    pub due_tick: u64,
    task: Task,
}

impl ScheduledTask {
    pub fn run(self) {
        (self.task)();
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("context", &self.context)
            .field("due_tick", &self.due_tick)
            .finish_non_exhaustive()
    }
}

/// Everything that came due on one tick, split by context, each list in
/// submission order.
#[derive(Debug, Default)]
pub struct DueTasks {
    pub tick: u64,
    pub primary: Vec<ScheduledTask>,
    pub worker: Vec<ScheduledTask>,
}

impl DueTasks {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.worker.is_empty()
    }
}

#[derive(Default)]
struct QueueInner {
    current_tick: u64,
    pending: BTreeMap<u64, Vec<ScheduledTask>>,
}

/// A queue of tasks keyed by the tick they are due on.
///
/// The queue never runs anything by itself: whoever owns the primary loop
/// calls [`advance`](Self::advance) once per tick and runs what comes back.
/// The internal lock is released before tasks are handed out, so a running
/// task may schedule more work.
#[derive(Default)]
pub struct TaskQueue {
    inner: Mutex<QueueInner>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of the last tick that was advanced to (0 before the first).
    pub fn current_tick(&self) -> u64 {
        self.lock().current_tick
    }

    /// Number of tasks waiting to come due.
    pub fn pending(&self) -> usize {
        self.lock().pending.values().map(Vec::len).sum()
    }

    /// Moves to the next tick and takes every task now due.
    pub fn advance(&self) -> DueTasks {
        let mut inner = self.lock();
        inner.current_tick += 1;
        let tick = inner.current_tick;

        // Everything at or before `tick`; later ticks stay queued.
        let later = inner.pending.split_off(&(tick + 1));
        let due = std::mem::replace(&mut inner.pending, later);
        drop(inner);

        let mut out = DueTasks {
            tick,
            ..DueTasks::default()
        };
        for task in due.into_values().flatten() {
            match task.context {
                ExecutionContext::Primary => out.primary.push(task),
                ExecutionContext::Worker => out.worker.push(task),
            }
        }
        if !out.is_empty() {
            tracing::trace!(
                tick,
                primary = out.primary.len(),
                worker = out.worker.len(),
                "tasks due"
            );
        }
        out
    }

    /// Advances one tick and runs everything due on the calling thread,
    /// primary tasks first. Returns how many tasks ran.
    ///
    /// For hosts without a Tokio runtime, and for deterministic tests.
    pub fn tick_inline(&self) -> usize {
        let due = self.advance();
        let count = due.primary.len() + due.worker.len();
        for task in due.primary.into_iter().chain(due.worker) {
            task.run();
        }
        count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, context: ExecutionContext, delay_ticks: u64, task: Task) {
        let mut inner = self.lock();
        let due_tick = inner.current_tick + delay_ticks.max(1);
        inner.pending.entry(due_tick).or_default().push(ScheduledTask {
            context,
            due_tick,
            task,
        });
        tracing::trace!(%context, due_tick, "task scheduled");
    }
}
