//! Scheduling contexts for Nickforge.
//!
//! The host runs one **primary context**: a single-threaded game loop that
//! advances in fixed ticks. Anything that touches live client state (sending
//! a respawn, hiding a player from another client) must run there. Slow work
//! (skin lookups over the network) runs on **worker contexts** instead.
//!
//! This crate provides:
//!
//! - [`Scheduler`]: the trait the overlay core submits tasks through.
//! - [`TaskQueue`]: a tick-indexed queue implementing [`Scheduler`]. Hosts
//!   that already own a game loop call [`TaskQueue::advance`] once per tick.
//! - [`TickLoop`]: a self-contained Tokio driver: a [`TickClock`] feeding a
//!   [`TaskQueue`], running primary tasks inline and worker tasks on the
//!   blocking pool.
//!
//! # Delay semantics
//!
//! Delays are in ticks and never shorter than one: a task submitted during
//! tick `t` with delay `d` runs during tick `t + max(d, 1)`. Tasks due on the
//! same tick run in submission order.

mod clock;
mod driver;
mod queue;

pub use clock::{TickClock, TickConfig, TickInfo, TickPolicy, TickStats};
pub use driver::TickLoop;
pub use queue::{DueTasks, ExecutionContext, ScheduledTask, Scheduler, Task, TaskQueue};
