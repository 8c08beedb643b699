//! Pre-refresh notifications.
//!
//! Every refresh passes through two checkpoints where outside policy may
//! step in:
//!
//! 1. [`RefreshEvent`]: before anything happens. A hook may cancel the whole
//!    refresh or flip whether the player's own client is updated.
//! 2. [`SelfUpdateEvent`]: before the self-update packets are built. A hook
//!    may cancel just the self-update, or amend the name, profile,
//!    difficulty, or game mode that goes into the packets.
//!
//! Hooks don't mutate the event in place. Each one sees the event as it
//! stands and answers with a [`Response`]; the chain folds those answers.
//! The first `Cancel` wins. Hooks after it still see the event (with
//! `cancelled = true`) but their answers are ignored.

use std::sync::{Arc, PoisonError, RwLock};

use nickforge_protocol::{Difficulty, GameMode, GameProfile, PlayerKey};

/// A refresh is about to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshEvent {
    pub player: PlayerKey,
    /// Whether the player's own client gets the self-update sequence.
    pub self_update: bool,
}

/// A self-update is about to be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfUpdateEvent {
    pub player: PlayerKey,
    /// Nick if the player has one, otherwise their player-list name.
    pub display_name: String,
    pub profile: GameProfile,
    pub difficulty: Difficulty,
    pub game_mode: GameMode,
}

/// What a hook sees.
#[derive(Debug, Clone, Copy)]
pub struct Notice<'a, E> {
    pub event: &'a E,
    /// Set once an earlier hook has cancelled.
    pub cancelled: bool,
}

/// A hook's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response<E> {
    Proceed,
    /// Continue with this event instead.
    Amend(E),
    Cancel,
}

/// The folded outcome of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<E> {
    Proceed(E),
    Cancelled,
}

/// Policy hook consulted before each refresh. Both methods default to
/// `Proceed`, so implement only the checkpoint you care about.
pub trait RefreshHook: Send + Sync + 'static {
    fn on_refresh(&self, _notice: Notice<'_, RefreshEvent>) -> Response<RefreshEvent> {
        Response::Proceed
    }

    fn on_self_update(&self, _notice: Notice<'_, SelfUpdateEvent>) -> Response<SelfUpdateEvent> {
        Response::Proceed
    }
}

/// Ordered list of hooks, called synchronously in registration order.
#[derive(Default)]
pub struct HookChain {
    hooks: RwLock<Vec<Arc<dyn RefreshHook>>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, hook: Arc<dyn RefreshHook>) {
        self.hooks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dispatch_refresh(&self, event: RefreshEvent) -> Dispatch<RefreshEvent> {
        self.dispatch(event, |hook, notice| hook.on_refresh(notice))
    }

    pub fn dispatch_self_update(&self, event: SelfUpdateEvent) -> Dispatch<SelfUpdateEvent> {
        self.dispatch(event, |hook, notice| hook.on_self_update(notice))
    }

    fn dispatch<E>(
        &self,
        mut event: E,
        call: impl Fn(&dyn RefreshHook, Notice<'_, E>) -> Response<E>,
    ) -> Dispatch<E> {
        // Snapshot so a hook can register another hook without deadlocking.
        let hooks: Vec<_> = self
            .hooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let mut cancelled = false;
        for hook in &hooks {
            let response = call(
                hook.as_ref(),
                Notice {
                    event: &event,
                    cancelled,
                },
            );
            if cancelled {
                continue;
            }
            match response {
                Response::Proceed => {}
                Response::Amend(amended) => event = amended,
                Response::Cancel => cancelled = true,
            }
        }

        if cancelled {
            Dispatch::Cancelled
        } else {
            Dispatch::Proceed(event)
        }
    }
}
