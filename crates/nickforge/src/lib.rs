//! # Nickforge
//!
//! Nick and skin overlays for game servers.
//!
//! A player can appear to every client, their own included, under a
//! different name and skin while keeping their real identity. Nickforge
//! keeps track of who wears what and resynchronizes clients whenever that
//! changes.
//!
//! ## Layers
//!
//! - **Stores** ([`nickforge_store`]) hold the overlays: one
//!   [`OverlayStore`] per overlay kind, plus the shared [`SkinRegistry`] of
//!   resolved skins.
//! - **[`IdentityOverlayManager`]** validates and applies mutations, then
//!   refreshes the affected player.
//! - **[`RefreshProtocol`]** does the resynchronizing: a self-update for the
//!   player's own client (remove, respawn, add) and a visibility toggle for
//!   everyone else.
//!
//! The host plugs in through [`PlayerDirectory`], [`PacketSender`],
//! [`SkinResolver`], and a [`Scheduler`](nickforge_tick::Scheduler).
//! Policy plugs in through [`RefreshHook`]s.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nickforge::prelude::*;
//!
//! let tick_loop = TickLoop::new(TickConfig::default());
//! let manager = IdentityOverlayManager::builder()
//!     .directory(host.clone())
//!     .sender(host.clone())
//!     .scheduler(tick_loop.scheduler())
//!     .build()?;
//!
//! manager.set_nick(player, "Grumm")?;
//! tick_loop.run_until(shutdown).await;
//! ```

pub mod config;
pub mod error;
pub mod hooks;
pub mod host;
pub mod manager;
pub mod refresh;
pub mod session;
pub mod skin;
pub mod telemetry;

pub use config::{MAX_NICK_LENGTH, OverlayConfig};
pub use error::OverlayError;
pub use hooks::{
    Dispatch, HookChain, Notice, RefreshEvent, RefreshHook, Response, SelfUpdateEvent,
};
pub use host::{Location, PacketSender, PlayerDirectory};
pub use manager::{IdentityOverlayManager, IdentityOverlayManagerBuilder};
pub use refresh::{DisplayIdentity, RefreshOutcome, RefreshProtocol, SelfUpdateOutcome};
pub use session::RefreshSession;
pub use skin::{ResolveError, SkinResolver, UnconfiguredResolver};
pub use telemetry::init_tracing;

pub use nickforge_protocol::{GameProfile, PlayerKey, ProfileProperty};
pub use nickforge_store::{
    DataProvider, MemoryProvider, OverlayStore, SkinRegistry, StoreError, TemporaryProvider,
    VisualIdentityRecord,
};

/// Convenience re-exports for hosts.
pub mod prelude {
    pub use crate::{
        HookChain, IdentityOverlayManager, Location, Notice, OverlayConfig, OverlayError,
        PacketSender, PlayerDirectory, RefreshEvent, RefreshHook, Response, SelfUpdateEvent,
        SkinResolver,
    };
    pub use nickforge_protocol::{
        Difficulty, GameMode, GameProfile, Packet, PlayerKey, ProfileProperty, ProtocolError,
    };
    pub use nickforge_tick::{Scheduler, TaskQueue, TickConfig, TickLoop};
}
