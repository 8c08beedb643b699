//! Overlay state storage for Nickforge.
//!
//! Two kinds of state live here:
//!
//! 1. **Per-player overlays** ([`OverlayStore`]): which nick or skin
//!    reference a player currently wears, keyed by [`PlayerKey`].
//! 2. **Loaded skins** ([`SkinRegistry`]): resolved skin profiles keyed by
//!    an arbitrary string, shared by every player that references them.
//!
//! Both sit on top of a pluggable [`DataProvider`], a string-keyed
//! concurrent map that can be swapped at runtime (e.g., for a provider
//! backed by a shared cache).
//!
//! # How it fits in the stack
//!
//! ```text
//! Overlay manager (above)  ← mutates overlays, dereferences skins
//!     ↕
//! Store layer (this crate)  ← typed keys over swappable providers
//!     ↕
//! Protocol layer (below)  ← provides PlayerKey, GameProfile
//! ```
//!
//! [`PlayerKey`]: nickforge_protocol::PlayerKey

mod error;
mod provider;
mod registry;
mod store;

pub use error::StoreError;
pub use provider::{DataProvider, MemoryProvider, TemporaryProvider};
pub use registry::{SkinRegistry, VisualIdentityRecord};
pub use store::OverlayStore;
