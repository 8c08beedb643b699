//! Identity and packet vocabulary for Nickforge.
//!
//! This crate defines what the overlay core says to the host game:
//!
//! - **Types** ([`PlayerKey`], [`GameProfile`], [`Packet`], etc.): player
//!   identity and the messages that resynchronize a client's view of it.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how message bodies are
//!   turned into bytes.
//! - **Adapter** ([`ProtocolAdapter`], [`CodecAdapter`]): the single seam
//!   where logical ids (difficulty, world type, game mode) are mapped to
//!   whatever the host protocol version expects.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Overlay manager (above) → Protocol (Packet) → Packet sender (host, below)
//! ```
//!
//! The core never inspects packet bytes. It only cares about the
//! [`PacketKind`] and the order packets are handed to the sender.

mod adapter;
mod codec;
mod error;
mod types;

pub use adapter::{CodecAdapter, ProtocolAdapter};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Difficulty, GameMode, GameProfile, LogicalId, NativeHandle, OverlayKind,
    Packet, PacketKind, PlayerInfoAction, PlayerInfoMessage, PlayerKey,
    ProfileProperty, RespawnMessage, WorldType,
};
