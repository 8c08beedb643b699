//! The host-protocol seam.
//!
//! Host games change how difficulty, world type, and game mode are
//! represented between versions. Rather than looking those up dynamically
//! all over the refresh code, every lookup goes through one typed call:
//! [`ProtocolAdapter::resolve`]. Packet construction lives behind the same
//! trait so the refresh protocol only ever sees finished [`Packet`]s.

use crate::{
    Codec, GameMode, GameProfile, LogicalId, NativeHandle, Packet, PacketKind,
    PlayerInfoAction, PlayerInfoMessage, ProtocolError, RespawnMessage,
    WorldType,
};

/// Builds host packets and maps logical ids to native values.
///
/// The refresh protocol holds one `Arc<dyn ProtocolAdapter>` and builds
/// every self-update from it: two [`player_info`](Self::player_info)
/// packets (remove, then add) and one [`respawn`](Self::respawn) packet
/// whose arguments come from [`resolve`](Self::resolve).
///
/// All three packets are built before the first one is sent. If any call
/// here fails, nothing reaches the client and the refresh falls back to
/// the visibility toggle, so an adapter may refuse anything it can't
/// express for the running host version.
///
/// ## Trait bounds
///
/// `Send + Sync + 'static` because the adapter is shared through an `Arc`
/// between the calling context and the tasks the refresh schedules.
///
/// ## Implementing
///
/// [`CodecAdapter`] covers hosts whose native values match the logical
/// ids. A host that renumbers game modes between versions implements
/// `resolve` with its own table and can keep `CodecAdapter`'s packet
/// building by delegating to it.
pub trait ProtocolAdapter: Send + Sync + 'static {
    /// Maps a logical id to the host's representation.
    ///
    /// # Errors
    /// [`ProtocolError::Unresolved`] if the host has no such value.
    fn resolve(&self, id: LogicalId) -> Result<NativeHandle, ProtocolError>;

    /// Builds a player-info packet for `profile`.
    ///
    /// `RemovePlayer` and `AddPlayer` are built from the same profile and
    /// display name; the client matches them by profile id.
    ///
    /// # Errors
    /// Whatever the underlying codec reports, typically
    /// [`ProtocolError::Encode`].
    fn player_info(
        &self,
        action: PlayerInfoAction,
        profile: &GameProfile,
        game_mode: GameMode,
        display_name: &str,
    ) -> Result<Packet, ProtocolError>;

    /// Builds a forced-respawn packet into the player's current dimension.
    ///
    /// The arguments are native values already produced by
    /// [`resolve`](Self::resolve).
    ///
    /// # Errors
    /// Whatever the underlying codec reports.
    fn respawn(
        &self,
        difficulty: NativeHandle,
        world_type: NativeHandle,
        game_mode: NativeHandle,
    ) -> Result<Packet, ProtocolError>;
}

/// Default adapter: identity mapping for known ids, bodies encoded with `C`.
#[derive(Debug, Clone, Default)]
pub struct CodecAdapter<C: Codec> {
    codec: C,
}

impl<C: Codec> CodecAdapter<C> {
    pub fn new(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<C: Codec> ProtocolAdapter for CodecAdapter<C> {
    fn resolve(&self, id: LogicalId) -> Result<NativeHandle, ProtocolError> {
        let (raw, known) = match id {
            LogicalId::Difficulty(v) | LogicalId::GameMode(v) => (v, v <= 3),
            LogicalId::WorldType(slot) => (slot, (slot as usize) < WorldType::ALL.len()),
        };
        if known {
            Ok(NativeHandle(i32::from(raw)))
        } else {
            Err(ProtocolError::Unresolved(id))
        }
    }

    fn player_info(
        &self,
        action: PlayerInfoAction,
        profile: &GameProfile,
        game_mode: GameMode,
        display_name: &str,
    ) -> Result<Packet, ProtocolError> {
        let kind = match action {
            PlayerInfoAction::AddPlayer => PacketKind::AddIdentity,
            PlayerInfoAction::RemovePlayer => PacketKind::RemoveIdentity,
        };
        let body = self.codec.encode(&PlayerInfoMessage {
            action: action.code(),
            profile: profile.clone(),
            latency: 0,
            game_mode: game_mode.id(),
            display_name: display_name.to_string(),
        })?;
        Ok(Packet::new(kind, body))
    }

    fn respawn(
        &self,
        difficulty: NativeHandle,
        world_type: NativeHandle,
        game_mode: NativeHandle,
    ) -> Result<Packet, ProtocolError> {
        let body = self.codec.encode(&RespawnMessage {
            dimension: 0,
            difficulty,
            world_type,
            game_mode,
        })?;
        Ok(Packet::new(PacketKind::Respawn, body))
    }
}
