//! Host collaborators: the player directory and the packet sender.
//!
//! The overlay core owns no players and speaks no wire format. Everything
//! it knows about who is online, who can see whom, and what state a
//! player's session is in comes through [`PlayerDirectory`]; everything it
//! says to a client goes through [`PacketSender`].
//!
//! Accessors return `None` when the player is not online. Mutators on an
//! offline player are expected to be silent no-ops.

use nickforge_protocol::{Difficulty, GameMode, GameProfile, Packet, PlayerKey, ProtocolError};
use serde::{Deserialize, Serialize};

/// A position in a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
            yaw: 0.0,
            pitch: 0.0,
        }
    }
}

/// Read and write access to online players.
pub trait PlayerDirectory: Send + Sync + 'static {
    fn is_online(&self, player: PlayerKey) -> bool;

    /// Every online player, in any order.
    fn online_players(&self) -> Vec<PlayerKey>;

    /// The player's real account name.
    fn name(&self, player: PlayerKey) -> Option<String>;

    /// The name currently shown in the player list.
    fn list_name(&self, player: PlayerKey) -> Option<String>;

    /// The player's real profile, without overlays.
    fn profile(&self, player: PlayerKey) -> Option<GameProfile>;

    /// Difficulty of the world the player is in.
    fn difficulty(&self, player: PlayerKey) -> Option<Difficulty>;

    fn game_mode(&self, player: PlayerKey) -> Option<GameMode>;

    /// Whether `observer`'s client currently renders `target`.
    fn can_see(&self, observer: PlayerKey, target: PlayerKey) -> bool;

    /// Primary context only.
    fn hide_player(&self, observer: PlayerKey, target: PlayerKey);

    /// Primary context only.
    fn show_player(&self, observer: PlayerKey, target: PlayerKey);

    fn is_flying(&self, player: PlayerKey) -> Option<bool>;
    fn set_flying(&self, player: PlayerKey, flying: bool);

    fn location(&self, player: PlayerKey) -> Option<Location>;
    fn teleport(&self, player: PlayerKey, location: &Location);

    fn level(&self, player: PlayerKey) -> Option<u32>;
    fn set_level(&self, player: PlayerKey, level: u32);

    /// Progress towards the next level, 0.0–1.0.
    fn exp(&self, player: PlayerKey) -> Option<f32>;
    fn set_exp(&self, player: PlayerKey, exp: f32);

    /// Resends the player's inventory to their client.
    fn update_inventory(&self, player: PlayerKey);
}

/// Delivers packets to one player's client.
///
/// Fire-and-forget, but order-preserving per target: two packets sent to
/// the same player arrive in the order they were sent.
pub trait PacketSender: Send + Sync + 'static {
    fn send_packet(&self, target: PlayerKey, packet: Packet) -> Result<(), ProtocolError>;
}
