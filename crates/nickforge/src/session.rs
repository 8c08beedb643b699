//! Session state carried across a forced respawn.

use nickforge_protocol::PlayerKey;

use crate::{Location, PlayerDirectory};

/// What a respawn would otherwise reset: flight, position, and experience.
///
/// Captured right before the respawn packet and put back right after it.
/// Lives for one self-update only.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSession {
    pub flying: bool,
    pub location: Location,
    pub level: u32,
    pub exp: f32,
}

impl RefreshSession {
    /// Snapshots `player`. `None` if they went offline.
    pub fn capture(directory: &dyn PlayerDirectory, player: PlayerKey) -> Option<Self> {
        Some(Self {
            flying: directory.is_flying(player)?,
            location: directory.location(player)?,
            level: directory.level(player)?,
            exp: directory.exp(player)?,
        })
    }

    /// Puts the snapshot back and resends the inventory.
    pub fn restore(&self, directory: &dyn PlayerDirectory, player: PlayerKey) {
        directory.set_flying(player, self.flying);
        directory.teleport(player, &self.location);
        directory.update_inventory(player);
        directory.set_level(player, self.level);
        directory.set_exp(player, self.exp);
    }
}
