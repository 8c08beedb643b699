//! Overlay manager configuration.

use serde::{Deserialize, Serialize};

use crate::OverlayError;

/// Longest nick a client will render, in UTF-16 code units.
pub const MAX_NICK_LENGTH: usize = 16;

/// Tunables for the overlay manager. Every field has a default, so a
/// partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Default value of the self flag on refresh notifications: whether the
    /// affected player's own client is resynchronized too.
    pub self_update: bool,

    /// Ticks between sending "remove identity" and the respawn sequence.
    pub self_update_delay_ticks: u64,

    /// Ticks between `set_skin` and the worker-side skin lookup.
    pub skin_resolve_delay_ticks: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            self_update: true,
            self_update_delay_ticks: 1,
            skin_resolve_delay_ticks: 2,
        }
    }
}

impl OverlayConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, OverlayError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Raises zero delays to one tick. The respawn must never run in the
    /// same tick as the remove that precedes it.
    pub fn validated(mut self) -> Self {
        if self.self_update_delay_ticks == 0 {
            tracing::warn!("self_update_delay_ticks of 0 raised to 1");
            self.self_update_delay_ticks = 1;
        }
        if self.skin_resolve_delay_ticks == 0 {
            tracing::warn!("skin_resolve_delay_ticks of 0 raised to 1");
            self.skin_resolve_delay_ticks = 1;
        }
        self
    }
}
