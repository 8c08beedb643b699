//! The refresh protocol: making clients re-render a player.
//!
//! One call to [`RefreshProtocol::refresh`] walks this state machine:
//!
//! ```text
//! Requested ──(offline)──────────────────────────────→ Done
//!     │
//!     ▼
//! PolicyCheck ──(cancelled)──────────────────────────→ Done
//!     │
//!     ├──(self flag)──→ SelfUpdate ──(cancelled/failed)─┐
//!     │                    │                           │
//!     │                    ▼ scheduled                 │
//!     ▼                                                ▼
//! VisibilityToggle (next primary tick) ──────────────→ Done
//! ```
//!
//! Two paths resynchronize clients:
//!
//! - **Self-update**: the player's own client. "Remove identity" goes out
//!   immediately on the calling context. After `self_update_delay_ticks` on
//!   the primary context: capture session state, send the forced respawn,
//!   restore session state, send "add identity". Strictly in that order;
//!   an "add" that overtakes the respawn desyncs the client.
//! - **Visibility toggle**: everyone else. On the primary context, every
//!   observer that can see the player hides and then shows them again. The
//!   observer set is taken once, before the first hide.
//!
//! Nothing here is debounced: each call replays the whole protocol. Failures
//! while building or sending self-update packets are logged and downgrade
//! the refresh to visibility-toggle only.

use std::sync::Arc;

use nickforge_protocol::{
    GameProfile, LogicalId, Packet, PlayerInfoAction, PlayerKey, ProtocolAdapter, ProtocolError,
};
use nickforge_tick::Scheduler;
use tracing::{debug, trace, warn};

use crate::hooks::{Dispatch, HookChain, RefreshEvent, SelfUpdateEvent};
use crate::{OverlayConfig, PacketSender, PlayerDirectory, RefreshSession};

/// The name and profile a player's client should show for itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayIdentity {
    pub display_name: String,
    pub profile: GameProfile,
}

/// How a refresh call ended, as far as the calling context can tell.
/// Scheduled work is reported as scheduled, not as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Target not online; nothing happened.
    Offline,
    /// A hook cancelled at the policy check; nothing happened.
    Cancelled,
    /// The visibility toggle was scheduled.
    Dispatched { self_update: SelfUpdateOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfUpdateOutcome {
    /// The self flag was off.
    NotRequested,
    /// Target went offline before the self-update could start.
    Offline,
    /// A hook cancelled the self-update.
    Cancelled,
    /// Packets could not be built or the remove could not be sent.
    Failed,
    /// "Remove" sent; respawn and "add" scheduled.
    Scheduled,
}

struct SelfUpdatePackets {
    remove: Packet,
    respawn: Packet,
    add: Packet,
}

/// Orchestrates self-updates and visibility toggles.
///
/// Cheap to clone: every field is shared.
#[derive(Clone)]
pub struct RefreshProtocol {
    directory: Arc<dyn PlayerDirectory>,
    sender: Arc<dyn PacketSender>,
    adapter: Arc<dyn ProtocolAdapter>,
    scheduler: Arc<dyn Scheduler>,
    hooks: Arc<HookChain>,
    self_update_default: bool,
    self_update_delay_ticks: u64,
}

impl RefreshProtocol {
    pub fn new(
        directory: Arc<dyn PlayerDirectory>,
        sender: Arc<dyn PacketSender>,
        adapter: Arc<dyn ProtocolAdapter>,
        scheduler: Arc<dyn Scheduler>,
        hooks: Arc<HookChain>,
        config: &OverlayConfig,
    ) -> Self {
        Self {
            directory,
            sender,
            adapter,
            scheduler,
            hooks,
            self_update_default: config.self_update,
            self_update_delay_ticks: config.self_update_delay_ticks.max(1),
        }
    }

    /// Runs one refresh for `player`. `identity` is asked for the player's
    /// display identity only if a self-update is actually attempted.
    pub fn refresh(
        &self,
        player: PlayerKey,
        identity: impl FnOnce(PlayerKey) -> Option<DisplayIdentity>,
    ) -> RefreshOutcome {
        if !self.directory.is_online(player) {
            trace!(%player, "refresh skipped: player offline");
            return RefreshOutcome::Offline;
        }

        let event = RefreshEvent {
            player,
            self_update: self.self_update_default,
        };
        let event = match self.hooks.dispatch_refresh(event) {
            Dispatch::Proceed(event) => event,
            Dispatch::Cancelled => {
                debug!(%player, "refresh cancelled by hook");
                return RefreshOutcome::Cancelled;
            }
        };

        let self_update = if event.self_update {
            self.update_self(player, identity)
        } else {
            SelfUpdateOutcome::NotRequested
        };

        self.schedule_visibility_toggle(player);
        debug!(%player, ?self_update, "refresh dispatched");
        RefreshOutcome::Dispatched { self_update }
    }

    fn update_self(
        &self,
        player: PlayerKey,
        identity: impl FnOnce(PlayerKey) -> Option<DisplayIdentity>,
    ) -> SelfUpdateOutcome {
        let settings = identity(player).and_then(|id| {
            Some((
                id,
                self.directory.difficulty(player)?,
                self.directory.game_mode(player)?,
            ))
        });
        let Some((identity, difficulty, game_mode)) = settings else {
            return SelfUpdateOutcome::Offline;
        };

        let event = SelfUpdateEvent {
            player,
            display_name: identity.display_name,
            profile: identity.profile,
            difficulty,
            game_mode,
        };
        let event = match self.hooks.dispatch_self_update(event) {
            Dispatch::Proceed(event) => event,
            Dispatch::Cancelled => {
                debug!(%player, "self-update cancelled by hook");
                return SelfUpdateOutcome::Cancelled;
            }
        };

        let result = self.build_packets(&event).and_then(|packets| {
            self.sender.send_packet(player, packets.remove.clone())?;
            Ok(packets)
        });
        match result {
            Ok(packets) => {
                self.schedule_respawn(player, packets);
                SelfUpdateOutcome::Scheduled
            }
            Err(e) => {
                warn!(%player, error = %e, "self-update failed; falling back to visibility toggle");
                SelfUpdateOutcome::Failed
            }
        }
    }

    fn build_packets(&self, event: &SelfUpdateEvent) -> Result<SelfUpdatePackets, ProtocolError> {
        let adapter = self.adapter.as_ref();
        let remove = adapter.player_info(
            PlayerInfoAction::RemovePlayer,
            &event.profile,
            event.game_mode,
            &event.display_name,
        )?;
        let add = adapter.player_info(
            PlayerInfoAction::AddPlayer,
            &event.profile,
            event.game_mode,
            &event.display_name,
        )?;

        let difficulty = adapter.resolve(LogicalId::Difficulty(event.difficulty.id()))?;
        // Respawning into the first registered world type.
        let world_type = adapter.resolve(LogicalId::WorldType(0))?;
        let game_mode = adapter.resolve(LogicalId::GameMode(event.game_mode.id()))?;
        let respawn = adapter.respawn(difficulty, world_type, game_mode)?;

        Ok(SelfUpdatePackets {
            remove,
            respawn,
            add,
        })
    }

    fn schedule_respawn(&self, player: PlayerKey, packets: SelfUpdatePackets) {
        let directory = Arc::clone(&self.directory);
        let sender = Arc::clone(&self.sender);

        self.scheduler.run_task_later(
            self.self_update_delay_ticks,
            Box::new(move || {
                if !directory.is_online(player) {
                    debug!(%player, "player left before respawn; self-update abandoned");
                    return;
                }
                let Some(session) = RefreshSession::capture(directory.as_ref(), player) else {
                    debug!(%player, "session unavailable; self-update abandoned");
                    return;
                };

                if let Err(e) = sender.send_packet(player, packets.respawn) {
                    warn!(%player, error = %e, "respawn packet failed");
                }
                session.restore(directory.as_ref(), player);
                if let Err(e) = sender.send_packet(player, packets.add) {
                    warn!(%player, error = %e, "add-identity packet failed");
                }
                debug!(%player, "self-update complete");
            }),
        );
    }

    fn schedule_visibility_toggle(&self, target: PlayerKey) {
        let directory = Arc::clone(&self.directory);
        self.scheduler.run_task(Box::new(move || {
            toggle_visibility(directory.as_ref(), target);
        }));
    }
}

/// Hides `target` from every observer that can currently see them, then
/// shows them again. Returns the number of observers toggled.
pub(crate) fn toggle_visibility(directory: &dyn PlayerDirectory, target: PlayerKey) -> usize {
    if !directory.is_online(target) {
        return 0;
    }

    let observers: Vec<PlayerKey> = directory
        .online_players()
        .into_iter()
        .filter(|&observer| observer != target && directory.can_see(observer, target))
        .collect();

    for &observer in &observers {
        directory.hide_player(observer, target);
    }
    for &observer in &observers {
        directory.show_player(observer, target);
    }

    trace!(%target, observers = observers.len(), "visibility toggled");
    observers.len()
}
