use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use nickforge::prelude::*;
use serde_json::json;

// ---------------------------------------------------------------------------
// In-memory host
// ---------------------------------------------------------------------------

struct Player {
    name: String,
    flying: bool,
    location: Location,
    level: u32,
    exp: f32,
}

#[derive(Default)]
struct Host {
    players: Mutex<HashMap<PlayerKey, Player>>,
}

impl Host {
    fn join(&self, name: &str) -> PlayerKey {
        let key = PlayerKey::new_v4();
        self.lock().insert(
            key,
            Player {
                name: name.into(),
                flying: false,
                location: Location::new("world", 0.0, 64.0, 0.0),
                level: 0,
                exp: 0.0,
            },
        );
        key
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PlayerKey, Player>> {
        self.players.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with<T>(&self, key: PlayerKey, f: impl FnOnce(&mut Player) -> T) -> Option<T> {
        self.lock().get_mut(&key).map(f)
    }
}

impl PlayerDirectory for Host {
    fn is_online(&self, player: PlayerKey) -> bool {
        self.lock().contains_key(&player)
    }
    fn online_players(&self) -> Vec<PlayerKey> {
        self.lock().keys().copied().collect()
    }
    fn name(&self, player: PlayerKey) -> Option<String> {
        self.with(player, |p| p.name.clone())
    }
    fn list_name(&self, player: PlayerKey) -> Option<String> {
        self.name(player)
    }
    fn profile(&self, player: PlayerKey) -> Option<GameProfile> {
        self.with(player, |p| GameProfile::new(player, p.name.clone()))
    }
    fn difficulty(&self, player: PlayerKey) -> Option<Difficulty> {
        self.is_online(player).then_some(Difficulty::Normal)
    }
    fn game_mode(&self, player: PlayerKey) -> Option<GameMode> {
        self.is_online(player).then_some(GameMode::Survival)
    }
    fn can_see(&self, observer: PlayerKey, target: PlayerKey) -> bool {
        self.is_online(observer) && self.is_online(target)
    }
    fn hide_player(&self, observer: PlayerKey, target: PlayerKey) {
        tracing::info!(%observer, %target, "hide");
    }
    fn show_player(&self, observer: PlayerKey, target: PlayerKey) {
        tracing::info!(%observer, %target, "show");
    }
    fn is_flying(&self, player: PlayerKey) -> Option<bool> {
        self.with(player, |p| p.flying)
    }
    fn set_flying(&self, player: PlayerKey, flying: bool) {
        self.with(player, |p| p.flying = flying);
    }
    fn location(&self, player: PlayerKey) -> Option<Location> {
        self.with(player, |p| p.location.clone())
    }
    fn teleport(&self, player: PlayerKey, location: &Location) {
        self.with(player, |p| p.location = location.clone());
    }
    fn level(&self, player: PlayerKey) -> Option<u32> {
        self.with(player, |p| p.level)
    }
    fn set_level(&self, player: PlayerKey, level: u32) {
        self.with(player, |p| p.level = level);
    }
    fn exp(&self, player: PlayerKey) -> Option<f32> {
        self.with(player, |p| p.exp)
    }
    fn set_exp(&self, player: PlayerKey, exp: f32) {
        self.with(player, |p| p.exp = exp);
    }
    fn update_inventory(&self, _player: PlayerKey) {}
}

impl PacketSender for Host {
    fn send_packet(&self, target: PlayerKey, packet: Packet) -> Result<(), ProtocolError> {
        let body = String::from_utf8_lossy(packet.body());
        tracing::info!(%target, kind = %packet.kind(), %body, "packet");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), OverlayError> {
    nickforge::init_tracing();

    let host = Arc::new(Host::default());
    let tick_loop = TickLoop::new(TickConfig::default());
    let manager = IdentityOverlayManager::builder()
        .directory(host.clone())
        .sender(host.clone())
        .scheduler(tick_loop.scheduler())
        .build()?;

    let steve = host.join("Steve");
    host.join("Alex");

    manager.set_nick(steve, "Grumm")?;
    manager.load_custom_skin_json(
        "knight",
        &json!({ "properties": [{ "name": "textures", "value": "a25pZ2h0" }] }),
    )?;
    manager.set_custom_skin(steve, "knight")?;

    // Twenty ticks at 20 Hz is enough for every scheduled step to land.
    tick_loop
        .run_until(tokio::time::sleep(Duration::from_secs(1)))
        .await;

    tracing::info!(nick = ?manager.get_nick(steve), skin = ?manager.get_skin(steve), "done");
    Ok(())
}
