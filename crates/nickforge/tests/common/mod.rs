//! Shared fakes for the overlay integration tests.
//!
//! `FakeHost` plays both the player directory and the packet sender and
//! journals everything the overlay core asks of it. Time is a `TaskQueue`
//! advanced by hand with `tick_inline`, so every test is deterministic.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use nickforge::{
    IdentityOverlayManager, IdentityOverlayManagerBuilder, Location, PacketSender,
    PlayerDirectory, ResolveError, SkinResolver,
};
use nickforge_protocol::{
    Codec, Difficulty, GameMode, GameProfile, JsonCodec, Packet, PacketKind, PlayerInfoMessage,
    PlayerKey, ProfileProperty, ProtocolError,
};
use nickforge_tick::TaskQueue;

// =========================================================================
// Host
// =========================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Packet {
        target: PlayerKey,
        kind: PacketKind,
        tick: u64,
    },
    Hide {
        observer: PlayerKey,
        target: PlayerKey,
    },
    Show {
        observer: PlayerKey,
        target: PlayerKey,
    },
    SetFlying(PlayerKey, bool),
    Teleport(PlayerKey),
    UpdateInventory(PlayerKey),
    SetLevel(PlayerKey, u32),
    SetExp(PlayerKey, f32),
}

#[derive(Debug, Clone)]
pub struct FakePlayer {
    pub name: String,
    pub profile: GameProfile,
    pub difficulty: Difficulty,
    pub game_mode: GameMode,
    pub flying: bool,
    pub location: Location,
    pub level: u32,
    pub exp: f32,
    /// Observers whose clients currently don't render this player.
    pub hidden_from: HashSet<PlayerKey>,
}

pub struct FakeHost {
    queue: Arc<TaskQueue>,
    players: Mutex<HashMap<PlayerKey, FakePlayer>>,
    journal: Mutex<Vec<HostEvent>>,
    packets: Mutex<Vec<(PlayerKey, Packet)>>,
    fail_sends: AtomicBool,
    /// Hiding a player from the key also hides them from every listed observer.
    linked_hides: Mutex<HashMap<PlayerKey, Vec<PlayerKey>>>,
}

impl FakeHost {
    pub fn new(queue: Arc<TaskQueue>) -> Self {
        Self {
            queue,
            players: Mutex::new(HashMap::new()),
            journal: Mutex::new(Vec::new()),
            packets: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
            linked_hides: Mutex::new(HashMap::new()),
        }
    }

    /// Brings a player online, flying at level 30 somewhere recognizable.
    pub fn join(&self, name: &str) -> PlayerKey {
        let key = PlayerKey::new_v4();
        let profile = GameProfile::new(key, name).with_property(ProfileProperty::new(
            GameProfile::TEXTURES,
            format!("real-{name}"),
        ));
        let player = FakePlayer {
            name: name.to_string(),
            profile,
            difficulty: Difficulty::Hard,
            game_mode: GameMode::Creative,
            flying: true,
            location: Location::new("world", 10.5, 70.0, -3.25),
            level: 30,
            exp: 0.5,
            hidden_from: HashSet::new(),
        };
        self.players.lock().unwrap().insert(key, player);
        key
    }

    pub fn leave(&self, key: PlayerKey) {
        self.players.lock().unwrap().remove(&key);
    }

    pub fn player(&self, key: PlayerKey) -> Option<FakePlayer> {
        self.players.lock().unwrap().get(&key).cloned()
    }

    /// Makes `observer`'s client stop rendering `target` outside of any
    /// refresh.
    pub fn conceal(&self, observer: PlayerKey, target: PlayerKey) {
        if let Some(p) = self.players.lock().unwrap().get_mut(&target) {
            p.hidden_from.insert(observer);
        }
    }

    /// From now on, hiding any player from `observer` also conceals them
    /// from `also`, the way a host that groups observers would.
    pub fn link_hides(&self, observer: PlayerKey, also: PlayerKey) {
        self.linked_hides
            .lock()
            .unwrap()
            .entry(observer)
            .or_default()
            .push(also);
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn journal(&self) -> Vec<HostEvent> {
        self.journal.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.journal.lock().unwrap().clear();
        self.packets.lock().unwrap().clear();
    }

    /// `(kind, tick)` of every packet delivered to `target`, in order.
    pub fn packets_to(&self, target: PlayerKey) -> Vec<(PacketKind, u64)> {
        self.journal()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::Packet { target: t, kind, tick } if t == target => Some((kind, tick)),
                _ => None,
            })
            .collect()
    }

    pub fn kinds_to(&self, target: PlayerKey) -> Vec<PacketKind> {
        self.packets_to(target).into_iter().map(|(kind, _)| kind).collect()
    }

    /// Decoded body of the last player-info packet of `kind` sent to `target`.
    pub fn last_player_info(&self, target: PlayerKey, kind: PacketKind) -> Option<PlayerInfoMessage> {
        let packets = self.packets.lock().unwrap();
        let (_, packet) = packets
            .iter()
            .rev()
            .find(|(t, p)| *t == target && p.kind() == kind)?;
        JsonCodec.decode(packet.body()).ok()
    }

    /// `(observer, target)` pairs hidden and shown, in order.
    pub fn toggles(&self) -> Vec<HostEvent> {
        self.journal()
            .into_iter()
            .filter(|e| matches!(e, HostEvent::Hide { .. } | HostEvent::Show { .. }))
            .collect()
    }

    fn record(&self, event: HostEvent) {
        self.journal.lock().unwrap().push(event);
    }

    fn with_player<T>(&self, key: PlayerKey, f: impl FnOnce(&mut FakePlayer) -> T) -> Option<T> {
        self.players.lock().unwrap().get_mut(&key).map(f)
    }
}

impl PlayerDirectory for FakeHost {
    fn is_online(&self, player: PlayerKey) -> bool {
        self.players.lock().unwrap().contains_key(&player)
    }

    fn online_players(&self) -> Vec<PlayerKey> {
        let mut keys: Vec<_> = self.players.lock().unwrap().keys().copied().collect();
        keys.sort();
        keys
    }

    fn name(&self, player: PlayerKey) -> Option<String> {
        self.with_player(player, |p| p.name.clone())
    }

    fn list_name(&self, player: PlayerKey) -> Option<String> {
        self.name(player)
    }

    fn profile(&self, player: PlayerKey) -> Option<GameProfile> {
        self.with_player(player, |p| p.profile.clone())
    }

    fn difficulty(&self, player: PlayerKey) -> Option<Difficulty> {
        self.with_player(player, |p| p.difficulty)
    }

    fn game_mode(&self, player: PlayerKey) -> Option<GameMode> {
        self.with_player(player, |p| p.game_mode)
    }

    fn can_see(&self, observer: PlayerKey, target: PlayerKey) -> bool {
        let players = self.players.lock().unwrap();
        players.contains_key(&observer)
            && players
                .get(&target)
                .is_some_and(|p| !p.hidden_from.contains(&observer))
    }

    fn hide_player(&self, observer: PlayerKey, target: PlayerKey) {
        let linked = self
            .linked_hides
            .lock()
            .unwrap()
            .get(&observer)
            .cloned()
            .unwrap_or_default();
        self.with_player(target, |p| {
            p.hidden_from.insert(observer);
            p.hidden_from.extend(linked);
        });
        self.record(HostEvent::Hide { observer, target });
    }

    fn show_player(&self, observer: PlayerKey, target: PlayerKey) {
        self.with_player(target, |p| p.hidden_from.remove(&observer));
        self.record(HostEvent::Show { observer, target });
    }

    fn is_flying(&self, player: PlayerKey) -> Option<bool> {
        self.with_player(player, |p| p.flying)
    }

    fn set_flying(&self, player: PlayerKey, flying: bool) {
        self.with_player(player, |p| p.flying = flying);
        self.record(HostEvent::SetFlying(player, flying));
    }

    fn location(&self, player: PlayerKey) -> Option<Location> {
        self.with_player(player, |p| p.location.clone())
    }

    fn teleport(&self, player: PlayerKey, location: &Location) {
        self.with_player(player, |p| p.location = location.clone());
        self.record(HostEvent::Teleport(player));
    }

    fn level(&self, player: PlayerKey) -> Option<u32> {
        self.with_player(player, |p| p.level)
    }

    fn set_level(&self, player: PlayerKey, level: u32) {
        self.with_player(player, |p| p.level = level);
        self.record(HostEvent::SetLevel(player, level));
    }

    fn exp(&self, player: PlayerKey) -> Option<f32> {
        self.with_player(player, |p| p.exp)
    }

    fn set_exp(&self, player: PlayerKey, exp: f32) {
        self.with_player(player, |p| p.exp = exp);
        self.record(HostEvent::SetExp(player, exp));
    }

    fn update_inventory(&self, player: PlayerKey) {
        self.record(HostEvent::UpdateInventory(player));
    }
}

impl PacketSender for FakeHost {
    fn send_packet(&self, target: PlayerKey, packet: Packet) -> Result<(), ProtocolError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ProtocolError::Send(format!("{} refused", packet.kind())));
        }

        // A real respawn resets what the session snapshot has to restore.
        if packet.kind() == PacketKind::Respawn {
            self.with_player(target, |p| {
                p.flying = false;
                p.level = 0;
                p.exp = 0.0;
                p.location = Location::new("world", 0.0, 64.0, 0.0);
            });
        }

        let tick = self.queue.current_tick();
        self.record(HostEvent::Packet {
            target,
            kind: packet.kind(),
            tick,
        });
        self.packets.lock().unwrap().push((target, packet));
        Ok(())
    }
}

// =========================================================================
// Skin resolver
// =========================================================================

/// Resolves names from a fixed table and counts lookups.
#[derive(Default)]
pub struct FakeResolver {
    known: Mutex<HashMap<String, GameProfile>>,
    calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn knowing(names: &[&str]) -> Self {
        let resolver = Self::default();
        for name in names {
            let profile = GameProfile::new(PlayerKey::new_v4(), *name).with_property(
                ProfileProperty::new(GameProfile::TEXTURES, format!("skin-{name}")).signed("sig"),
            );
            resolver
                .known
                .lock()
                .unwrap()
                .insert(name.to_string(), profile);
        }
        resolver
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SkinResolver for FakeResolver {
    fn resolve(&self, owner: &str) -> Result<GameProfile, ResolveError> {
        self.calls.lock().unwrap().push(owner.to_string());
        self.known
            .lock()
            .unwrap()
            .get(owner)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound(owner.to_string()))
    }
}

// =========================================================================
// Harness
// =========================================================================

pub struct Harness {
    pub queue: Arc<TaskQueue>,
    pub host: Arc<FakeHost>,
    pub manager: IdentityOverlayManager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    /// Builds a manager over a fresh host, letting the test adjust the
    /// builder first.
    pub fn with(
        customize: impl FnOnce(IdentityOverlayManagerBuilder) -> IdentityOverlayManagerBuilder,
    ) -> Self {
        let queue = Arc::new(TaskQueue::new());
        let host = Arc::new(FakeHost::new(Arc::clone(&queue)));
        let builder = IdentityOverlayManager::builder()
            .directory(host.clone())
            .sender(host.clone())
            .scheduler(queue.clone());
        let manager = customize(builder).build().unwrap();
        Self {
            queue,
            host,
            manager,
        }
    }

    pub fn run_ticks(&self, ticks: usize) {
        for _ in 0..ticks {
            self.queue.tick_inline();
        }
    }

    /// Ticks until nothing is pending, up to `limit` ticks.
    pub fn settle(&self, limit: usize) {
        for _ in 0..limit {
            if self.queue.pending() == 0 {
                return;
            }
            self.queue.tick_inline();
        }
    }
}
