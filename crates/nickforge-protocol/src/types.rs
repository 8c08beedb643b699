//! Core identity and packet types.
//!
//! Everything here is plain data: identifiers, the profile a client renders
//! for a player, the numeric ids the host game uses for world settings, and
//! the two message bodies the refresh protocol sends (player-info and
//! respawn).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Stable unique identifier for a player.
///
/// Immutable for the lifetime of the player account and used as the map key
/// in every store. Overlays never change it: a nicked player keeps the same
/// `PlayerKey`, only what other clients render changes.
///
/// Serializes as the bare hyphenated UUID string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerKey(pub Uuid);

impl PlayerKey {
    /// Creates a random key. Mostly useful in tests and demos.
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a key from a raw 128-bit value.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PlayerKey {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ProtocolError::InvalidKey(s.to_string()))
    }
}

impl From<Uuid> for PlayerKey {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Which overlay a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// A substitute display name.
    Nick,
    /// A substitute visual skin, stored as a skin-registry key.
    Skin,
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nick => f.write_str("nick"),
            Self::Skin => f.write_str("skin"),
        }
    }
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// A single signed profile property. Skins travel as the `textures`
/// property: a base64 blob plus the session server's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl ProfileProperty {
    /// Creates an unsigned property.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            signature: None,
        }
    }

    /// Attaches a signature.
    pub fn signed(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

/// What a client renders for a player: id, name, and properties.
///
/// The host treats this as an opaque handle; the overlay core only swaps
/// the name and the property list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProfile {
    pub id: PlayerKey,
    pub name: String,
    #[serde(default)]
    pub properties: Vec<ProfileProperty>,
}

impl GameProfile {
    /// Name of the property that carries skin data.
    pub const TEXTURES: &'static str = "textures";

    /// Creates a profile with no properties.
    pub fn new(id: PlayerKey, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Adds a property (builder style).
    pub fn with_property(mut self, property: ProfileProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Returns a copy with a different display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a copy carrying another profile's properties (i.e., its skin).
    pub fn with_properties(mut self, properties: &[ProfileProperty]) -> Self {
        self.properties = properties.to_vec();
        self
    }

    /// The skin property, if any.
    pub fn textures(&self) -> Option<&ProfileProperty> {
        self.properties.iter().find(|p| p.name == Self::TEXTURES)
    }
}

// ---------------------------------------------------------------------------
// World settings
// ---------------------------------------------------------------------------

/// World difficulty. The discriminant is the id the host uses on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Peaceful = 0,
    Easy = 1,
    Normal = 2,
    Hard = 3,
}

impl Difficulty {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Player game mode. The discriminant is the id the host uses on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Survival = 0,
    Creative = 1,
    Adventure = 2,
    Spectator = 3,
}

impl GameMode {
    pub fn id(self) -> u8 {
        self as u8
    }
}

/// Level generator type, in the host's registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldType {
    Default,
    Flat,
    LargeBiomes,
    Amplified,
}

impl WorldType {
    /// All world types, indexed by registration slot.
    pub const ALL: [WorldType; 4] = [
        WorldType::Default,
        WorldType::Flat,
        WorldType::LargeBiomes,
        WorldType::Amplified,
    ];

    /// The wire name of this world type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Flat => "flat",
            Self::LargeBiomes => "largeBiomes",
            Self::Amplified => "amplified",
        }
    }
}

/// A protocol value as the overlay core thinks of it, before the adapter
/// maps it to the host's representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalId {
    Difficulty(u8),
    /// Registration slot of a [`WorldType`].
    WorldType(u8),
    GameMode(u8),
}

/// The host-native representation of a [`LogicalId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeHandle(pub i32);

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// What a player-info message does to the receiving client's player list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerInfoAction {
    AddPlayer,
    RemovePlayer,
}

impl PlayerInfoAction {
    /// The action code the host protocol expects.
    pub fn code(self) -> u8 {
        match self {
            Self::AddPlayer => 0,
            Self::RemovePlayer => 4,
        }
    }
}

/// Body of a player-info message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfoMessage {
    pub action: u8,
    pub profile: GameProfile,
    pub latency: u32,
    pub game_mode: u8,
    pub display_name: String,
}

/// Body of a forced-respawn message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespawnMessage {
    pub dimension: i32,
    pub difficulty: NativeHandle,
    pub world_type: NativeHandle,
    pub game_mode: NativeHandle,
}

/// The three packets a self-update sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    RemoveIdentity,
    Respawn,
    AddIdentity,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoveIdentity => f.write_str("remove-identity"),
            Self::Respawn => f.write_str("respawn"),
            Self::AddIdentity => f.write_str("add-identity"),
        }
    }
}

/// An encoded packet, ready to hand to the host's packet sender.
///
/// The body is opaque to everything above the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    kind: PacketKind,
    body: Vec<u8>,
}

impl Packet {
    pub fn new(kind: PacketKind, body: Vec<u8>) -> Self {
        Self { kind, body }
    }

    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
