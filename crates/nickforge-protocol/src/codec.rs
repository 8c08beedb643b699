//! Codec trait and implementations for packet bodies.
//!
//! The overlay core never looks inside a packet; it only needs *something*
//! that turns a [`PlayerInfoMessage`](crate::PlayerInfoMessage) or
//! [`RespawnMessage`](crate::RespawnMessage) into bytes the host's packet
//! sender accepts. Hosts with their own binary format plug in their own
//! [`Codec`]; [`JsonCodec`] is the default and the one used in tests.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes message bodies to bytes and back.
///
/// This is the one place a wire format is chosen. [`CodecAdapter`](crate::CodecAdapter)
/// holds a codec and calls [`encode`](Codec::encode) for every packet it
/// builds; nothing else in the overlay core touches bytes.
///
/// ## Trait bounds
///
/// - `Send + Sync` → the adapter that owns the codec sits behind an
///   `Arc<dyn ProtocolAdapter>` and is used from the primary tick context
///   and from worker threads at the same time.
/// - `'static` → the codec owns everything it needs. Tasks capture the
///   adapter and outlive the call that scheduled them.
///
/// ## Generic methods
///
/// `encode` and `decode` are generic over the message type, so one codec
/// handles [`PlayerInfoMessage`](crate::PlayerInfoMessage),
/// [`RespawnMessage`](crate::RespawnMessage), and whatever a host adds.
/// That makes the trait not object safe: adapters take the codec as a type
/// parameter instead of `dyn Codec`.
///
/// `decode` asks for `DeserializeOwned` because the result must not borrow
/// from the packet body; bodies are dropped as soon as they are decoded.
///
/// ## Implementing
///
/// `decode(encode(v))` must give back `v`. Hosts and test fakes decode
/// packet bodies to see what a client would render, so a lossy codec shows
/// up as a wrong nick or skin rather than as an error.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use nickforge_protocol::{Codec, GameProfile, JsonCodec, PlayerInfoMessage, PlayerKey};
///
/// let codec = JsonCodec;
/// let msg = PlayerInfoMessage {
///     action: 4,
///     profile: GameProfile::new(PlayerKey::from_u128(7), "Notch"),
///     latency: 0,
///     game_mode: 0,
///     display_name: "Notch".into(),
/// };
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: PlayerInfoMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
