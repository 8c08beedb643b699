//! Error types for the protocol layer.
//!
//! Each crate in the workspace has its own error enum. A `ProtocolError`
//! always means a packet could not be built, encoded, decoded, or handed to
//! the host; store and manager failures have their own types and wrap this
//! one where they cross the boundary.

use crate::LogicalId;

/// Errors that can occur while building, encoding, or delivering packets.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error` impl;
/// each `#[error("...")]` is the message that ends up in log lines.
///
/// Inside the refresh protocol every one of these is caught and logged;
/// none of them ever reaches the caller of a nick or skin mutation.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization of a message body failed.
    ///
    /// The inner `serde_json::Error` is kept as is so callers handle one
    /// error type whichever codec produced it.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization of a message body failed.
    ///
    /// Usual causes: truncated bodies, a missing field, or a body encoded
    /// by a different codec.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A string could not be parsed as a player key.
    ///
    /// Raised for a malformed `id` in a custom skin document, or any other
    /// key string that isn't a UUID.
    #[error("invalid player key: {0:?}")]
    InvalidKey(String),

    /// The host protocol has no native value for this logical id
    /// (e.g., a difficulty id the running version doesn't know).
    #[error("unresolved protocol value: {0:?}")]
    Unresolved(LogicalId),

    /// The message is well-formed but violates a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The packet sender refused or failed to deliver a packet.
    ///
    /// Carries the host's own description; the overlay core never retries.
    #[error("send failed: {0}")]
    Send(String),
}
