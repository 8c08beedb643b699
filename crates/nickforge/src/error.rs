//! Unified error type for the overlay manager.

use nickforge_protocol::ProtocolError;
use nickforge_store::StoreError;

/// Errors returned synchronously by overlay mutations.
///
/// Only precondition failures surface here. Anything that goes wrong while
/// resynchronizing clients is logged inside the refresh protocol and never
/// undoes a mutation that already succeeded.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    /// Bad input the caller must fix: an over-long nick, a malformed skin
    /// document, a missing required collaborator.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is valid but not in the current state, e.g. wearing a
    /// custom skin that was never loaded.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A backing-store operation was rejected.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A protocol-level value was malformed (e.g., a bad profile id in a
    /// skin document).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
