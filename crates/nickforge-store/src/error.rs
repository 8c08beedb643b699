//! Error types for the store layer.

use nickforge_protocol::OverlayKind;

/// Errors that can occur while managing overlay stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A replacement provider holds a key that is not a player key.
    /// The replacement was not installed.
    #[error("{kind} provider holds foreign key {key:?}")]
    ForeignKey { kind: OverlayKind, key: String },
}
