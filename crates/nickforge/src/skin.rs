//! Skin resolution: turning an owner reference into a textured profile.

use nickforge_protocol::GameProfile;

/// Why a skin could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No account or skin exists for the reference.
    #[error("no skin found for {0:?}")]
    NotFound(String),

    /// The lookup service could not be reached or answered badly.
    #[error("skin service unavailable: {0}")]
    Unavailable(String),
}

/// Looks up skins by owner reference, typically an account name.
///
/// Always called on a worker context, so implementations may block on
/// network I/O.
pub trait SkinResolver: Send + Sync + 'static {
    fn resolve(&self, owner: &str) -> Result<GameProfile, ResolveError>;
}

/// The resolver used when none is configured. Every lookup fails, which
/// leaves `set_skin` working only for skins already in the registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredResolver;

impl SkinResolver for UnconfiguredResolver {
    fn resolve(&self, _owner: &str) -> Result<GameProfile, ResolveError> {
        Err(ResolveError::Unavailable("no skin resolver configured".into()))
    }
}
