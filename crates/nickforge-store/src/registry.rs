//! The shared skin registry.
//!
//! Loaded skins are keyed independently of players: one record for
//! `"Notch"` can be worn by any number of players, each of whose skin
//! overlay simply holds the string `"Notch"`.

use std::sync::{Arc, PoisonError, RwLock};

use nickforge_protocol::GameProfile;

use crate::{DataProvider, MemoryProvider};

/// A resolved skin: the registry key plus the profile carrying its
/// `textures` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualIdentityRecord {
    pub key: String,
    pub profile: GameProfile,
}

/// Process-wide map from skin key to [`VisualIdentityRecord`].
///
/// Shared read-mostly between managers through an `Arc`. Writes are last
/// write wins; there is no uniqueness check on load.
pub struct SkinRegistry {
    provider: RwLock<Arc<dyn DataProvider<VisualIdentityRecord>>>,
}

impl SkinRegistry {
    pub fn new() -> Self {
        Self::with_provider(Arc::new(MemoryProvider::new()))
    }

    pub fn with_provider(provider: Arc<dyn DataProvider<VisualIdentityRecord>>) -> Self {
        Self {
            provider: RwLock::new(provider),
        }
    }

    /// Swaps the backing provider. Records in the old provider are not
    /// carried over.
    pub fn set_provider(&self, provider: Arc<dyn DataProvider<VisualIdentityRecord>>) {
        *self.provider.write().unwrap_or_else(PoisonError::into_inner) = provider;
        tracing::info!("skin registry provider replaced");
    }

    fn provider(&self) -> Arc<dyn DataProvider<VisualIdentityRecord>> {
        let guard = self.provider.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Stores `profile` under `key`, replacing any previous record.
    pub fn load(&self, key: &str, profile: GameProfile) {
        let record = VisualIdentityRecord {
            key: key.to_string(),
            profile,
        };
        self.provider().put(key, record);
        tracing::debug!(skin = %key, "skin loaded into registry");
    }

    pub fn get(&self, key: &str) -> Option<VisualIdentityRecord> {
        self.provider().get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.provider().contains(key)
    }

    pub fn remove(&self, key: &str) -> Option<VisualIdentityRecord> {
        self.provider().remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.provider().keys()
    }

    pub fn len(&self) -> usize {
        self.provider().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SkinRegistry {
    fn default() -> Self {
        Self::new()
    }
}
