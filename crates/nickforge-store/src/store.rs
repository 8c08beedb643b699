//! Typed overlay store: [`PlayerKey`] keys over a swappable provider.

use std::sync::{Arc, PoisonError, RwLock};

use nickforge_protocol::{OverlayKind, PlayerKey};

use crate::{DataProvider, MemoryProvider, StoreError};

/// Association from player to overlay value for one [`OverlayKind`].
///
/// Keys are stored in the provider in their hyphenated UUID form. The
/// provider itself can be replaced at runtime with
/// [`set_provider`](Self::set_provider); reads and writes issued after the
/// swap go to the new provider.
///
/// Reverse lookups ([`find_keys_with_value`](Self::find_keys_with_value))
/// scan every key: O(n) in the number of overlaid players, which is bounded
/// by the online population.
pub struct OverlayStore<V = String> {
    kind: OverlayKind,
    provider: RwLock<Arc<dyn DataProvider<V>>>,
}

impl<V> OverlayStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a store backed by a fresh [`MemoryProvider`].
    pub fn new(kind: OverlayKind) -> Self {
        Self::with_provider(kind, Arc::new(MemoryProvider::new()))
    }

    /// Creates a store backed by `provider`, without validation.
    pub fn with_provider(kind: OverlayKind, provider: Arc<dyn DataProvider<V>>) -> Self {
        Self {
            kind,
            provider: RwLock::new(provider),
        }
    }

    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    /// Replaces the backing provider.
    ///
    /// The value type is fixed by the signature. Existing entries in the
    /// replacement must all be keyed by player keys; otherwise nothing is
    /// installed and the current provider stays in place.
    ///
    /// # Errors
    /// [`StoreError::ForeignKey`] naming the first offending key.
    pub fn set_provider(&self, provider: Arc<dyn DataProvider<V>>) -> Result<(), StoreError> {
        if let Some(bad) = provider
            .keys()
            .into_iter()
            .find(|key| key.parse::<PlayerKey>().is_err())
        {
            return Err(StoreError::ForeignKey {
                kind: self.kind,
                key: bad,
            });
        }

        *self.provider.write().unwrap_or_else(PoisonError::into_inner) = provider;
        tracing::info!(kind = %self.kind, "overlay provider replaced");
        Ok(())
    }

    /// The currently installed provider.
    pub fn provider(&self) -> Arc<dyn DataProvider<V>> {
        let guard = self.provider.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    pub fn contains(&self, key: &PlayerKey) -> bool {
        self.provider().contains(&key.to_string())
    }

    pub fn get(&self, key: &PlayerKey) -> Option<V> {
        self.provider().get(&key.to_string())
    }

    /// `contains && get`. A key can be present in a provider without a
    /// readable value (e.g., an entry expiring between the two calls).
    pub fn has_value(&self, key: &PlayerKey) -> bool {
        let provider = self.provider();
        let raw = key.to_string();
        provider.contains(&raw) && provider.get(&raw).is_some()
    }

    pub fn put(&self, key: &PlayerKey, value: V) {
        self.provider().put(&key.to_string(), value);
    }

    pub fn remove(&self, key: &PlayerKey) -> Option<V> {
        self.provider().remove(&key.to_string())
    }

    /// Snapshot of every player key in the store.
    ///
    /// Provider keys that don't parse as player keys are skipped.
    pub fn keys(&self) -> Vec<PlayerKey> {
        self.provider()
            .keys()
            .into_iter()
            .filter_map(|raw| match raw.parse() {
                Ok(key) => Some(key),
                Err(_) => {
                    tracing::warn!(kind = %self.kind, key = %raw, "skipping foreign key in overlay store");
                    None
                }
            })
            .collect()
    }

    /// Every value currently held, one per key.
    pub fn values(&self) -> Vec<V> {
        let provider = self.provider();
        self.keys()
            .into_iter()
            .filter_map(|key| provider.get(&key.to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> OverlayStore<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// Every key whose value equals `value` exactly.
    pub fn find_keys_with_value(&self, value: &V) -> Vec<PlayerKey> {
        let provider = self.provider();
        self.keys()
            .into_iter()
            .filter(|key| provider.get(&key.to_string()).as_ref() == Some(value))
            .collect()
    }
}
