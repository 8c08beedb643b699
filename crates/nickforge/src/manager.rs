//! `IdentityOverlayManager` builder and overlay operations.
//!
//! The manager is the one entry point the plugin glue talks to. It owns a
//! nick store and a skin store, shares the process-wide [`SkinRegistry`],
//! and turns every successful mutation into a refresh.

use std::sync::Arc;

use nickforge_protocol::{
    CodecAdapter, GameProfile, JsonCodec, OverlayKind, PlayerKey, ProfileProperty,
    ProtocolAdapter,
};
use nickforge_store::{DataProvider, OverlayStore, SkinRegistry};
use nickforge_tick::Scheduler;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::MAX_NICK_LENGTH;
use crate::refresh::{DisplayIdentity, RefreshOutcome, RefreshProtocol};
use crate::{
    HookChain, OverlayConfig, OverlayError, PacketSender, PlayerDirectory, SkinResolver,
    UnconfiguredResolver,
};

/// Builder for an [`IdentityOverlayManager`].
///
/// The directory, packet sender, and scheduler are required. Everything
/// else has a default: a [`CodecAdapter`] over [`JsonCodec`], a fresh
/// registry, an empty hook chain, and [`UnconfiguredResolver`].
///
/// # Example
///
/// ```rust,ignore
/// let manager = IdentityOverlayManager::builder()
///     .directory(host.clone())
///     .sender(host.clone())
///     .scheduler(tick_loop.scheduler())
///     .resolver(Arc::new(MojangResolver::new()))
///     .build()?;
/// manager.set_nick(player, "Grumm")?;
/// ```
#[derive(Default)]
pub struct IdentityOverlayManagerBuilder {
    directory: Option<Arc<dyn PlayerDirectory>>,
    sender: Option<Arc<dyn PacketSender>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    adapter: Option<Arc<dyn ProtocolAdapter>>,
    resolver: Option<Arc<dyn SkinResolver>>,
    registry: Option<Arc<SkinRegistry>>,
    hooks: Option<Arc<HookChain>>,
    config: OverlayConfig,
}

impl IdentityOverlayManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(mut self, directory: Arc<dyn PlayerDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn sender(mut self, sender: Arc<dyn PacketSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn adapter(mut self, adapter: Arc<dyn ProtocolAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn SkinResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Shares an existing registry instead of creating a new one.
    pub fn registry(mut self, registry: Arc<SkinRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn hooks(mut self, hooks: Arc<HookChain>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn config(mut self, config: OverlayConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    /// [`OverlayError::InvalidArgument`] if a required collaborator is
    /// missing.
    pub fn build(self) -> Result<IdentityOverlayManager, OverlayError> {
        let directory = required(self.directory, "directory")?;
        let sender = required(self.sender, "sender")?;
        let scheduler = required(self.scheduler, "scheduler")?;
        let adapter = self
            .adapter
            .unwrap_or_else(|| Arc::new(CodecAdapter::new(JsonCodec)));
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(UnconfiguredResolver));
        let registry = self.registry.unwrap_or_default();
        let hooks = self.hooks.unwrap_or_default();
        let config = self.config.validated();

        let refresh = RefreshProtocol::new(
            Arc::clone(&directory),
            sender,
            adapter,
            Arc::clone(&scheduler),
            Arc::clone(&hooks),
            &config,
        );

        Ok(IdentityOverlayManager {
            inner: Arc::new(Inner {
                directory,
                scheduler,
                resolver,
                nicks: OverlayStore::new(OverlayKind::Nick),
                skins: OverlayStore::new(OverlayKind::Skin),
                registry,
                hooks,
                refresh,
                config,
            }),
        })
    }
}

fn required<T: ?Sized>(value: Option<Arc<T>>, name: &str) -> Result<Arc<T>, OverlayError> {
    value.ok_or_else(|| OverlayError::InvalidArgument(format!("{name} is required")))
}

struct Inner {
    directory: Arc<dyn PlayerDirectory>,
    scheduler: Arc<dyn Scheduler>,
    resolver: Arc<dyn SkinResolver>,
    nicks: OverlayStore,
    skins: OverlayStore,
    registry: Arc<SkinRegistry>,
    hooks: Arc<HookChain>,
    refresh: RefreshProtocol,
    config: OverlayConfig,
}

/// Nick and skin overlays for the players of one host.
///
/// Cheap to clone; clones share all state. Safe to call from the primary
/// context and from workers. Every mutation ends in exactly one
/// [`refresh`](Self::refresh) of the affected player.
#[derive(Clone)]
pub struct IdentityOverlayManager {
    inner: Arc<Inner>,
}

impl IdentityOverlayManager {
    pub fn builder() -> IdentityOverlayManagerBuilder {
        IdentityOverlayManagerBuilder::new()
    }

    // -----------------------------------------------------------------------
    // Nicks
    // -----------------------------------------------------------------------

    pub fn is_nicked(&self, player: PlayerKey) -> bool {
        self.inner.nicks.has_value(&player)
    }

    pub fn get_nick(&self, player: PlayerKey) -> Option<String> {
        self.inner.nicks.get(&player)
    }

    /// Gives `player` a nick, replacing any previous one, and refreshes
    /// them even if the nick didn't change.
    ///
    /// # Errors
    /// [`OverlayError::InvalidArgument`] if `nick` is longer than
    /// [`MAX_NICK_LENGTH`] UTF-16 code units, the measure clients use.
    /// Nothing is changed in that case.
    pub fn set_nick(&self, player: PlayerKey, nick: impl Into<String>) -> Result<(), OverlayError> {
        let nick = nick.into();
        let length = nick.encode_utf16().count();
        if length > MAX_NICK_LENGTH {
            return Err(OverlayError::InvalidArgument(format!(
                "nick {nick:?} is {length} UTF-16 units long, limit is {MAX_NICK_LENGTH}"
            )));
        }

        // A put replaces in place; readers see the old nick or the new one,
        // never neither.
        self.inner.nicks.put(&player, nick.clone());
        info!(%player, %nick, "nick set");

        self.refresh(player);
        Ok(())
    }

    /// Drops `player`'s nick, if any, and refreshes them.
    pub fn remove_nick(&self, player: PlayerKey) {
        if let Some(old) = self.inner.nicks.remove(&player) {
            info!(%player, nick = %old, "nick removed");
        }
        self.refresh(player);
    }

    pub fn is_nick_used(&self, nick: &str) -> bool {
        !self.players_with_nick(nick).is_empty()
    }

    /// Every player wearing exactly `nick`.
    pub fn players_with_nick(&self, nick: &str) -> Vec<PlayerKey> {
        self.inner.nicks.find_keys_with_value(&nick.to_string())
    }

    /// One entry per nicked player, in no particular order. A nick worn by
    /// two players appears twice.
    pub fn used_nicks(&self) -> Vec<String> {
        self.inner.nicks.values()
    }

    // -----------------------------------------------------------------------
    // Skins
    // -----------------------------------------------------------------------

    pub fn has_skin(&self, player: PlayerKey) -> bool {
        self.inner.skins.has_value(&player)
    }

    /// The skin overlay value, or the player's real name while they are
    /// online and have none.
    pub fn get_skin(&self, player: PlayerKey) -> Option<String> {
        self.inner
            .skins
            .get(&player)
            .or_else(|| self.inner.directory.name(player))
    }

    /// Dresses `player` in the skin of `owner`.
    ///
    /// The association is visible immediately. Resolving `owner` happens on
    /// a worker after a short delay; once it finishes, successfully or not,
    /// the player is refreshed on the primary context. A failed lookup does
    /// not undo the association.
    pub fn set_skin(&self, player: PlayerKey, owner: impl Into<String>) {
        let owner = owner.into();
        self.inner.skins.put(&player, owner.clone());
        info!(%player, skin = %owner, "skin set; resolving");

        let manager = self.clone();
        self.inner.scheduler.run_task_later_async(
            self.inner.config.skin_resolve_delay_ticks,
            Box::new(move || manager.resolve_skin(player, &owner)),
        );
    }

    /// Worker side of `set_skin`.
    fn resolve_skin(&self, player: PlayerKey, owner: &str) {
        if self.inner.registry.contains(owner) {
            debug!(skin = %owner, "skin already in registry");
        } else {
            match self.inner.resolver.resolve(owner) {
                Ok(profile) => self.inner.registry.load(owner, profile),
                Err(e) => warn!(%player, skin = %owner, error = %e, "skin resolution failed"),
            }
        }

        let manager = self.clone();
        self.inner.scheduler.run_task(Box::new(move || {
            manager.refresh(player);
        }));
    }

    /// Stores `profile` in the registry under `key`, replacing any record
    /// already there.
    pub fn load_custom_skin(&self, key: &str, profile: GameProfile) {
        self.inner.registry.load(key, profile);
    }

    /// Like [`load_custom_skin`](Self::load_custom_skin), from a profile
    /// document:
    ///
    /// ```json
    /// { "id": "…uuid…", "name": "Notch",
    ///   "properties": [{ "name": "textures", "value": "…", "signature": "…" }] }
    /// ```
    ///
    /// `properties` is required; `id` defaults to the nil key and `name` to
    /// `key` cut to [`MAX_NICK_LENGTH`] characters.
    ///
    /// # Errors
    /// [`OverlayError::InvalidArgument`] for a malformed document,
    /// [`OverlayError::Protocol`] for an unparseable `id`.
    pub fn load_custom_skin_json(&self, key: &str, document: &Value) -> Result<(), OverlayError> {
        let object = document.as_object().ok_or_else(|| {
            OverlayError::InvalidArgument(format!("skin document for {key:?} is not an object"))
        })?;
        let properties = object.get("properties").ok_or_else(|| {
            OverlayError::InvalidArgument(format!("skin document for {key:?} has no properties"))
        })?;
        let properties: Vec<ProfileProperty> = serde_json::from_value(properties.clone())
            .map_err(|e| {
                OverlayError::InvalidArgument(format!("bad properties for {key:?}: {e}"))
            })?;

        let id = match object.get("id").and_then(Value::as_str) {
            Some(raw) => raw.parse::<PlayerKey>()?,
            None => PlayerKey::from_u128(0),
        };
        let name = match object.get("name").and_then(Value::as_str) {
            Some(name) => name.to_string(),
            None => key.chars().take(MAX_NICK_LENGTH).collect(),
        };

        self.load_custom_skin(key, GameProfile::new(id, name).with_properties(&properties));
        Ok(())
    }

    /// Dresses `player` in a skin previously loaded into the registry.
    ///
    /// # Errors
    /// [`OverlayError::InvalidState`] if nothing is loaded under
    /// `registry_key`.
    pub fn set_custom_skin(&self, player: PlayerKey, registry_key: &str) -> Result<(), OverlayError> {
        if !self.inner.registry.contains(registry_key) {
            return Err(OverlayError::InvalidState(format!(
                "custom skin {registry_key:?} is not loaded"
            )));
        }

        self.inner.skins.put(&player, registry_key.to_string());
        info!(%player, skin = %registry_key, "custom skin set");

        self.refresh(player);
        Ok(())
    }

    /// Drops `player`'s skin overlay, if any, and refreshes them.
    pub fn remove_skin(&self, player: PlayerKey) {
        if let Some(old) = self.inner.skins.remove(&player) {
            info!(%player, skin = %old, "skin removed");
        }
        self.refresh(player);
    }

    /// Every player whose skin overlay is exactly `skin`.
    pub fn players_with_skin(&self, skin: &str) -> Vec<PlayerKey> {
        self.inner.skins.find_keys_with_value(&skin.to_string())
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    /// What `player`'s own client should render for itself: their real
    /// profile with the nick as the name and the skin's properties.
    ///
    /// A skin that is set but not (yet) in the registry leaves the real
    /// properties in place. `None` while the player is offline.
    pub fn display_profile(&self, player: PlayerKey) -> Option<GameProfile> {
        let mut profile = self.inner.directory.profile(player)?;
        if let Some(nick) = self.inner.nicks.get(&player) {
            profile = profile.with_name(nick);
        }
        if let Some(record) = self
            .inner
            .skins
            .get(&player)
            .and_then(|skin| self.inner.registry.get(&skin))
        {
            profile = profile.with_properties(&record.profile.properties);
        }
        Some(profile)
    }

    /// Resynchronizes every client's view of `player`. A no-op while the
    /// player is offline.
    pub fn refresh(&self, player: PlayerKey) -> RefreshOutcome {
        self.inner.refresh.refresh(player, |key| {
            let display_name = self
                .inner
                .nicks
                .get(&key)
                .or_else(|| self.inner.directory.list_name(key))?;
            let profile = self.display_profile(key)?;
            Some(DisplayIdentity {
                display_name,
                profile,
            })
        })
    }

    /// The granular flags were never honored; this is [`refresh`](Self::refresh).
    #[deprecated(note = "use `refresh`")]
    pub fn update_player(
        &self,
        player: PlayerKey,
        _update_name: bool,
        _update_skin: bool,
        _update_self: bool,
    ) -> RefreshOutcome {
        self.refresh(player)
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    /// Swaps the nick store's backing provider.
    ///
    /// # Errors
    /// [`OverlayError::Store`] if the replacement holds non-player keys.
    pub fn set_nick_provider(
        &self,
        provider: Arc<dyn DataProvider<String>>,
    ) -> Result<(), OverlayError> {
        Ok(self.inner.nicks.set_provider(provider)?)
    }

    /// Swaps the skin store's backing provider.
    ///
    /// # Errors
    /// [`OverlayError::Store`] if the replacement holds non-player keys.
    pub fn set_skin_provider(
        &self,
        provider: Arc<dyn DataProvider<String>>,
    ) -> Result<(), OverlayError> {
        Ok(self.inner.skins.set_provider(provider)?)
    }

    pub fn registry(&self) -> &Arc<SkinRegistry> {
        &self.inner.registry
    }

    pub fn hooks(&self) -> &Arc<HookChain> {
        &self.inner.hooks
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.inner.config
    }
}
