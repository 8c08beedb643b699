//! Nick overlay operations.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use common::Harness;
use nickforge::{DataProvider, MemoryProvider, OverlayError, StoreError, TemporaryProvider};
use nickforge_protocol::{PacketKind, PlayerKey};

#[test]
fn test_set_nick_then_get_nick_returns_it() {
    let h = Harness::new();
    let steve = h.host.join("Steve");

    h.manager.set_nick(steve, "Grumm").unwrap();

    assert!(h.manager.is_nicked(steve));
    assert_eq!(h.manager.get_nick(steve).as_deref(), Some("Grumm"));
}

#[test]
fn test_set_nick_sixteen_chars_is_accepted() {
    let h = Harness::new();
    let steve = h.host.join("Steve");

    h.manager.set_nick(steve, "ABCDEFGHIJKLMNOP").unwrap();
    // Length counts UTF-16 units, not bytes: each "é" is one unit.
    h.manager.set_nick(steve, "é".repeat(16)).unwrap();

    assert_eq!(h.manager.get_nick(steve), Some("é".repeat(16)));
}

#[test]
fn test_set_nick_too_long_is_invalid_argument_and_keeps_state() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    h.manager.set_nick(steve, "Old").unwrap();
    h.settle(5);
    h.host.clear();

    let err = h.manager.set_nick(steve, "ABCDEFGHIJKLMNOPQ").unwrap_err();

    assert!(matches!(err, OverlayError::InvalidArgument(_)));
    assert_eq!(h.manager.get_nick(steve).as_deref(), Some("Old"));
    assert!(h.host.journal().is_empty(), "rejected nick must not refresh");
    assert_eq!(h.queue.pending(), 0);
}

#[test]
fn test_set_nick_sixteen_astral_chars_is_invalid_argument() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    // 16 characters, but each needs a surrogate pair: 32 UTF-16 units.
    let nick = "\u{1D538}".repeat(16);
    assert_eq!(nick.chars().count(), 16);

    let err = h.manager.set_nick(steve, nick).unwrap_err();

    assert!(matches!(err, OverlayError::InvalidArgument(_)));
    assert!(!h.manager.is_nicked(steve));
    assert!(h.host.journal().is_empty());
}

#[test]
fn test_set_nick_eight_astral_chars_is_accepted() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    let nick = "\u{1D538}".repeat(8);

    h.manager.set_nick(steve, nick.clone()).unwrap();

    assert_eq!(h.manager.get_nick(steve), Some(nick));
}

#[test]
fn test_set_nick_twice_leaves_only_the_second() {
    let h = Harness::new();
    let steve = h.host.join("Steve");

    h.manager.set_nick(steve, "First").unwrap();
    h.manager.set_nick(steve, "Second").unwrap();

    assert!(h.manager.players_with_nick("First").is_empty());
    assert!(!h.manager.is_nick_used("First"));
    assert_eq!(h.manager.players_with_nick("Second"), vec![steve]);
    assert_eq!(h.manager.used_nicks(), vec!["Second".to_string()]);
}

#[test]
fn test_set_nick_refreshes_once_per_call() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    h.manager.set_nick(steve, "First").unwrap();
    h.settle(5);
    h.host.clear();

    h.manager.set_nick(steve, "Second").unwrap();
    h.settle(5);

    assert_eq!(
        h.host.kinds_to(steve),
        vec![
            PacketKind::RemoveIdentity,
            PacketKind::Respawn,
            PacketKind::AddIdentity
        ]
    );
}

#[test]
fn test_set_nick_same_value_still_refreshes() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    h.manager.set_nick(steve, "Grumm").unwrap();
    h.settle(5);
    h.host.clear();

    h.manager.set_nick(steve, "Grumm").unwrap();

    assert_eq!(h.host.kinds_to(steve), vec![PacketKind::RemoveIdentity]);
}

#[test]
fn test_set_nick_offline_player_updates_store_only() {
    let h = Harness::new();
    let ghost = PlayerKey::new_v4();

    h.manager.set_nick(ghost, "Ghost").unwrap();

    assert_eq!(h.manager.get_nick(ghost).as_deref(), Some("Ghost"));
    assert!(h.host.journal().is_empty());
    assert_eq!(h.queue.pending(), 0);
}

#[test]
fn test_remove_nick_without_nick_is_noop() {
    let h = Harness::new();
    let steve = h.host.join("Steve");

    h.manager.remove_nick(steve);
    h.manager.remove_nick(PlayerKey::new_v4());

    assert!(!h.manager.is_nicked(steve));
    assert!(h.manager.used_nicks().is_empty());
}

#[test]
fn test_remove_nick_clears_reverse_lookups_and_refreshes() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    h.manager.set_nick(steve, "Grumm").unwrap();
    h.settle(5);
    h.host.clear();

    h.manager.remove_nick(steve);

    assert!(!h.manager.is_nick_used("Grumm"));
    assert_eq!(h.host.kinds_to(steve), vec![PacketKind::RemoveIdentity]);
}

#[test]
fn test_nick_lookup_is_exact_match() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    h.manager.set_nick(steve, "Grumm").unwrap();

    assert!(h.manager.is_nick_used("Grumm"));
    assert!(!h.manager.is_nick_used("grumm"));
    assert!(!h.manager.is_nick_used("Grumm "));
}

#[test]
fn test_shared_nick_appears_once_per_wearer_in_used_nicks() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    let alex = h.host.join("Alex");

    h.manager.set_nick(steve, "Twin").unwrap();
    h.manager.set_nick(alex, "Twin").unwrap();

    let mut wearers = h.manager.players_with_nick("Twin");
    wearers.sort();
    let mut expected = vec![steve, alex];
    expected.sort();
    assert_eq!(wearers, expected);
    assert_eq!(
        h.manager.used_nicks(),
        vec!["Twin".to_string(), "Twin".to_string()]
    );
}

#[test]
fn test_set_nick_replacement_never_leaves_player_unnicked() {
    let h = Harness::new();
    // Offline, so replacements touch the store only.
    let ghost = PlayerKey::new_v4();
    h.manager.set_nick(ghost, "Even").unwrap();
    let writing = AtomicBool::new(true);

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..2_000 {
                let nick = if i % 2 == 0 { "Odd" } else { "Even" };
                h.manager.set_nick(ghost, nick).unwrap();
            }
            writing.store(false, Ordering::Release);
        });
        s.spawn(|| {
            while writing.load(Ordering::Acquire) {
                assert!(h.manager.is_nicked(ghost), "replacement exposed an empty slot");
                assert_eq!(h.manager.used_nicks().len(), 1);
            }
        });
    });

    assert_eq!(h.manager.get_nick(ghost).as_deref(), Some("Even"));
}

// =========================================================================
// Provider swaps
// =========================================================================

#[test]
fn test_set_nick_provider_routes_writes_to_new_provider() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    let provider = Arc::new(MemoryProvider::<String>::new());

    h.manager.set_nick_provider(provider.clone()).unwrap();
    h.manager.set_nick(steve, "Grumm").unwrap();

    assert_eq!(
        provider.get(&steve.to_string()).as_deref(),
        Some("Grumm")
    );
}

#[test]
fn test_set_nick_provider_with_foreign_keys_is_rejected() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    h.manager.set_nick(steve, "Grumm").unwrap();

    let foreign = Arc::new(MemoryProvider::<String>::new());
    foreign.put("not-a-player", "x".to_string());
    let err = h.manager.set_nick_provider(foreign).unwrap_err();

    assert!(matches!(
        err,
        OverlayError::Store(StoreError::ForeignKey { ref key, .. }) if key == "not-a-player"
    ));
    assert_eq!(h.manager.get_nick(steve).as_deref(), Some("Grumm"));
}

#[test]
fn test_temporary_nick_provider_forgets_expired_nicks() {
    let h = Harness::new();
    let steve = h.host.join("Steve");
    let provider = Arc::new(TemporaryProvider::<String>::with_default_ttl(Duration::ZERO));

    h.manager.set_nick_provider(provider).unwrap();
    h.manager.set_nick(steve, "Brief").unwrap();

    assert!(!h.manager.is_nicked(steve));
    assert!(!h.manager.is_nick_used("Brief"));
}
