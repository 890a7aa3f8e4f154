//! Session store consistency and observation tests
//!
//! Run with: cargo test --test session_store_test -- --nocapture

use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use scamguard_core::{SessionSnapshot, SessionStore, User};

// ============================================================================
// Test Helpers
// ============================================================================

fn ana() -> User {
    User::new(7, "Ana", true)
}

/// Subscribe and collect every snapshot delivered
fn record(store: &SessionStore) -> Arc<Mutex<Vec<SessionSnapshot>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.clone()));
    seen
}

fn assert_consistent(snapshot: &SessionSnapshot) {
    assert_eq!(snapshot.is_logged_in(), snapshot.current_user().is_some());
    assert_eq!(snapshot.is_logged_in(), snapshot.user_id().is_some());
}

// ============================================================================
// State Tests
// ============================================================================

#[test]
fn test_set_user_scenario() {
    let store = SessionStore::new();
    store.set_user(Some(ana()));

    assert!(store.is_logged_in());
    assert_eq!(store.user_id(), Some(7));
    assert_eq!(store.user_name().as_deref(), Some("Ana"));
    assert!(store.is_elderly());
}

#[test]
fn test_set_user_none_matches_clear_user() {
    let via_none = SessionStore::new();
    via_none.set_user(Some(ana()));
    via_none.set_user(None);

    let via_clear = SessionStore::new();
    via_clear.set_user(Some(ana()));
    via_clear.clear_user();

    assert!(!via_none.is_logged_in());
    assert_eq!(via_none.user_id(), None);
    assert_eq!(via_none.current_snapshot(), via_clear.current_snapshot());
}

#[test]
fn test_clear_user_is_idempotent() {
    let store = SessionStore::new();
    store.set_user(Some(ana()));

    store.clear_user();
    let once = store.current_snapshot();
    store.clear_user();
    let twice = store.current_snapshot();

    assert_eq!(once, twice);
    assert_eq!(twice, SessionSnapshot::logged_out());
}

#[test]
fn test_round_trip_matches_single_set() {
    let single = SessionStore::new();
    single.set_user(Some(ana()));

    let round_trip = SessionStore::new();
    round_trip.set_user(Some(ana()));
    round_trip.clear_user();
    round_trip.set_user(Some(ana()));

    assert_eq!(single.current_snapshot(), round_trip.current_snapshot());
}

#[test]
fn test_logged_out_reads_are_defaults() {
    let store = SessionStore::new();
    assert_eq!(store.user_id(), None);
    assert_eq!(store.user_name(), None);
    assert!(!store.is_elderly());
    assert!(store.current_user().is_none());
}

// ============================================================================
// Observation Tests
// ============================================================================

#[test]
fn test_late_subscriber_gets_current_then_every_update() {
    let store = SessionStore::new();
    for id in 1..=5 {
        store.set_user(Some(User::new(id, format!("user-{}", id), false)));
    }

    let seen = record(&store);
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(seen.lock().unwrap()[0].user_id(), Some(5));

    store.clear_user();
    store.set_user(Some(User::new(6, "user-6", false)));
    store.set_user(Some(User::new(7, "user-7", false)));

    let ids: Vec<Option<i64>> = seen.lock().unwrap().iter().map(|s| s.user_id()).collect();
    assert_eq!(ids, vec![Some(5), None, Some(6), Some(7)]);
}

#[test]
fn test_independent_subscribers_see_same_history() {
    let store = SessionStore::new();
    let first = record(&store);
    let second = record(&store);

    store.set_user(Some(ana()));
    store.clear_user();

    assert_eq!(*first.lock().unwrap(), *second.lock().unwrap());
    assert_eq!(first.lock().unwrap().len(), 3);
}

/// Concurrent publishers: every observer sees the same total order, with
/// nothing skipped, and the last delivered snapshot is the current one.
#[test]
fn test_concurrent_publishers_preserve_order() {
    const THREADS: i64 = 4;
    const ROUNDS: i64 = 50;

    let store = Arc::new(SessionStore::new());
    let observers: Vec<_> = (0..3).map(|_| record(&store)).collect();
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    if round % 3 == 0 {
                        store.clear_user();
                    } else {
                        let id = t * 1000 + round;
                        store.set_user(Some(User::new(id, format!("u{}", id), round % 2 == 0)));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let reference = observers[0].lock().unwrap().clone();
    // Initial replay plus one per publish
    assert_eq!(reference.len() as i64, 1 + THREADS * ROUNDS);

    for observer in &observers[1..] {
        assert_eq!(*observer.lock().unwrap(), reference);
    }
    for snapshot in &reference {
        assert_consistent(snapshot);
    }
    assert_eq!(reference.last(), Some(&store.current_snapshot()));

    // Per-thread publish order is kept within the global order
    for t in 0..THREADS {
        let ids: Vec<i64> = reference
            .iter()
            .filter_map(|s| s.user_id())
            .filter(|id| id / 1000 == t)
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}

/// Readers racing with writers only ever observe consistent snapshots
#[test]
fn test_concurrent_reads_are_consistent() {
    let store = Arc::new(SessionStore::new());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..500 {
                if i % 2 == 0 {
                    store.set_user(Some(User::new(i, "w", true)));
                } else {
                    store.set_user(None);
                }
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..500 {
                    let snapshot = store.current_snapshot();
                    assert_consistent(&snapshot);
                    if !snapshot.is_logged_in() {
                        assert!(!snapshot.is_elderly());
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

#[tokio::test]
async fn test_channel_subscriber_skips_nothing() {
    let store = SessionStore::new();
    let (id, mut rx) = store.subscribe_channel();

    for i in 1..=20 {
        store.set_user(Some(User::new(i, "x", false)));
    }

    assert_eq!(rx.recv().await.unwrap().user_id(), None);
    for i in 1..=20 {
        assert_eq!(rx.recv().await.unwrap().user_id(), Some(i));
    }

    store.unsubscribe(id);
    store.clear_user();
    assert!(rx.try_recv().is_err());
}
