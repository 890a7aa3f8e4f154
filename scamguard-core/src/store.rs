//! Session store - the single source of truth for "who is logged in"
//!
//! One instance is created at startup and shared by handle (`Arc`) with
//! every consumer. It holds the current [`SessionSnapshot`] and fans each
//! new snapshot out to subscribers synchronously, in publish order.
//!
//! The store performs no I/O and has no error channel. Only the auth
//! service writes to it; everything else reads or subscribes.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::{SessionSnapshot, User};

/// Returns `false` once the observer can no longer receive anything
type Callback = Arc<dyn Fn(&SessionSnapshot) -> bool + Send + Sync>;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // Stores whose fan-out is running on this thread
    static FANNING_OUT: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Handle returned by [`SessionStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

/// Observable holder of the current session snapshot
pub struct SessionStore {
    id: u64,
    // Held across replace + fan-out and across subscribe + replay, so
    // observers see snapshots in exactly the order they were published.
    publish_lock: Mutex<()>,
    current: RwLock<SessionSnapshot>,
    subscribers: Mutex<Subscribers>,
    // Snapshots published by observers while a fan-out is running
    deferred: Mutex<VecDeque<SessionSnapshot>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store in the initial logged-out state
    pub fn new() -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            publish_lock: Mutex::new(()),
            current: RwLock::new(SessionSnapshot::logged_out()),
            subscribers: Mutex::new(Subscribers::default()),
            deferred: Mutex::new(VecDeque::new()),
        }
    }

    // === Writes (auth service only) ===

    /// Replace the snapshot with `(user, true)`, or `(absent, false)` for `None`
    ///
    /// Passing `None` is the same as [`clear_user`](Self::clear_user).
    pub fn set_user(&self, user: Option<User>) {
        self.publish(SessionSnapshot::from_user(user));
    }

    /// Reset to `(absent, false)`
    pub fn clear_user(&self) {
        self.publish(SessionSnapshot::logged_out());
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        if self.fanning_out_here() {
            // The outer fan-out holds the lock and drains this queue
            debug!("Deferring session snapshot published from an observer");
            lock(&self.deferred).push_back(snapshot);
            return;
        }

        let _guard = lock(&self.publish_lock);
        let _scope = FanOutScope::enter(self.id);
        self.fan_out(snapshot);
        self.drain_deferred();
    }

    fn fan_out(&self, snapshot: SessionSnapshot) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot.clone();

        let callbacks: Vec<(u64, Callback)> = lock(&self.subscribers)
            .callbacks
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect();
        debug!(
            logged_in = snapshot.is_logged_in(),
            subscribers = callbacks.len(),
            "Publishing session snapshot"
        );

        let closed: Vec<u64> = callbacks
            .into_iter()
            .filter(|(_, callback)| !deliver(callback, &snapshot))
            .map(|(id, _)| id)
            .collect();
        self.remove_closed(&closed);
    }

    fn drain_deferred(&self) {
        loop {
            // Pop in its own statement; observers may push while we deliver
            let next = lock(&self.deferred).pop_front();
            match next {
                Some(snapshot) => self.fan_out(snapshot),
                None => break,
            }
        }
    }

    fn remove_closed(&self, closed: &[u64]) {
        if closed.is_empty() {
            return;
        }
        let mut subscribers = lock(&self.subscribers);
        for id in closed {
            subscribers.callbacks.remove(id);
        }
        debug!(removed = closed.len(), "Dropped closed session observers");
    }

    fn fanning_out_here(&self) -> bool {
        FANNING_OUT.with(|active| active.borrow().contains(&self.id))
    }

    // === Reads ===

    /// Latest published snapshot
    pub fn current_snapshot(&self) -> SessionSnapshot {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_snapshot().is_logged_in()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_snapshot().current_user().cloned()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.current_snapshot().user_id()
    }

    pub fn user_name(&self) -> Option<String> {
        self.current_snapshot().user_name().map(str::to_string)
    }

    pub fn is_elderly(&self) -> bool {
        self.current_snapshot().is_elderly()
    }

    // === Observation ===

    /// Attach an observer
    ///
    /// The callback receives the current snapshot before this returns,
    /// then every later snapshot in publish order. Callbacks run on the
    /// publishing thread. A callback may write to this store: the new
    /// snapshot is queued and delivered to everyone once the current
    /// fan-out finishes, so reads inside the callback still return the
    /// snapshot being delivered.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        self.register(Arc::new(move |snapshot: &SessionSnapshot| {
            callback(snapshot);
            true
        }))
    }

    fn register(&self, callback: Callback) -> SubscriptionId {
        if self.fanning_out_here() {
            // Subscribed from an observer; this thread already holds the lock
            return self.attach(callback);
        }

        let _guard = lock(&self.publish_lock);
        let _scope = FanOutScope::enter(self.id);
        let id = self.attach(callback);
        self.drain_deferred();
        id
    }

    fn attach(&self, callback: Callback) -> SubscriptionId {
        let id = {
            let mut subscribers = lock(&self.subscribers);
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.callbacks.insert(id, Arc::clone(&callback));
            id
        };

        if !deliver(&callback, &self.current_snapshot()) {
            self.remove_closed(&[id]);
        }
        SubscriptionId(id)
    }

    /// Detach an observer. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        lock(&self.subscribers).callbacks.remove(&id.0).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).callbacks.len()
    }

    /// Observe through an async channel instead of a callback
    ///
    /// Same guarantees as [`subscribe`](Self::subscribe): the current
    /// snapshot arrives first and nothing is skipped. Dropping the
    /// receiver detaches the subscription on the next publish.
    pub fn subscribe_channel(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<SessionSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.register(Arc::new(move |snapshot: &SessionSnapshot| {
            tx.send(snapshot.clone()).is_ok()
        }));
        (id, rx)
    }
}

/// Marks this thread as fanning out for one store until dropped
struct FanOutScope(u64);

impl FanOutScope {
    fn enter(store_id: u64) -> Self {
        FANNING_OUT.with(|active| active.borrow_mut().push(store_id));
        Self(store_id)
    }
}

impl Drop for FanOutScope {
    fn drop(&mut self) {
        FANNING_OUT.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|id| *id == self.0) {
                active.remove(pos);
            }
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run one observer, containing a panic so the others still get the snapshot
///
/// Returns whether the observer should stay attached.
fn deliver(callback: &Callback, snapshot: &SessionSnapshot) -> bool {
    panic::catch_unwind(AssertUnwindSafe(|| callback(snapshot))).unwrap_or_else(|_| {
        warn!("Session observer panicked; continuing fan-out");
        true
    })
}
