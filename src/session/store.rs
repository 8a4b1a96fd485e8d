//! In-memory session store with ordered change notification

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::types::SessionState;

type Observer = Arc<dyn Fn(&SessionState) + Send + Sync>;

struct Inner {
    /// Serializes `set` so notifications arrive in the order states were written
    writer: Mutex<()>,
    state: Mutex<SessionState>,
    observers: Mutex<Vec<(u64, Observer)>>,
    next_id: Mutex<u64>,
}

/// Session store
///
/// Cheap to clone; all clones share the same state and subscriber list.
///
/// Observers run synchronously inside [`SessionStore::set`], after the state
/// lock is released, in the order they subscribed. Concurrent `set` calls are
/// serialized, so the last notification always matches [`SessionStore::get`].
/// An observer must not call `set` on the same store from within its own
/// notification.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionState::anonymous())
    }
}

impl SessionStore {
    pub fn new(initial: SessionState) -> Self {
        Self {
            inner: Arc::new(Inner {
                writer: Mutex::new(()),
                state: Mutex::new(initial),
                observers: Mutex::new(Vec::new()),
                next_id: Mutex::new(0),
            }),
        }
    }

    /// Snapshot of the current state
    pub fn get(&self) -> SessionState {
        self.inner.state.lock().clone()
    }

    /// Replace the state and notify subscribers
    pub fn set(&self, next: SessionState) {
        let _writer = self.inner.writer.lock();
        {
            let mut state = self.inner.state.lock();
            *state = next.clone();
        }

        // Snapshot the list so observers may subscribe/unsubscribe freely
        let observers: Vec<Observer> = self
            .inner
            .observers
            .lock()
            .iter()
            .map(|(_, o)| o.clone())
            .collect();

        for observer in observers {
            observer(&next);
        }
    }

    /// Register an observer; it stays registered until the returned handle
    /// is dropped or [`Subscription::unsubscribe`] is called
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let id = {
            let mut next_id = self.inner.next_id.lock();
            *next_id += 1;
            *next_id
        };
        let observer: Observer = Arc::new(observer);
        self.inner.observers.lock().push((id, observer));

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.observers.lock().len()
    }
}

/// Handle returned by [`SessionStore::subscribe`]
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.observers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::UserInfo;
    use serde_json::json;

    fn signed_in() -> SessionState {
        SessionState::authenticated(UserInfo::new(json!({"sub": "demo"})))
    }

    #[test]
    fn test_default_store_is_anonymous() {
        let store = SessionStore::default();
        assert_eq!(store.get(), SessionState::anonymous());
    }

    #[test]
    fn test_set_then_get() {
        let store = SessionStore::default();
        store.set(signed_in());
        assert!(store.get().is_authenticated());
    }

    #[test]
    fn test_observers_notified_in_registration_order() {
        let store = SessionStore::default();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let c1 = calls.clone();
        let _s1 = store.subscribe(move |state| c1.lock().push(("first", state.is_authenticated())));
        let c2 = calls.clone();
        let _s2 = store.subscribe(move |state| c2.lock().push(("second", state.is_authenticated())));

        store.set(signed_in());
        store.set(SessionState::anonymous());

        assert_eq!(
            *calls.lock(),
            vec![
                ("first", true),
                ("second", true),
                ("first", false),
                ("second", false)
            ]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = SessionStore::default();
        let count = Arc::new(Mutex::new(0));

        let c = count.clone();
        let sub = store.subscribe(move |_| *c.lock() += 1);
        store.set(signed_in());
        sub.unsubscribe();
        store.set(SessionState::anonymous());

        assert_eq!(*count.lock(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_dropped_subscription_is_removed() {
        let store = SessionStore::default();
        {
            let _sub = store.subscribe(|_| {});
            assert_eq!(store.subscriber_count(), 1);
        }
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_observer_sees_new_state_via_get() {
        let store = SessionStore::default();
        let seen = Arc::new(Mutex::new(None));

        let reader = store.clone();
        let s = seen.clone();
        let _sub = store.subscribe(move |_| *s.lock() = Some(reader.get().is_authenticated()));

        store.set(signed_in());
        assert_eq!(*seen.lock(), Some(true));
    }

    #[test]
    fn test_concurrent_sets_notify_in_write_order() {
        let store = SessionStore::default();
        let last_seen = Arc::new(Mutex::new(None));

        let seen = last_seen.clone();
        let _sub = store.subscribe(move |state| *seen.lock() = Some(state.clone()));

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for n in 0..200 {
                        if (i + n) % 2 == 0 {
                            store.set(signed_in());
                        } else {
                            store.set(SessionState::anonymous());
                        }
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(last_seen.lock().clone(), Some(store.get()));
    }

    #[test]
    fn test_invariant_holds_after_every_set() {
        let store = SessionStore::default();
        let _sub = store.subscribe(|state| {
            if state.is_authenticated() {
                assert!(state.user_info().is_some());
            }
        });
        store.set(signed_in());
        store.set(SessionState::anonymous());
        store.set(signed_in());
    }
}
