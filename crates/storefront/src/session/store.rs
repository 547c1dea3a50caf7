//! Session store: current [`AuthStatus`] plus the injected snapshot slot.

use tracing::{debug, info, warn};

use super::{AuthStatus, PersistenceEffect, Session, SessionIntent, SessionPersistence};
use crate::error::AppError;
use crate::observer::{SubscriptionId, Subscribers};

/// Injectable session container.
///
/// Transitions are computed by [`AuthStatus::transition`]; this type applies
/// the resulting snapshot effect and notifies subscribers. Storage failures
/// are logged and never change the in-memory outcome.
#[derive(Debug)]
pub struct SessionStore<P> {
    status: AuthStatus,
    persistence: P,
    subscribers: Subscribers<AuthStatus>,
}

impl<P: SessionPersistence> SessionStore<P> {
    /// Rehydrate from `persistence`.
    ///
    /// Starts `Authenticated` when a snapshot loads and `AnonymousIdle`
    /// otherwise, including when the slot cannot be read. The snapshot is
    /// trusted as-is; the remote API rejects stale tokens on its own.
    pub fn open(persistence: P) -> Self {
        let status = match persistence.load() {
            Ok(Some(session)) => {
                info!(username = %session.username, "restored session snapshot");
                AuthStatus::Authenticated(session)
            }
            Ok(None) => AuthStatus::AnonymousIdle,
            Err(e) => {
                warn!(error = %e, "failed to read session snapshot; starting anonymous");
                AuthStatus::AnonymousIdle
            }
        };

        Self {
            status,
            persistence,
            subscribers: Subscribers::new(),
        }
    }

    /// Apply an intent, update the snapshot slot, and notify on change.
    pub fn dispatch(&mut self, intent: SessionIntent) {
        let from = self.status.name();
        let transition = self.status.clone().transition(intent);

        if let Some(effect) = transition.effect {
            self.apply_effect(&effect);
        }

        if transition.status == self.status {
            debug!(status = from, "session intent ignored");
            return;
        }

        debug!(from, to = transition.status.name(), "session transition");
        self.status = transition.status;
        self.subscribers.notify(&self.status);
    }

    pub fn auth_requested(&mut self) {
        self.dispatch(SessionIntent::AuthRequested);
    }

    pub fn auth_succeeded(&mut self, session: Session) {
        self.dispatch(SessionIntent::AuthSucceeded(session));
    }

    pub fn auth_failed(&mut self) {
        self.dispatch(SessionIntent::AuthFailed);
    }

    pub fn logout(&mut self) {
        self.dispatch(SessionIntent::Logout);
    }

    fn apply_effect(&self, effect: &PersistenceEffect) {
        let result = match effect {
            PersistenceEffect::Save(session) => self.persistence.save(session),
            PersistenceEffect::Clear => self.persistence.clear(),
        };
        if let Err(e) = result {
            warn!(error = %e, "session snapshot update failed");
        }
    }
}

impl<P> SessionStore<P> {
    #[must_use]
    pub const fn status(&self) -> &AuthStatus {
        &self.status
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&Session> {
        self.status.session()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.status.is_authenticated()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    /// The active session, for views that require a login.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when nobody is logged in.
    pub fn require_session(&self) -> Result<&Session, AppError> {
        self.current_user()
            .ok_or_else(|| AppError::Unauthorized("login required".to_string()))
    }

    /// The injected snapshot slot.
    #[must_use]
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Register a callback run after each status change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&AuthStatus) + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use crate::session::tests::session;
    use crate::session::{FileSessionPersistence, MemorySessionPersistence, PersistenceError};

    /// Slot whose every operation fails.
    struct BrokenSlot;

    impl SessionPersistence for BrokenSlot {
        fn load(&self) -> Result<Option<Session>, PersistenceError> {
            Err(io::Error::other("disk on fire").into())
        }

        fn save(&self, _: &Session) -> Result<(), PersistenceError> {
            Err(io::Error::other("disk on fire").into())
        }

        fn clear(&self) -> Result<(), PersistenceError> {
            Err(io::Error::other("disk on fire").into())
        }
    }

    #[test]
    fn test_open_empty_is_anonymous() {
        let store = SessionStore::open(MemorySessionPersistence::new());
        assert_eq!(store.status(), &AuthStatus::AnonymousIdle);
        assert!(store.require_session().is_err());
    }

    #[test]
    fn test_open_rehydrates_snapshot() {
        let store = SessionStore::open(MemorySessionPersistence::with_snapshot(session("johnd")));
        assert!(store.is_authenticated());
        assert_eq!(store.require_session().unwrap().username, "johnd");
    }

    #[test]
    fn test_open_unreadable_slot_is_anonymous() {
        let store = SessionStore::open(BrokenSlot);
        assert_eq!(store.status(), &AuthStatus::AnonymousIdle);
    }

    #[test]
    fn test_failed_then_successful_login() {
        let mut store = SessionStore::open(MemorySessionPersistence::new());

        store.auth_requested();
        assert!(store.is_loading());
        store.auth_failed();
        assert_eq!(store.status(), &AuthStatus::AuthFailed);
        assert!(store.persistence().snapshot().is_none());

        store.auth_requested();
        store.auth_succeeded(session("johnd"));
        assert_eq!(store.status(), &AuthStatus::Authenticated(session("johnd")));
        assert_eq!(store.persistence().snapshot(), Some(session("johnd")));
    }

    #[test]
    fn test_logout_twice_clears_snapshot() {
        let mut store =
            SessionStore::open(MemorySessionPersistence::with_snapshot(session("johnd")));

        store.logout();
        assert_eq!(store.status(), &AuthStatus::AnonymousIdle);
        assert!(store.persistence().snapshot().is_none());

        store.persistence().save(&session("stray")).unwrap();
        store.logout();
        assert_eq!(store.status(), &AuthStatus::AnonymousIdle);
        assert!(store.persistence().snapshot().is_none());
    }

    #[test]
    fn test_storage_failure_does_not_block_login() {
        let mut store = SessionStore::open(BrokenSlot);
        store.auth_requested();
        store.auth_succeeded(session("johnd"));
        assert!(store.is_authenticated());
        store.logout();
        assert_eq!(store.status(), &AuthStatus::AnonymousIdle);
    }

    #[test]
    fn test_subscribers_see_status_changes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = SessionStore::open(MemorySessionPersistence::new());
        let sink = Rc::clone(&seen);
        store.subscribe(move |status| sink.borrow_mut().push(status.name()));

        store.auth_requested();
        store.auth_requested(); // ignored
        store.auth_succeeded(session("johnd"));
        store.logout();
        store.logout(); // status unchanged

        assert_eq!(
            *seen.borrow(),
            vec!["auth_in_progress", "authenticated", "anonymous_idle"]
        );
    }

    #[test]
    fn test_snapshot_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.json");

        let mut store = SessionStore::open(FileSessionPersistence::new(&path));
        store.auth_requested();
        store.auth_succeeded(session("johnd"));
        drop(store);

        let mut reopened = SessionStore::open(FileSessionPersistence::new(&path));
        assert_eq!(reopened.current_user(), Some(&session("johnd")));

        reopened.logout();
        drop(reopened);
        let fresh = SessionStore::open(FileSessionPersistence::new(&path));
        assert!(!fresh.is_authenticated());
    }
}
