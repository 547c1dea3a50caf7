//! Authenticated-session state machine.
//!
//! ```text
//! AnonymousIdle --AuthRequested--> AuthInProgress
//! AuthFailed    --AuthRequested--> AuthInProgress
//! AuthInProgress --AuthSucceeded(s)--> Authenticated(s)   [save snapshot]
//! AuthInProgress --AuthFailed-------> AuthFailed          [clear snapshot]
//! any            --Logout----------> AnonymousIdle        [clear snapshot]
//! ```
//!
//! Everything else is ignored: an outcome that arrives when no attempt is in
//! flight (for example after a logout) cannot resurrect a session, and a new
//! attempt cannot start while a session is active.
//!
//! [`AuthStatus::transition`] is pure. It reports what should happen to the
//! persisted snapshot as a [`PersistenceEffect`]; the [`SessionStore`] carries
//! that out through its injected [`SessionPersistence`].

mod persistence;
mod store;

pub use persistence::{
    FileSessionPersistence, MemorySessionPersistence, PersistenceError, SNAPSHOT_SLOT,
    SessionPersistence,
};
pub use store::SessionStore;

use std::fmt;

use serde::{Deserialize, Serialize};

use eliteshop_core::{Email, UserId};

/// Identity held after a successful login.
///
/// Serialized as the persisted snapshot:
/// `{"id": 1, "username": "...", "email": "...", "token": "..."}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    /// Opaque token returned by the auth API. Never validated locally.
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    #[default]
    AnonymousIdle,
    AuthInProgress,
    Authenticated(Session),
    AuthFailed,
}

/// Intents accepted by the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIntent {
    AuthRequested,
    AuthSucceeded(Session),
    AuthFailed,
    Logout,
}

/// What the store must do to the persisted snapshot after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceEffect {
    Save(Session),
    Clear,
}

/// Result of [`AuthStatus::transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub status: AuthStatus,
    pub effect: Option<PersistenceEffect>,
}

impl Transition {
    const fn stay(status: AuthStatus) -> Self {
        Self {
            status,
            effect: None,
        }
    }
}

impl AuthStatus {
    /// Compute the next status and the snapshot side effect for `intent`.
    #[must_use]
    pub fn transition(self, intent: SessionIntent) -> Transition {
        match (self, intent) {
            (Self::AnonymousIdle | Self::AuthFailed, SessionIntent::AuthRequested) => {
                Transition::stay(Self::AuthInProgress)
            }
            (Self::AuthInProgress, SessionIntent::AuthSucceeded(session)) => Transition {
                status: Self::Authenticated(session.clone()),
                effect: Some(PersistenceEffect::Save(session)),
            },
            (Self::AuthInProgress, SessionIntent::AuthFailed) => Transition {
                status: Self::AuthFailed,
                effect: Some(PersistenceEffect::Clear),
            },
            (_, SessionIntent::Logout) => Transition {
                status: Self::AnonymousIdle,
                effect: Some(PersistenceEffect::Clear),
            },
            (status, _) => Transition::stay(status),
        }
    }

    /// The active session, if authenticated.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Whether a login attempt is in flight (submit controls stay disabled).
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::AuthInProgress)
    }

    /// Short label for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AnonymousIdle => "anonymous_idle",
            Self::AuthInProgress => "auth_in_progress",
            Self::Authenticated(_) => "authenticated",
            Self::AuthFailed => "auth_failed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn session(username: &str) -> Session {
        Session {
            id: UserId::new(1),
            username: username.to_string(),
            email: Email::for_username(username).unwrap(),
            token: format!("token-{username}"),
        }
    }

    #[test]
    fn test_request_from_idle_and_failed() {
        for from in [AuthStatus::AnonymousIdle, AuthStatus::AuthFailed] {
            let t = from.transition(SessionIntent::AuthRequested);
            assert_eq!(t.status, AuthStatus::AuthInProgress);
            assert_eq!(t.effect, None);
        }
    }

    #[test]
    fn test_success_saves_snapshot() {
        let s = session("johnd");
        let t = AuthStatus::AuthInProgress.transition(SessionIntent::AuthSucceeded(s.clone()));
        assert_eq!(t.status, AuthStatus::Authenticated(s.clone()));
        assert_eq!(t.effect, Some(PersistenceEffect::Save(s)));
    }

    #[test]
    fn test_failure_clears_snapshot() {
        let t = AuthStatus::AuthInProgress.transition(SessionIntent::AuthFailed);
        assert_eq!(t.status, AuthStatus::AuthFailed);
        assert_eq!(t.effect, Some(PersistenceEffect::Clear));
    }

    #[test]
    fn test_logout_from_any_state() {
        let states = [
            AuthStatus::AnonymousIdle,
            AuthStatus::AuthInProgress,
            AuthStatus::Authenticated(session("johnd")),
            AuthStatus::AuthFailed,
        ];
        for from in states {
            let t = from.transition(SessionIntent::Logout);
            assert_eq!(t.status, AuthStatus::AnonymousIdle);
            assert_eq!(t.effect, Some(PersistenceEffect::Clear));
        }
    }

    #[test]
    fn test_stale_outcomes_are_ignored() {
        let t = AuthStatus::AnonymousIdle.transition(SessionIntent::AuthSucceeded(session("x")));
        assert_eq!(t, Transition::stay(AuthStatus::AnonymousIdle));

        let t = AuthStatus::AuthFailed.transition(SessionIntent::AuthFailed);
        assert_eq!(t, Transition::stay(AuthStatus::AuthFailed));
    }

    #[test]
    fn test_request_while_authenticated_is_ignored() {
        let active = AuthStatus::Authenticated(session("johnd"));
        let t = active.clone().transition(SessionIntent::AuthRequested);
        assert_eq!(t, Transition::stay(active));
    }

    #[test]
    fn test_request_while_in_progress_is_ignored() {
        let t = AuthStatus::AuthInProgress.transition(SessionIntent::AuthRequested);
        assert_eq!(t, Transition::stay(AuthStatus::AuthInProgress));
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let debug = format!("{:?}", session("johnd"));
        assert!(debug.contains("johnd"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("token-johnd"));
    }

    #[test]
    fn test_snapshot_shape() {
        let json = serde_json::to_value(session("johnd")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "username": "johnd",
                "email": "johnd@example.com",
                "token": "token-johnd",
            })
        );
    }
}
