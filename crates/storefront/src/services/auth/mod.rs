//! Authentication service.
//!
//! Validates the login form, then drives the [`SessionStore`] through one
//! attempt: `AuthRequested`, the remote call, and `AuthSucceeded` or
//! `AuthFailed`. Network failures and rejected credentials both end as
//! `AuthFailed`; nothing is retried.

mod error;

pub use error::{FieldError, LoginError};

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use eliteshop_core::{Email, UserId};

use crate::api::Authenticator;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::session::{Session, SessionPersistence, SessionStore};

/// Minimum password length accepted by the form.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Public demo account of the store API.
pub const DEMO_USERNAME: &str = "mor_2314";
/// Password of the public demo account.
pub const DEMO_PASSWORD: &str = "83r5^_";

/// The auth API only returns a token, so every session gets this id.
pub const SYNTHETIC_USER_ID: UserId = UserId::new(1);

/// Credentials entered by the user.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: SecretString,
}

impl LoginForm {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Form pre-filled with the demo account.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(DEMO_USERNAME, DEMO_PASSWORD)
    }

    /// Check every field, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns the list of field errors if any field is invalid.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.push(FieldError::UsernameRequired);
        } else if username.len() > Email::MAX_USERNAME_LENGTH {
            // The session email is derived from the username and must stay valid
            errors.push(FieldError::UsernameTooLong {
                max: Email::MAX_USERNAME_LENGTH,
            });
        }

        let password = self.password.expose_secret();
        if password.is_empty() {
            errors.push(FieldError::PasswordRequired);
        } else if password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(FieldError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Run one login attempt against `authenticator`, recording the outcome in `store`.
///
/// Nothing is dispatched when the form is invalid.
///
/// # Errors
///
/// Returns `LoginError::InvalidForm` for a rejected form,
/// `LoginError::NotReady` if the store cannot start an attempt, and
/// `LoginError::Failed` when the API call fails for any reason.
#[instrument(skip_all, fields(username = %form.username.trim()))]
pub async fn login<A, P>(
    store: &mut SessionStore<P>,
    authenticator: &A,
    form: &LoginForm,
) -> Result<Session, LoginError>
where
    A: Authenticator,
    P: SessionPersistence,
{
    form.validate().map_err(LoginError::InvalidForm)?;

    store.auth_requested();
    if !store.is_loading() {
        return Err(LoginError::NotReady(store.status().name()));
    }

    let username = form.username.trim();
    let token = match authenticator.authenticate(username, &form.password).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "login failed");
            store.auth_failed();
            clear_sentry_user();
            return Err(LoginError::Failed(e));
        }
    };

    let email = match Email::for_username(username) {
        Ok(email) => email,
        Err(e) => {
            store.auth_failed();
            return Err(e.into());
        }
    };

    let session = Session {
        id: SYNTHETIC_USER_ID,
        username: username.to_string(),
        email,
        token: token.expose().to_string(),
    };

    store.auth_succeeded(session.clone());
    set_sentry_user(&session.id, Some(session.email.as_str()));
    info!("logged in");

    Ok(session)
}

/// End the current session, clearing the persisted snapshot.
pub fn logout<P: SessionPersistence>(store: &mut SessionStore<P>) {
    store.logout();
    clear_sentry_user();
    info!("logged out");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::api::{ApiError, AuthToken};
    use crate::session::{AuthStatus, MemorySessionPersistence};

    /// Accepts exactly one username/password pair.
    struct StubAuthenticator {
        username: &'static str,
        password: &'static str,
        calls: Cell<u32>,
    }

    impl StubAuthenticator {
        const fn demo() -> Self {
            Self {
                username: DEMO_USERNAME,
                password: DEMO_PASSWORD,
                calls: Cell::new(0),
            }
        }
    }

    impl Authenticator for StubAuthenticator {
        fn authenticate(
            &self,
            username: &str,
            password: &SecretString,
        ) -> impl Future<Output = Result<AuthToken, ApiError>> + Send {
            self.calls.set(self.calls.get() + 1);
            let ok = username == self.username && password.expose_secret() == self.password;
            async move {
                if ok {
                    Ok(AuthToken::new("stub-token"))
                } else {
                    Err(ApiError::InvalidCredentials(401))
                }
            }
        }
    }

    /// Fails every call as if the network were down.
    struct OfflineAuthenticator;

    impl Authenticator for OfflineAuthenticator {
        fn authenticate(
            &self,
            _username: &str,
            _password: &SecretString,
        ) -> impl Future<Output = Result<AuthToken, ApiError>> + Send {
            async {
                Err(ApiError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_validate_accepts_demo() {
        assert!(LoginForm::demo().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all_fields() {
        let errors = LoginForm::new("   ", "").validate().unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::UsernameRequired, FieldError::PasswordRequired]
        );
        assert_eq!(errors[0].field(), "username");
    }

    #[test]
    fn test_validate_short_password() {
        let errors = LoginForm::new("johnd", "12345").validate().unwrap_err();
        assert_eq!(errors, vec![FieldError::PasswordTooShort { min: 6 }]);
        assert_eq!(
            errors[0].to_string(),
            "Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_validate_username_length() {
        let longest = "u".repeat(Email::MAX_USERNAME_LENGTH);
        assert!(LoginForm::new(longest.clone(), DEMO_PASSWORD).validate().is_ok());

        let errors = LoginForm::new(format!("{longest}u"), DEMO_PASSWORD)
            .validate()
            .unwrap_err();
        assert_eq!(errors, vec![FieldError::UsernameTooLong { max: 242 }]);
        assert_eq!(errors[0].field(), "username");
    }

    #[tokio::test]
    async fn test_overlong_username_never_reaches_api() {
        let mut store = SessionStore::open(MemorySessionPersistence::new());
        let auth = StubAuthenticator::demo();
        let form = LoginForm::new("u".repeat(300), DEMO_PASSWORD);

        let err = login(&mut store, &auth, &form).await.unwrap_err();
        assert!(matches!(
            err,
            LoginError::InvalidForm(ref e) if e == &[FieldError::UsernameTooLong { max: 242 }]
        ));
        assert_eq!(store.status(), &AuthStatus::AnonymousIdle);
        assert_eq!(auth.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut store = SessionStore::open(MemorySessionPersistence::new());
        let auth = StubAuthenticator::demo();

        let session = login(&mut store, &auth, &LoginForm::demo()).await.unwrap();

        assert_eq!(session.id, SYNTHETIC_USER_ID);
        assert_eq!(session.username, DEMO_USERNAME);
        assert_eq!(session.email.as_str(), "mor_2314@example.com");
        assert_eq!(session.token, "stub-token");
        assert_eq!(store.status(), &AuthStatus::Authenticated(session.clone()));
        assert_eq!(store.persistence().snapshot(), Some(session));
    }

    #[tokio::test]
    async fn test_login_trims_username() {
        let mut store = SessionStore::open(MemorySessionPersistence::new());
        let auth = StubAuthenticator::demo();
        let form = LoginForm::new(format!("  {DEMO_USERNAME} "), DEMO_PASSWORD);

        let session = login(&mut store, &auth, &form).await.unwrap();
        assert_eq!(session.username, DEMO_USERNAME);
    }

    #[tokio::test]
    async fn test_login_wrong_password_then_retry() {
        let mut store = SessionStore::open(MemorySessionPersistence::new());
        let auth = StubAuthenticator::demo();

        let err = login(&mut store, &auth, &LoginForm::new(DEMO_USERNAME, "wrong-pass"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LoginError::Failed(ApiError::InvalidCredentials(401))
        ));
        assert_eq!(store.status(), &AuthStatus::AuthFailed);
        assert!(store.persistence().snapshot().is_none());

        login(&mut store, &auth, &LoginForm::demo()).await.unwrap();
        assert!(store.is_authenticated());
        assert_eq!(auth.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_network_failure_collapses_to_auth_failed() {
        let mut store = SessionStore::open(MemorySessionPersistence::new());
        let err = login(&mut store, &OfflineAuthenticator, &LoginForm::demo())
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::Failed(ApiError::Status { .. })));
        assert_eq!(store.status(), &AuthStatus::AuthFailed);
    }

    #[tokio::test]
    async fn test_invalid_form_dispatches_nothing() {
        let mut store = SessionStore::open(MemorySessionPersistence::new());
        let auth = StubAuthenticator::demo();

        let err = login(&mut store, &auth, &LoginForm::new("", "abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::InvalidForm(ref e) if e.len() == 2));
        assert_eq!(store.status(), &AuthStatus::AnonymousIdle);
        assert_eq!(auth.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_login_while_authenticated_is_rejected() {
        let mut store = SessionStore::open(MemorySessionPersistence::new());
        let auth = StubAuthenticator::demo();
        let first = login(&mut store, &auth, &LoginForm::demo()).await.unwrap();

        let err = login(&mut store, &auth, &LoginForm::demo())
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::NotReady("authenticated")));
        assert_eq!(store.current_user(), Some(&first));
        assert_eq!(auth.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_logout_after_login() {
        let mut store = SessionStore::open(MemorySessionPersistence::new());
        login(&mut store, &StubAuthenticator::demo(), &LoginForm::demo())
            .await
            .unwrap();

        logout(&mut store);
        assert_eq!(store.status(), &AuthStatus::AnonymousIdle);
        assert!(store.persistence().snapshot().is_none());
    }
}
