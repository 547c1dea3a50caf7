//! Session commands: login, logout, whoami.

use eliteshop_storefront::error::Result;
use eliteshop_storefront::services::auth::{self, LoginForm};
use eliteshop_storefront::session::SessionPersistence;
use eliteshop_storefront::state::AppState;

/// Sign in and persist the session.
///
/// # Errors
///
/// Returns an error if the form is invalid, a session is already active, or
/// the credentials are rejected.
#[allow(clippy::print_stdout)]
pub async fn login<P: SessionPersistence>(
    state: &mut AppState<P>,
    username: String,
    password: String,
    demo: bool,
) -> Result<()> {
    let form = if demo {
        LoginForm::demo()
    } else {
        LoginForm::new(username, password)
    };

    let (client, store) = state.client_and_session();
    let session = auth::login(store, client, &form).await?;

    println!("Signed in as {} <{}>", session.username, session.email);
    Ok(())
}

/// Sign out. Safe to run when nobody is signed in.
#[allow(clippy::print_stdout)]
pub fn logout<P: SessionPersistence>(state: &mut AppState<P>) {
    auth::logout(state.session_mut());
    println!("Signed out");
}

/// Print the signed-in user.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` when nobody is signed in.
#[allow(clippy::print_stdout)]
pub fn whoami<P>(state: &AppState<P>) -> Result<()> {
    let session = state.session().require_session()?;
    println!("{} <{}> (id {})", session.username, session.email, session.id);
    Ok(())
}
