//! Application state owned by the front-end.
//!
//! Both stores are single-owner: subscribers are plain closures and every
//! operation runs to completion before the next one starts.

use crate::api::FakeStoreClient;
use crate::cart::CartStore;
use crate::config::ShopConfig;
use crate::error::Result;
use crate::session::{FileSessionPersistence, SessionPersistence, SessionStore};

/// Everything a command needs: configuration, the API client and both stores.
pub struct AppState<P = FileSessionPersistence> {
    config: ShopConfig,
    client: FakeStoreClient,
    cart: CartStore,
    session: SessionStore<P>,
}

impl AppState {
    /// Create the application state, rehydrating the session from the
    /// configured snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ShopConfig) -> Result<Self> {
        let persistence = FileSessionPersistence::new(config.session_file.clone());
        Self::with_persistence(config, persistence)
    }
}

impl<P: SessionPersistence> AppState<P> {
    /// Create the application state over an explicit snapshot slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_persistence(config: ShopConfig, persistence: P) -> Result<Self> {
        let client = FakeStoreClient::new(&config.api)?;

        Ok(Self {
            config,
            client,
            cart: CartStore::new(),
            session: SessionStore::open(persistence),
        })
    }
}

impl<P> AppState<P> {
    /// Get a reference to the configuration.
    #[must_use]
    pub const fn config(&self) -> &ShopConfig {
        &self.config
    }

    /// Get a reference to the store API client.
    #[must_use]
    pub const fn client(&self) -> &FakeStoreClient {
        &self.client
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore<P> {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut SessionStore<P> {
        &mut self.session
    }

    /// Borrow the client and the session store together, for the login flow.
    pub const fn client_and_session(&mut self) -> (&FakeStoreClient, &mut SessionStore<P>) {
        (&self.client, &mut self.session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::config::ApiConfig;
    use crate::session::MemorySessionPersistence;
    use crate::session::tests::session;

    fn config() -> ShopConfig {
        ShopConfig {
            api: ApiConfig {
                base_url: Url::parse("https://fakestoreapi.com/").unwrap(),
                catalog_cache_ttl: Duration::from_secs(300),
                timeout: Duration::from_secs(10),
            },
            session_file: PathBuf::from("unused.json"),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_state_rehydrates_session() {
        let snapshot = session("johnd");
        let persistence = MemorySessionPersistence::with_snapshot(snapshot.clone());
        let state = AppState::with_persistence(config(), persistence).unwrap();

        assert_eq!(state.session().current_user(), Some(&snapshot));
        assert!(state.cart().lines().is_empty());
    }

    #[test]
    fn test_state_starts_anonymous() {
        let mut state =
            AppState::with_persistence(config(), MemorySessionPersistence::new()).unwrap();
        assert!(!state.session().is_authenticated());

        let (_, session_store) = state.client_and_session();
        session_store.auth_requested();
        assert!(state.session().is_loading());
    }
}
