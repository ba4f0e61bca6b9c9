//! Wiring for a complete client session.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::api::{CatalogApi, HttpCatalogApi};
use crate::auth::AuthStore;
use crate::config::ClientConfig;
use crate::coordinator::QueryCoordinator;
use crate::error::StartupError;
use crate::storage::{CredentialStorage, FileCredentialStorage};
use crate::store::CatalogStore;

/// The auth store and catalog store sharing one API client.
pub struct Desk<A = HttpCatalogApi> {
    auth: AuthStore<A>,
    catalog: CatalogStore<A>,
    search_debounce: Duration,
}

impl<A> Clone for Desk<A> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            catalog: self.catalog.clone(),
            search_debounce: self.search_debounce,
        }
    }
}

impl Desk<HttpCatalogApi> {
    /// Build the HTTP client and file storage from `config` and restore any
    /// persisted credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the token file
    /// exists but cannot be read.
    pub fn from_config(config: &ClientConfig) -> Result<Self, StartupError> {
        let api = HttpCatalogApi::new(&config.api)?;
        let storage = FileCredentialStorage::new(&config.token_file);
        let desk = Self::with_api(
            api,
            Arc::new(storage),
            config.page_size,
            config.search_debounce,
        );

        let restored = desk.auth.restore_on_start()?;
        info!(
            base_url = %config.api.base_url,
            restored,
            "Product desk ready"
        );
        Ok(desk)
    }
}

impl<A: CatalogApi> Desk<A> {
    /// Assemble a desk around an arbitrary API implementation. The credential
    /// is not restored; call `auth().restore_on_start()` if needed.
    #[must_use]
    pub fn with_api(
        api: A,
        storage: Arc<dyn CredentialStorage>,
        page_size: u32,
        search_debounce: Duration,
    ) -> Self {
        let auth = AuthStore::new(Arc::new(api), storage);
        let catalog = CatalogStore::new(auth.clone(), page_size);
        Self {
            auth,
            catalog,
            search_debounce,
        }
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthStore<A> {
        &self.auth
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogStore<A> {
        &self.catalog
    }

    /// A fresh coordinator driving this desk's catalog store.
    #[must_use]
    pub fn coordinator(&self) -> QueryCoordinator<A> {
        QueryCoordinator::new(self.catalog.clone(), self.search_debounce)
    }
}
