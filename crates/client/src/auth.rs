//! Auth state store.
//!
//! Holds the current credential and drives the login/logout lifecycle:
//!
//! ```text
//! Anonymous --login ok / restore--> Authenticated(token)
//! Authenticated(token) --logout--> Anonymous
//! ```
//!
//! There is no refresh or expiry handling; a token stays installed until an
//! explicit logout. An expired token surfaces as an authorization failure on
//! the catalog resource that used it.

use std::sync::Arc;

use product_desk_core::{Credential, Email};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::api::CatalogApi;
use crate::error::AuthError;
use crate::storage::{CredentialStorage, StorageError};

/// Whether a credential is installed.
#[derive(Debug, Clone, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(Credential),
}

/// Observable auth state.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub session: Session,
    /// A login request is in flight.
    pub loading: bool,
    /// Message from the last failed login.
    pub error: Option<String>,
}

impl AuthState {
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        match &self.session {
            Session::Authenticated(credential) => Some(credential),
            Session::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.session, Session::Authenticated(_))
    }
}

/// Handle to the auth store. Clones share state.
pub struct AuthStore<A> {
    inner: Arc<AuthStoreInner<A>>,
}

struct AuthStoreInner<A> {
    api: Arc<A>,
    storage: Arc<dyn CredentialStorage>,
    state: watch::Sender<AuthState>,
}

impl<A> Clone for AuthStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: CatalogApi> AuthStore<A> {
    /// Create an anonymous store. Call [`restore_on_start`](Self::restore_on_start)
    /// before issuing authenticated requests.
    #[must_use]
    pub fn new(api: Arc<A>, storage: Arc<dyn CredentialStorage>) -> Self {
        Self {
            inner: Arc::new(AuthStoreInner {
                api,
                storage,
                state: watch::Sender::new(AuthState::default()),
            }),
        }
    }

    /// API client shared with the catalog store.
    #[must_use]
    pub fn api(&self) -> &Arc<A> {
        &self.inner.api
    }

    /// Install the persisted credential, if any.
    ///
    /// Returns whether the store is now authenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if durable storage cannot be read.
    pub fn restore_on_start(&self) -> Result<bool, StorageError> {
        let Some(credential) = self.inner.storage.load()? else {
            return Ok(false);
        };

        self.inner.state.send_modify(|state| {
            state.session = Session::Authenticated(credential);
            state.error = None;
        });
        info!("Restored persisted credential");
        Ok(true)
    }

    /// Exchange `email` for a credential and persist it.
    ///
    /// Failures are recorded in [`AuthState::error`] and also returned. An
    /// address that does not parse never reaches the network.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is invalid or the API rejects the login.
    #[instrument(skip(self, email))]
    pub async fn login(&self, email: &str) -> Result<Credential, AuthError> {
        let email = match Email::parse(email) {
            Ok(email) => email,
            Err(e) => return Err(self.reject(AuthError::from(e))),
        };

        self.inner.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let credential = match self.inner.api.login(&email).await {
            Ok(credential) => credential,
            Err(e) => return Err(self.reject(AuthError::from(e))),
        };

        if let Err(e) = self.inner.storage.save(&credential) {
            // The session still works for this process
            warn!(error = %e, "Failed to persist credential");
        }

        let installed = credential.clone();
        self.inner.state.send_modify(|state| {
            state.session = Session::Authenticated(installed);
            state.loading = false;
            state.error = None;
        });
        info!(domain = %email.domain(), "Logged in");
        Ok(credential)
    }

    fn reject(&self, err: AuthError) -> AuthError {
        let message = err.login_message();
        warn!(error = %err, "Login failed");
        self.inner.state.send_modify(|state| {
            state.loading = false;
            state.error = Some(message);
        });
        err
    }

    /// Forget the credential in process state and durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if durable storage cannot be cleared. Process state is
    /// cleared regardless.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.inner.state.send_modify(|state| {
            state.session = Session::Anonymous;
            state.loading = false;
            state.error = None;
        });
        self.inner.storage.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Currently installed credential.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.inner.state.borrow().credential().cloned()
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Receive every subsequent state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }
}
