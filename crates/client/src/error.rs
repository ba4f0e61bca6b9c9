//! Error types at the store boundary.
//!
//! Remote failures arrive as [`ApiError`]; stores wrap them in
//! [`CatalogError`] / [`AuthError`] for the caller and convert them into a
//! [`ResourceError`] that lives on the affected resource.

use product_desk_core::EmailError;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::form::ValidationErrors;
use crate::state::Operation;
use crate::storage::StorageError;

/// Message shown when list or detail fetches are rate limited.
pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests. Please try again later.";

/// Message recorded when an operation needs a credential and none is present.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Please log in to continue.";

/// Fallback message for a failed login without a server message.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Failure taxonomy shared by every resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkFailure,
    AuthorizationFailure,
    RateLimited,
    /// Client-side validation; never reaches the network.
    ValidationFailure,
    ServerError,
    MalformedResponse,
}

/// Error held in resource state, ready to render next to the resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ResourceError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors returned by catalog store operations.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// No credential is installed.
    #[error("not logged in")]
    NotAuthenticated,

    /// The payload failed client-side validation.
    #[error("invalid product: {0}")]
    Validation(#[from] ValidationErrors),

    /// The remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CatalogError {
    /// Taxonomy bucket for this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthenticated => ErrorKind::AuthorizationFailure,
            Self::Validation(_) => ErrorKind::ValidationFailure,
            Self::Api(err) => err.kind(),
        }
    }

    /// Convert into the error recorded on the resource `operation` targets.
    ///
    /// Prefers the server-supplied message and falls back to the operation's
    /// generic message. Rate limiting on list/detail fetches gets its own
    /// message.
    #[must_use]
    pub fn to_resource_error(&self, operation: Operation) -> ResourceError {
        let message = match self {
            Self::NotAuthenticated => NOT_AUTHENTICATED_MESSAGE.to_string(),
            Self::Validation(errors) => errors.to_string(),
            Self::Api(ApiError::RateLimited { .. }) if operation.reports_rate_limit() => {
                TOO_MANY_REQUESTS_MESSAGE.to_string()
            }
            Self::Api(err) => err
                .server_message()
                .unwrap_or_else(|| operation.fallback_message())
                .to_string(),
        };
        ResourceError::new(self.kind(), message)
    }
}

/// Errors returned by auth store operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Message recorded in auth state for a failed login.
    #[must_use]
    pub fn login_message(&self) -> String {
        match self {
            Self::InvalidEmail(err) => err.to_string(),
            Self::Api(err) => err
                .server_message()
                .unwrap_or(LOGIN_FAILED_MESSAGE)
                .to_string(),
            Self::Storage(_) => LOGIN_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Errors that prevent a [`Desk`](crate::Desk) from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
