//! CLI command implementations.

pub mod auth;
pub mod browse;
pub mod categories;
pub mod products;
pub mod render;

use std::io;

use product_desk_client::{
    AuthError, CatalogError, ConfigError, Operation, ResourceError, StartupError, StorageError,
    ValidationErrors,
};
use thiserror::Error;

/// Errors that end a command with a non-zero exit.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Startup failed: {0}")]
    Startup(#[from] StartupError),

    #[error("Login failed: {}", .0.login_message())]
    Auth(#[from] AuthError),

    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),

    /// Failure reported by a catalog operation, rendered as the resource
    /// message the store recorded.
    #[error("{0}")]
    Catalog(ResourceError),

    #[error("Invalid product: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("No product with slug {0}")]
    NotFound(String),

    #[error("Aborted")]
    Aborted,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    pub fn catalog(operation: Operation) -> impl FnOnce(CatalogError) -> Self {
        move |err| Self::Catalog(err.to_resource_error(operation))
    }
}
