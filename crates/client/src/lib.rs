//! Product Desk Client - state synchronization for the catalog API.
//!
//! This crate mediates between a front end and the remote catalog API:
//!
//! - [`api`] - authenticated HTTP client behind the [`CatalogApi`] trait
//! - [`storage`] - durable credential persistence
//! - [`auth`] - login/logout lifecycle and the current credential
//! - [`store`] - product list, product detail and categories with independent
//!   loading/error state
//! - [`coordinator`] - reconciles search, category filter and pagination into
//!   one active query, with debounced text input
//! - [`form`] - client-side product form validation
//!
//! # Architecture
//!
//! Stores are cheap clonable handles over a `tokio::sync::watch` channel.
//! Front ends call operations (or spawn them) and re-render from the snapshot
//! they receive through [`CatalogStore::subscribe`] / [`AuthStore::subscribe`].
//! State is only mutated by the completion of each store operation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod form;
pub mod state;
pub mod storage;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, CatalogApi, HttpCatalogApi, Page};
pub use app::Desk;
pub use auth::{AuthState, AuthStore, Session};
pub use config::{ApiConfig, ClientConfig, ConfigError};
pub use coordinator::{CatalogQuery, PendingQuery, QueryCoordinator, QueryInputs};
pub use error::{AuthError, CatalogError, ErrorKind, ResourceError, StartupError};
pub use form::{ProductDraft, ProductField, ValidationErrors};
pub use state::{CatalogState, Operation, Resource, ResourceKind};
pub use storage::{CredentialStorage, FileCredentialStorage, MemoryCredentialStorage, StorageError};
pub use store::CatalogStore;
