//! Product Desk Core - Shared domain types.
//!
//! This crate provides the types shared by every Product Desk component:
//! - `client` - HTTP client, stores and query coordination for the catalog API
//! - `cli` - Command-line front end (`desk`)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails and credentials, plus
//!   the catalog entities exchanged with the remote API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
