//! Core types for Product Desk.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! catalog entities returned by the remote API.

pub mod catalog;
pub mod credential;
pub mod email;
pub mod id;
pub mod price;

pub use catalog::{Category, CategoryRef, Product, ProductPayload};
pub use credential::Credential;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
