//! Remote catalog API.
//!
//! [`CatalogApi`] is the seam between the stores and the network. The
//! production implementation is [`HttpCatalogApi`]; tests drive the stores with
//! in-memory implementations.
//!
//! # Endpoints
//!
//! | Call | Request |
//! |------|---------|
//! | login | `POST /auth` |
//! | list products | `GET /products?offset&limit` |
//! | product by slug | `GET /products/{slug}` |
//! | search | `GET /products/search?searchedText=` |
//! | filter | `GET /products?categoryId&offset&limit` |
//! | create | `POST /products` |
//! | update | `PUT /products/{id}` |
//! | delete | `DELETE /products/{id}` |
//! | categories | `GET /categories?offset&limit` |
//!
//! Every call except login carries `Authorization: Bearer <token>`.

mod client;
mod error;

use std::future::Future;

use product_desk_core::{
    Category, CategoryId, Credential, Email, Product, ProductId, ProductPayload,
};

pub use client::HttpCatalogApi;
pub use error::ApiError;

/// Default number of entries requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Offset/limit pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl Page {
    #[must_use]
    pub const fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Operations offered by the remote catalog API.
///
/// Implementations normalize every failure into an [`ApiError`] before it
/// reaches store logic.
pub trait CatalogApi: Send + Sync + 'static {
    /// Exchange an email address for a bearer token.
    fn login(&self, email: &Email) -> impl Future<Output = Result<Credential, ApiError>> + Send;

    /// Fetch one page of the unfiltered product list.
    fn list_products(
        &self,
        token: &Credential,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Fetch a single product by slug. `None` means the API found nothing.
    fn product_by_slug(
        &self,
        token: &Credential,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Product>, ApiError>> + Send;

    /// Free-text product search.
    fn search_products(
        &self,
        token: &Credential,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Fetch one page of products in a category.
    fn products_in_category(
        &self,
        token: &Credential,
        category_id: &CategoryId,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    fn create_product(
        &self,
        token: &Credential,
        payload: &ProductPayload,
    ) -> impl Future<Output = Result<Product, ApiError>> + Send;

    fn update_product(
        &self,
        token: &Credential,
        id: &ProductId,
        payload: &ProductPayload,
    ) -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// Delete a product. Succeeds only when the API confirms the deletion.
    fn delete_product(
        &self,
        token: &Credential,
        id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn list_categories(
        &self,
        token: &Credential,
        page: Page,
    ) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;
}
