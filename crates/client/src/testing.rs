//! In-memory [`CatalogApi`] used by unit tests.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use product_desk_core::{
    Category, CategoryId, CategoryRef, Credential, Email, Product, ProductId, ProductPayload,
};

use crate::api::{ApiError, CatalogApi, Page};

/// A request the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login(String),
    List(Page),
    BySlug(String),
    Search(String),
    Filter(CategoryId, Page),
    Create(String),
    Update(ProductId),
    Delete(ProductId),
    Categories(Page),
}

/// Scripted API: returns canned data, records calls, and fails or stalls on
/// demand.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    delays: Mutex<Vec<(Call, Duration)>>,
    products: Mutex<Vec<Product>>,
    categories: Mutex<Vec<Category>>,
    failure: Mutex<Option<ApiError>>,
}

impl FakeApi {
    pub const TOKEN: &'static str = "fake-token";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::new();
        *api.products.lock().unwrap_or_else(PoisonError::into_inner) = products;
        api
    }

    pub fn set_categories(&self, categories: Vec<Category>) {
        *self.categories.lock().unwrap_or_else(PoisonError::into_inner) = categories;
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: ApiError) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
    }

    /// Hold every answer to `call` for `by` after it is received.
    pub fn delay(&self, call: Call, by: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((call, by));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .map_or(Ok(()), Err)
    }

    async fn respond(&self, call: Call) -> Result<(), ApiError> {
        let delay = self
            .delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(delayed, _)| delayed == &call)
            .map(|(_, by)| *by);
        self.record(call)?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn products(&self) -> Vec<Product> {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CatalogApi for FakeApi {
    async fn login(&self, email: &Email) -> Result<Credential, ApiError> {
        self.respond(Call::Login(email.to_string())).await?;
        Ok(Credential::new(Self::TOKEN))
    }

    async fn list_products(&self, _token: &Credential, page: Page) -> Result<Vec<Product>, ApiError> {
        self.respond(Call::List(page)).await?;
        Ok(paged(self.products(), page))
    }

    async fn product_by_slug(
        &self,
        _token: &Credential,
        slug: &str,
    ) -> Result<Option<Product>, ApiError> {
        self.respond(Call::BySlug(slug.to_string())).await?;
        Ok(self.products().into_iter().find(|p| p.slug == slug))
    }

    async fn search_products(&self, _token: &Credential, text: &str) -> Result<Vec<Product>, ApiError> {
        self.respond(Call::Search(text.to_string())).await?;
        let needle = text.to_lowercase();
        Ok(self
            .products()
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn products_in_category(
        &self,
        _token: &Credential,
        category_id: &CategoryId,
        page: Page,
    ) -> Result<Vec<Product>, ApiError> {
        self.respond(Call::Filter(category_id.clone(), page)).await?;
        let matching = self
            .products()
            .into_iter()
            .filter(|p| p.category.as_ref().is_some_and(|c| &c.id == category_id))
            .collect();
        Ok(paged(matching, page))
    }

    async fn create_product(
        &self,
        _token: &Credential,
        payload: &ProductPayload,
    ) -> Result<Product, ApiError> {
        self.respond(Call::Create(payload.name.clone())).await?;
        let mut created = product(&format!("new-{}", payload.name.to_lowercase()), &payload.name);
        created.price = payload.price;
        created.images.clone_from(&payload.images);
        Ok(created)
    }

    async fn update_product(
        &self,
        _token: &Credential,
        id: &ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ApiError> {
        self.respond(Call::Update(id.clone())).await?;
        let mut updated = product(id.as_str(), &payload.name);
        updated.price = payload.price;
        Ok(updated)
    }

    async fn delete_product(&self, _token: &Credential, id: &ProductId) -> Result<(), ApiError> {
        self.respond(Call::Delete(id.clone())).await
    }

    async fn list_categories(&self, _token: &Credential, page: Page) -> Result<Vec<Category>, ApiError> {
        self.respond(Call::Categories(page)).await?;
        Ok(self
            .categories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

fn paged(products: Vec<Product>, page: Page) -> Vec<Product> {
    products
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

/// A valid product with `id`, slug `<id>-slug` and category `c1`.
pub fn product(id: &str, name: &str) -> Product {
    let created = Utc
        .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_default();
    Product {
        id: ProductId::new(id),
        slug: format!("{id}-slug"),
        name: name.to_string(),
        description: format!("{name} description"),
        price: "10.50".parse().unwrap_or_default(),
        images: vec![format!("https://cdn.test/{id}.png")],
        category: Some(CategoryRef {
            id: CategoryId::new("c1"),
            name: "General".to_string(),
            image: None,
        }),
        created_at: created,
        updated_at: created,
    }
}

/// A payload that passes validation.
pub fn payload(name: &str) -> ProductPayload {
    ProductPayload {
        name: name.to_string(),
        description: "Useful".to_string(),
        price: "5".parse().unwrap_or_default(),
        images: vec!["https://cdn.test/p.png".to_string()],
        category_id: CategoryId::new("c1"),
    }
}
