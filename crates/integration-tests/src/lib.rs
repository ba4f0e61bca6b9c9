//! Integration tests for Product Desk.
//!
//! Tests run the real HTTP client and stores against [`MockApi`], an in-process
//! `axum` server that mimics the catalog API on an ephemeral port. Nothing
//! outside the test process is required.
//!
//! ```bash
//! cargo test -p product-desk-integration-tests
//! ```
//!
//! The mock answers like the production API: `GET /products/{slug}` returns an
//! array, delete answers `{success}`, and catalog routes reject requests
//! without `Authorization: Bearer mock-token`. Any response can be overridden
//! with [`MockApi::respond_next`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{TimeZone, Utc};
use product_desk_client::{ApiConfig, ClientConfig};
use product_desk_core::{
    Category, CategoryId, CategoryRef, Product, ProductId, ProductPayload,
};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

/// The only token the mock accepts.
pub const TOKEN: &str = "mock-token";

type Shared = Arc<MockState>;

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    /// Decoded value of query parameter `key`.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

struct Scripted {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct MockState {
    products: Mutex<Vec<Product>>,
    categories: Mutex<Vec<Category>>,
    requests: Mutex<Vec<RecordedRequest>>,
    scripted: Mutex<VecDeque<Scripted>>,
    created: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Running mock catalog API. The server stops when this is dropped.
pub struct MockApi {
    url: Url,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Start a server on an ephemeral local port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Shared::default();
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no local address");

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let url = Url::parse(&format!("http://{addr}")).expect("Mock address is a valid URL");
        Self { url, state, server }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Client configuration pointing at this server.
    #[must_use]
    pub fn config(&self, token_file: impl Into<PathBuf>) -> ClientConfig {
        ClientConfig {
            api: ApiConfig {
                base_url: self.url.clone(),
                timeout: Some(Duration::from_secs(5)),
            },
            token_file: token_file.into(),
            page_size: 50,
            search_debounce: Duration::from_millis(50),
        }
    }

    pub fn seed_products(&self, products: Vec<Product>) {
        *lock(&self.state.products) = products;
    }

    pub fn seed_categories(&self, categories: Vec<Category>) {
        *lock(&self.state.categories) = categories;
    }

    /// Products as the server currently holds them.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.state.products).clone()
    }

    /// Answer the next request, whatever its route, with `status` and `body`.
    ///
    /// # Panics
    ///
    /// Panics if `status` is not a valid HTTP status code.
    pub fn respond_next(&self, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).expect("Invalid status code");
        lock(&self.state.scripted).push_back(Scripted {
            status,
            body: body.into(),
        });
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth", post(login))
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route(
            "/products/{key}",
            get(product_by_slug).put(update_product).delete(delete_product),
        )
        .route("/categories", get(list_categories))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
        .with_state(state)
}

/// Records every request and serves scripted responses ahead of the routes.
async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    lock(&state.requests).push(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_owned(),
        query: request.uri().query().map(str::to_owned),
        authorization,
    });

    let scripted = lock(&state.scripted).pop_front();
    if let Some(Scripted { status, body }) = scripted {
        return (status, body).into_response();
    }
    next.run(request).await
}

/// Extractor that rejects requests without the mock bearer token.
struct RequireBearer;

impl<S> FromRequestParts<S> for RequireBearer
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let expected = format!("Bearer {TOKEN}");
        match parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            Some(value) if value == expected => Ok(Self),
            _ => Err(error(StatusCode::UNAUTHORIZED, "Invalid or missing token")),
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn page<T: Clone>(items: &[T], params: &HashMap<String, String>) -> Vec<T> {
    let number = |key: &str, default: usize| {
        params
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    };
    items
        .iter()
        .skip(number("offset", 0))
        .take(number("limit", 10))
        .cloned()
        .collect()
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    if !email.contains('@') {
        return error(StatusCode::BAD_REQUEST, "Invalid email");
    }
    Json(json!({ "token": TOKEN })).into_response()
}

async fn list_products(
    _auth: RequireBearer,
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Product>> {
    let products = lock(&state.products);
    let matching: Vec<Product> = match params.get("categoryId") {
        Some(category_id) => products
            .iter()
            .filter(|p| p.category.as_ref().is_some_and(|c| c.id.as_str() == category_id))
            .cloned()
            .collect(),
        None => products.clone(),
    };
    Json(page(&matching, &params))
}

async fn search_products(
    _auth: RequireBearer,
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Product>> {
    let needle = params
        .get("searchedText")
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    let products = lock(&state.products)
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    Json(products)
}

async fn product_by_slug(
    _auth: RequireBearer,
    State(state): State<Shared>,
    Path(slug): Path<String>,
) -> Json<Vec<Product>> {
    let products = lock(&state.products)
        .iter()
        .filter(|p| p.slug == slug)
        .cloned()
        .collect();
    Json(products)
}

async fn create_product(
    _auth: RequireBearer,
    State(state): State<Shared>,
    Json(payload): Json<ProductPayload>,
) -> Response {
    let n = state.created.fetch_add(1, Ordering::Relaxed) + 1;
    let category = category_ref(&state, &payload.category_id);
    let mut created = product(&format!("created-{n}"), &payload.name, payload.category_id.as_str());
    created.slug = payload.name.to_lowercase().replace(' ', "-");
    created.description = payload.description;
    created.price = payload.price;
    created.images = payload.images;
    created.category = Some(category);

    lock(&state.products).push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_product(
    _auth: RequireBearer,
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Response {
    let category = category_ref(&state, &payload.category_id);
    let mut products = lock(&state.products);
    let Some(existing) = products.iter_mut().find(|p| p.id.as_str() == id) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };

    existing.name = payload.name;
    existing.description = payload.description;
    existing.price = payload.price;
    existing.images = payload.images;
    existing.category = Some(category);
    existing.updated_at = Utc::now();
    Json(existing.clone()).into_response()
}

async fn delete_product(
    _auth: RequireBearer,
    State(state): State<Shared>,
    Path(id): Path<String>,
) -> Json<Value> {
    let mut products = lock(&state.products);
    let before = products.len();
    products.retain(|p| p.id.as_str() != id);
    if products.len() == before {
        return Json(json!({ "success": false, "message": "Product not found" }));
    }
    Json(json!({ "success": true }))
}

async fn list_categories(
    _auth: RequireBearer,
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Category>> {
    Json(page(&lock(&state.categories), &params))
}

fn category_ref(state: &MockState, id: &CategoryId) -> CategoryRef {
    let name = lock(&state.categories)
        .iter()
        .find(|c| &c.id == id)
        .map(|c| c.name.clone())
        .unwrap_or_default();
    CategoryRef {
        id: id.clone(),
        name,
        image: None,
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A product with slug `<id>-slug`, price 10.00 and one remote image.
#[must_use]
pub fn product(id: &str, name: &str, category_id: &str) -> Product {
    let timestamp = Utc
        .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default();
    Product {
        id: ProductId::new(id),
        slug: format!("{id}-slug"),
        name: name.to_owned(),
        description: format!("{name} description"),
        price: "10.00".parse().unwrap_or_default(),
        images: vec![format!("https://cdn.test/{id}.png")],
        category: Some(CategoryRef {
            id: CategoryId::new(category_id),
            name: String::new(),
            image: None,
        }),
        created_at: timestamp,
        updated_at: timestamp,
    }
}

#[must_use]
pub fn category(id: &str, name: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_owned(),
        image: None,
    }
}
