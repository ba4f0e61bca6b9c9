//! HTTP implementation of [`CatalogApi`] on top of `reqwest`.

use std::sync::Arc;

use product_desk_core::{
    Category, CategoryId, Credential, Email, Product, ProductId, ProductPayload,
};
use reqwest::RequestBuilder;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::{ApiError, extract_message};
use super::{CatalogApi, Page};
use crate::config::{ApiConfig, ConfigError};

/// Catalog API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct HttpCatalogApi {
    inner: Arc<HttpCatalogApiInner>,
}

struct HttpCatalogApiInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpCatalogApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalogApi")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
}

/// `GET /products/{slug}` answers with either shape depending on the backend version.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Box<Product>),
    Many(Vec<Product>),
}

#[derive(Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpCatalogApi {
    /// Create a client for the API at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry path segments or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "PRODUCT_DESK_API_URL".to_string(),
                format!("{} cannot be used as a base URL", config.base_url),
            ));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(HttpCatalogApiInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL from path segments (each segment is percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn paged_endpoint(&self, segments: &[&str], page: Page) -> Url {
        let mut url = self.endpoint(segments);
        url.query_pairs_mut()
            .append_pair("offset", &page.offset.to_string())
            .append_pair("limit", &page.limit.to_string());
        url
    }

    /// Send a request and return the body of a success response.
    async fn send(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(body)
        } else {
            let err = ApiError::from_status(status, &body);
            warn!(status = status.as_u16(), error = %err, "Catalog API request failed");
            Err(err)
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::send(request).await?;
        decode(&body)
    }

    fn authorized(request: RequestBuilder, token: &Credential) -> RequestBuilder {
        request.bearer_auth(token.expose())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

impl CatalogApi for HttpCatalogApi {
    #[instrument(skip(self, email), fields(domain = %email.domain()))]
    async fn login(&self, email: &Email) -> Result<Credential, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["auth"]))
            .json(&serde_json::json!({ "email": email.as_str() }));

        let response: AuthResponse = Self::send_json(request).await?;
        if response.token.trim().is_empty() {
            return Err(ApiError::MalformedResponse(
                "login response carried an empty token".to_string(),
            ));
        }

        debug!("Login accepted");
        Ok(Credential::new(response.token))
    }

    #[instrument(skip(self, token))]
    async fn list_products(&self, token: &Credential, page: Page) -> Result<Vec<Product>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.paged_endpoint(&["products"], page));
        let products: Vec<Product> = Self::send_json(Self::authorized(request, token)).await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    #[instrument(skip(self, token))]
    async fn product_by_slug(
        &self,
        token: &Credential,
        slug: &str,
    ) -> Result<Option<Product>, ApiError> {
        let request = self.inner.client.get(self.endpoint(&["products", slug]));
        let product = match Self::send_json(Self::authorized(request, token)).await? {
            OneOrMany::One(product) => Some(*product),
            OneOrMany::Many(products) => products.into_iter().next(),
        };
        Ok(product)
    }

    #[instrument(skip(self, token))]
    async fn search_products(&self, token: &Credential, text: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint(&["products", "search"]);
        url.query_pairs_mut().append_pair("searchedText", text);

        let request = self.inner.client.get(url);
        let products: Vec<Product> = Self::send_json(Self::authorized(request, token)).await?;
        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    #[instrument(skip(self, token), fields(category = %category_id))]
    async fn products_in_category(
        &self,
        token: &Credential,
        category_id: &CategoryId,
        page: Page,
    ) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint(&["products"]);
        url.query_pairs_mut()
            .append_pair("categoryId", category_id.as_str())
            .append_pair("offset", &page.offset.to_string())
            .append_pair("limit", &page.limit.to_string());

        let request = self.inner.client.get(url);
        Self::send_json(Self::authorized(request, token)).await
    }

    #[instrument(skip(self, token, payload), fields(name = %payload.name))]
    async fn create_product(
        &self,
        token: &Credential,
        payload: &ProductPayload,
    ) -> Result<Product, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(&["products"]))
            .json(payload);
        let product: Product = Self::send_json(Self::authorized(request, token)).await?;
        debug!(id = %product.id, slug = %product.slug, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, token, payload), fields(id = %id))]
    async fn update_product(
        &self,
        token: &Credential,
        id: &ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, ApiError> {
        let request = self
            .inner
            .client
            .put(self.endpoint(&["products", id.as_str()]))
            .json(payload);
        Self::send_json(Self::authorized(request, token)).await
    }

    #[instrument(skip(self, token), fields(id = %id))]
    async fn delete_product(&self, token: &Credential, id: &ProductId) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .delete(self.endpoint(&["products", id.as_str()]));
        let body = Self::send(Self::authorized(request, token)).await?;

        // An empty or non-object body on a success status counts as confirmation
        if let Ok(DeleteResponse {
            success: Some(false),
            message,
        }) = serde_json::from_str::<DeleteResponse>(&body)
        {
            return Err(ApiError::DeleteNotConfirmed {
                message: message.or_else(|| extract_message(&body)),
            });
        }

        debug!("Product deleted");
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn list_categories(&self, token: &Credential, page: Page) -> Result<Vec<Category>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.paged_endpoint(&["categories"], page));
        Self::send_json(Self::authorized(request, token)).await
    }
}
