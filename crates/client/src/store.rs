//! Product catalog store.
//!
//! Every operation follows the same pattern: mark the target resource
//! loading, perform the request, then either merge the response and clear the
//! error, or record a [`ResourceError`](crate::ResourceError) and clear
//! loading. Nothing is retried.
//!
//! Overlapping requests are not de-duplicated: each applies its own result on
//! completion, so the last response to resolve wins.

use std::sync::Arc;

use product_desk_core::{CategoryId, Credential, Product, ProductId, ProductPayload};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::api::{CatalogApi, Page};
use crate::auth::AuthStore;
use crate::coordinator::CatalogQuery;
use crate::error::CatalogError;
use crate::form::validate_payload;
use crate::state::{CatalogState, Operation};

/// Handle to the catalog store. Clones share state.
pub struct CatalogStore<A> {
    inner: Arc<CatalogStoreInner<A>>,
}

struct CatalogStoreInner<A> {
    auth: AuthStore<A>,
    state: watch::Sender<CatalogState>,
    page_size: u32,
}

impl<A> Clone for CatalogStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: CatalogApi> CatalogStore<A> {
    /// Create an empty store that authenticates through `auth`.
    #[must_use]
    pub fn new(auth: AuthStore<A>, page_size: u32) -> Self {
        Self {
            inner: Arc::new(CatalogStoreInner {
                auth,
                state: watch::Sender::new(CatalogState::default()),
                page_size,
            }),
        }
    }

    /// Default page size for paged operations.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.inner.page_size
    }

    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.inner.state.borrow().clone()
    }

    /// Receive every subsequent state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.inner.state.subscribe()
    }

    fn api(&self) -> &A {
        self.inner.auth.api()
    }

    fn token(&self) -> Result<Credential, CatalogError> {
        self.inner
            .auth
            .credential()
            .ok_or(CatalogError::NotAuthenticated)
    }

    fn begin(&self, operation: Operation) {
        self.inner
            .state
            .send_modify(|state| state.begin(operation.resource()));
    }

    fn commit(&self, apply: impl FnOnce(&mut CatalogState)) {
        self.inner.state.send_modify(apply);
    }

    /// Record `err` on the resource `operation` targets and hand it back.
    fn reject(&self, operation: Operation, err: CatalogError) -> CatalogError {
        let resource_error = err.to_resource_error(operation);
        warn!(?operation, error = %err, "Catalog operation failed");
        self.inner
            .state
            .send_modify(|state| state.fail(operation.resource(), resource_error));
        err
    }

    /// Replace the list with one page of all products.
    ///
    /// Returns the number of products loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is installed or the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_list(&self, offset: u32, limit: u32) -> Result<usize, CatalogError> {
        self.begin(Operation::FetchList);
        let result = async {
            let token = self.token()?;
            Ok::<_, CatalogError>(self.api().list_products(&token, Page::new(offset, limit)).await?)
        }
        .await;

        match result {
            Ok(products) => {
                let count = products.len();
                self.commit(|state| state.products.succeed(products));
                debug!(count, "Product list loaded");
                Ok(count)
            }
            Err(err) => Err(self.reject(Operation::FetchList, err)),
        }
    }

    /// Load the detail product by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is installed or the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        self.begin(Operation::FetchBySlug);
        let result = async {
            let token = self.token()?;
            Ok::<_, CatalogError>(self.api().product_by_slug(&token, slug).await?)
        }
        .await;

        match result {
            Ok(product) => {
                let loaded = product.clone();
                self.commit(|state| state.product.succeed(loaded));
                Ok(product)
            }
            Err(err) => Err(self.reject(Operation::FetchBySlug, err)),
        }
    }

    /// Replace the list with free-text search results.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is installed or the request fails.
    #[instrument(skip(self))]
    pub async fn search_by_text(&self, text: &str) -> Result<usize, CatalogError> {
        self.begin(Operation::SearchByText);
        let result = async {
            let token = self.token()?;
            Ok::<_, CatalogError>(self.api().search_products(&token, text).await?)
        }
        .await;

        match result {
            Ok(products) => {
                let count = products.len();
                self.commit(|state| state.products.succeed(products));
                Ok(count)
            }
            Err(err) => Err(self.reject(Operation::SearchByText, err)),
        }
    }

    /// Replace the list with one page of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is installed or the request fails.
    #[instrument(skip(self), fields(category = %category_id))]
    pub async fn filter_by_category(
        &self,
        category_id: &CategoryId,
        offset: u32,
        limit: u32,
    ) -> Result<usize, CatalogError> {
        self.begin(Operation::FilterByCategory);
        let result = async {
            let token = self.token()?;
            Ok::<_, CatalogError>(self
                .api()
                .products_in_category(&token, category_id, Page::new(offset, limit))
                .await?)
        }
        .await;

        match result {
            Ok(products) => {
                let count = products.len();
                self.commit(|state| state.products.succeed(products));
                Ok(count)
            }
            Err(err) => Err(self.reject(Operation::FilterByCategory, err)),
        }
    }

    /// Create a product and append it to the loaded list.
    ///
    /// The payload is validated first; an invalid payload is recorded as a
    /// validation failure and never sent.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, no credential is installed, or
    /// the request fails.
    #[instrument(skip(self, payload), fields(name = %payload.name))]
    pub async fn create(&self, payload: &ProductPayload) -> Result<Product, CatalogError> {
        self.begin(Operation::Create);
        let result = async {
            validate_payload(payload)?;
            let token = self.token()?;
            Ok::<_, CatalogError>(self.api().create_product(&token, payload).await?)
        }
        .await;

        match result {
            Ok(product) => {
                let created = product.clone();
                self.commit(|state| state.apply_created(created));
                Ok(product)
            }
            Err(err) => Err(self.reject(Operation::Create, err)),
        }
    }

    /// Update a product and reconcile the list and detail by `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, no credential is installed, or
    /// the request fails.
    #[instrument(skip(self, payload), fields(id = %id))]
    pub async fn update(
        &self,
        id: &ProductId,
        payload: &ProductPayload,
    ) -> Result<Product, CatalogError> {
        self.begin(Operation::Update);
        let result = async {
            validate_payload(payload)?;
            let token = self.token()?;
            Ok::<_, CatalogError>(self.api().update_product(&token, id, payload).await?)
        }
        .await;

        match result {
            Ok(product) => {
                let updated = product.clone();
                self.commit(|state| state.apply_updated(updated));
                Ok(product)
            }
            Err(err) => Err(self.reject(Operation::Update, err)),
        }
    }

    /// Delete a product and drop it from the loaded list once confirmed.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is installed, the request fails, or
    /// the API does not confirm the deletion.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        self.begin(Operation::Delete);
        let result = async {
            let token = self.token()?;
            Ok::<_, CatalogError>(self.api().delete_product(&token, id).await?)
        }
        .await;

        match result {
            Ok(()) => {
                self.commit(|state| state.apply_deleted(id));
                Ok(())
            }
            Err(err) => Err(self.reject(Operation::Delete, err)),
        }
    }

    /// Replace the category list.
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is installed or the request fails.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self, offset: u32, limit: u32) -> Result<usize, CatalogError> {
        self.begin(Operation::FetchCategories);
        let result = async {
            let token = self.token()?;
            Ok::<_, CatalogError>(self
                .api()
                .list_categories(&token, Page::new(offset, limit))
                .await?)
        }
        .await;

        match result {
            Ok(categories) => {
                let count = categories.len();
                self.commit(|state| state.categories.succeed(categories));
                Ok(count)
            }
            Err(err) => Err(self.reject(Operation::FetchCategories, err)),
        }
    }

    /// Fetch the first page of categories unless some are already loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch was needed and failed.
    pub async fn ensure_categories(&self) -> Result<usize, CatalogError> {
        let loaded = self.inner.state.borrow().categories.data.len();
        if loaded > 0 {
            return Ok(loaded);
        }
        self.fetch_categories(0, self.inner.page_size).await
    }

    /// Run the store operation a coordinator query resolves to.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying operation.
    pub async fn execute(&self, query: &CatalogQuery) -> Result<usize, CatalogError> {
        let limit = self.inner.page_size;
        match query {
            CatalogQuery::TextSearch { text } => self.search_by_text(text).await,
            CatalogQuery::CategoryFiltered {
                category_id,
                offset,
            } => self.filter_by_category(category_id, *offset, limit).await,
            CatalogQuery::Unfiltered { offset } => self.fetch_list(*offset, limit).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::{ApiError, DEFAULT_PAGE_SIZE};
    use crate::error::{ErrorKind, TOO_MANY_REQUESTS_MESSAGE};
    use crate::storage::{CredentialStorage, MemoryCredentialStorage};
    use crate::testing::{Call, FakeApi, payload, product};

    fn signed_in(api: FakeApi) -> (Arc<FakeApi>, CatalogStore<FakeApi>) {
        let api = Arc::new(api);
        let storage: Arc<dyn CredentialStorage> = Arc::new(MemoryCredentialStorage::with_credential(
            Credential::new(FakeApi::TOKEN),
        ));
        let auth = AuthStore::new(Arc::clone(&api), storage);
        auth.restore_on_start().unwrap();
        (api, CatalogStore::new(auth, DEFAULT_PAGE_SIZE))
    }

    fn list_ids(store: &CatalogStore<FakeApi>) -> Vec<String> {
        store
            .snapshot()
            .products
            .data
            .iter()
            .map(|p| p.id.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_list_empty_page() {
        let (api, store) = signed_in(FakeApi::new());

        assert_eq!(store.fetch_list(0, 50).await.unwrap(), 0);

        let state = store.snapshot();
        assert!(state.products.data.is_empty());
        assert!(state.products.error.is_none());
        assert!(!state.products.loading);
        assert_eq!(api.calls(), vec![Call::List(Page::new(0, 50))]);
    }

    #[tokio::test]
    async fn test_fetch_list_rate_limited_message() {
        let (api, store) = signed_in(FakeApi::new());
        api.fail_next(ApiError::RateLimited { message: None });

        assert!(store.fetch_list(0, 50).await.is_err());
        let rate_limited = store.snapshot().products.error.unwrap();

        api.fail_next(ApiError::Status {
            status: 500,
            message: None,
        });
        assert!(store.fetch_list(0, 50).await.is_err());
        let generic = store.snapshot().products.error.unwrap();

        assert_eq!(rate_limited.message, TOO_MANY_REQUESTS_MESSAGE);
        assert_eq!(rate_limited.kind, ErrorKind::RateLimited);
        assert_eq!(generic.message, "Failed to fetch products");
        assert_ne!(rate_limited.message, generic.message);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_data() {
        let (api, store) = signed_in(FakeApi::with_products(vec![product("a", "Lamp")]));
        store.fetch_list(0, 50).await.unwrap();

        api.fail_next(ApiError::Network("reset".to_string()));
        assert!(store.search_by_text("lamp").await.is_err());

        let state = store.snapshot();
        assert_eq!(state.products.data.len(), 1);
        assert_eq!(
            state.products.error.map(|e| e.kind),
            Some(ErrorKind::NetworkFailure)
        );
    }

    #[tokio::test]
    async fn test_without_credential_no_request_is_made() {
        let api = Arc::new(FakeApi::new());
        let auth = AuthStore::new(
            Arc::clone(&api),
            Arc::new(MemoryCredentialStorage::new()) as Arc<dyn CredentialStorage>,
        );
        let store = CatalogStore::new(auth, 50);

        let err = store.fetch_list(0, 50).await.unwrap_err();

        assert!(matches!(err, CatalogError::NotAuthenticated));
        assert!(api.calls().is_empty());
        assert_eq!(
            store.snapshot().products.error.map(|e| e.kind),
            Some(ErrorKind::AuthorizationFailure)
        );
    }

    #[tokio::test]
    async fn test_fetch_by_slug_populates_detail_only() {
        let (_, store) = signed_in(FakeApi::with_products(vec![product("a", "Lamp")]));

        let found = store.fetch_by_slug("a-slug").await.unwrap();

        let state = store.snapshot();
        assert_eq!(found.map(|p| p.id.to_string()), Some("a".to_string()));
        assert_eq!(
            state.product.data.map(|p| p.name),
            Some("Lamp".to_string())
        );
        assert!(state.products.data.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_by_slug_missing_is_none() {
        let (_, store) = signed_in(FakeApi::new());
        assert!(store.fetch_by_slug("nope").await.unwrap().is_none());
        assert!(store.snapshot().product.error.is_none());
    }

    #[tokio::test]
    async fn test_filter_by_category_replaces_list() {
        let mut other = product("b", "Chair");
        other.category = None;
        let (api, store) = signed_in(FakeApi::with_products(vec![product("a", "Lamp"), other]));

        store
            .filter_by_category(&CategoryId::new("c1"), 0, 50)
            .await
            .unwrap();

        assert_eq!(list_ids(&store), vec!["a"]);
        assert_eq!(
            api.calls(),
            vec![Call::Filter(CategoryId::new("c1"), Page::new(0, 50))]
        );
    }

    #[tokio::test]
    async fn test_create_appends_without_refetch() {
        let (api, store) = signed_in(FakeApi::with_products(vec![product("a", "Lamp")]));
        store.fetch_list(0, 50).await.unwrap();

        let created = store.create(&payload("Mug")).await.unwrap();

        assert_eq!(list_ids(&store), vec!["a".to_string(), created.id.to_string()]);
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_create_invalid_price_never_sent() {
        let (api, store) = signed_in(FakeApi::new());
        let mut invalid = payload("Mug");
        invalid.price = "-1".parse().unwrap();

        let err = store.create(&invalid).await.unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(api.calls().is_empty());
        assert_eq!(
            store.snapshot().products.error.map(|e| e.kind),
            Some(ErrorKind::ValidationFailure)
        );
    }

    #[tokio::test]
    async fn test_update_reconciles_list_and_detail() {
        let (_, store) = signed_in(FakeApi::with_products(vec![
            product("a", "Lamp"),
            product("b", "Chair"),
        ]));
        store.fetch_list(0, 50).await.unwrap();
        store.fetch_by_slug("b-slug").await.unwrap();

        let updated = store
            .update(&ProductId::new("b"), &payload("Armchair"))
            .await
            .unwrap();

        let state = store.snapshot();
        assert_eq!(state.products.data.get(1), Some(&updated));
        assert_eq!(state.product.data.as_ref(), Some(&updated));
        assert_eq!(state.products.data.first().map(|p| p.name.as_str()), Some("Lamp"));
    }

    #[tokio::test]
    async fn test_update_failure_leaves_entry_untouched() {
        let (api, store) = signed_in(FakeApi::with_products(vec![product("a", "Lamp")]));
        store.fetch_list(0, 50).await.unwrap();
        api.fail_next(ApiError::Status {
            status: 400,
            message: Some("slug taken".to_string()),
        });

        assert!(store.update(&ProductId::new("a"), &payload("Desk")).await.is_err());

        let state = store.snapshot();
        assert_eq!(state.products.data.first().map(|p| p.name.as_str()), Some("Lamp"));
        assert_eq!(state.products.error.map(|e| e.message), Some("slug taken".to_string()));
    }

    #[tokio::test]
    async fn test_delete_removes_only_that_entry() {
        let (_, store) = signed_in(FakeApi::with_products(vec![
            product("a", "Lamp"),
            product("b", "Chair"),
            product("c", "Desk"),
        ]));
        store.fetch_list(0, 50).await.unwrap();

        store.delete(&ProductId::new("b")).await.unwrap();

        assert_eq!(list_ids(&store), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_delete_not_confirmed_keeps_list() {
        let (api, store) = signed_in(FakeApi::with_products(vec![product("a", "Lamp")]));
        store.fetch_list(0, 50).await.unwrap();
        api.fail_next(ApiError::DeleteNotConfirmed { message: None });

        assert!(store.delete(&ProductId::new("a")).await.is_err());

        let state = store.snapshot();
        assert_eq!(state.products.data.len(), 1);
        assert_eq!(
            state.products.error.map(|e| e.message),
            Some("Failed to delete product".to_string())
        );
    }

    #[tokio::test]
    async fn test_categories_have_independent_flags() {
        let (api, store) = signed_in(FakeApi::new());
        api.fail_next(ApiError::Status {
            status: 503,
            message: None,
        });

        assert!(store.fetch_categories(0, 50).await.is_err());

        let state = store.snapshot();
        assert_eq!(
            state.categories.error.map(|e| e.message),
            Some("Failed to fetch categories".to_string())
        );
        assert!(state.products.error.is_none());
    }

    #[tokio::test]
    async fn test_ensure_categories_fetches_once() {
        let (api, store) = signed_in(FakeApi::new());
        api.set_categories(vec![product_desk_core::Category {
            id: CategoryId::new("c1"),
            name: "General".to_string(),
            image: None,
        }]);

        assert_eq!(store.ensure_categories().await.unwrap(), 1);
        assert_eq!(store.ensure_categories().await.unwrap(), 1);
        assert_eq!(api.calls(), vec![Call::Categories(Page::new(0, DEFAULT_PAGE_SIZE))]);
    }

    #[tokio::test]
    async fn test_subscribers_see_loading_then_settled() {
        let (_, store) = signed_in(FakeApi::new());
        let mut changes = store.subscribe();

        store.fetch_list(0, 50).await.unwrap();

        assert!(changes.has_changed().unwrap());
        let state = changes.borrow_and_update().clone();
        assert!(!state.products.loading);
    }
}
