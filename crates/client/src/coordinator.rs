//! Query coordinator.
//!
//! Reconciles the search box, the category selector and the pagination offset
//! into the single query that should drive the product list:
//!
//! 1. non-blank search text: free-text search (category and offset ignored)
//! 2. a selected category: that category at the current offset
//! 3. otherwise: the unfiltered list at the current offset
//!
//! Text edits are debounced; category and offset changes take effect
//! immediately. Queries run on spawned tasks so callers never wait on the
//! network.

use std::time::Duration;

use product_desk_core::CategoryId;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::CatalogApi;
use crate::error::CatalogError;
use crate::store::CatalogStore;

/// The product-list query implied by the current inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQuery {
    Unfiltered { offset: u32 },
    CategoryFiltered { category_id: CategoryId, offset: u32 },
    TextSearch { text: String },
}

/// Raw UI inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryInputs {
    pub search_text: String,
    pub category: Option<CategoryId>,
    pub offset: u32,
}

impl QueryInputs {
    /// Apply the precedence rules.
    #[must_use]
    pub fn resolve(&self) -> CatalogQuery {
        let text = self.search_text.trim();
        if !text.is_empty() {
            return CatalogQuery::TextSearch {
                text: text.to_owned(),
            };
        }
        match &self.category {
            Some(category_id) => CatalogQuery::CategoryFiltered {
                category_id: category_id.clone(),
                offset: self.offset,
            },
            None => CatalogQuery::Unfiltered {
                offset: self.offset,
            },
        }
    }
}

/// A debounced evaluation that has not fired yet.
///
/// Cancelling (or dropping) the handle stops the timer. Once the timer has
/// fired the query runs on its own task and is unaffected.
#[derive(Debug)]
pub struct PendingQuery {
    handle: JoinHandle<()>,
}

impl PendingQuery {
    pub fn cancel(self) {
        self.handle.abort();
    }

    /// Whether the timer has fired (or been cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PendingQuery {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Owns the query inputs and issues store operations as they change.
pub struct QueryCoordinator<A> {
    store: CatalogStore<A>,
    inputs: QueryInputs,
    debounce: Duration,
    pending: Option<PendingQuery>,
}

impl<A: CatalogApi> QueryCoordinator<A> {
    #[must_use]
    pub fn new(store: CatalogStore<A>, debounce: Duration) -> Self {
        Self {
            store,
            inputs: QueryInputs::default(),
            debounce,
            pending: None,
        }
    }

    #[must_use]
    pub const fn inputs(&self) -> &QueryInputs {
        &self.inputs
    }

    #[must_use]
    pub const fn store(&self) -> &CatalogStore<A> {
        &self.store
    }

    /// Whether a debounced evaluation is waiting on its timer.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }

    /// Record new search text and evaluate once input has been quiet for the
    /// debounce interval. Any earlier pending evaluation is cancelled.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.cancel_pending();
        self.inputs.search_text = text.into();

        let query = self.inputs.resolve();
        let store = self.store.clone();
        let delay = self.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so cancelling the timer never aborts an issued query
            drop(spawn_query(store, query));
        });
        self.pending = Some(PendingQuery { handle });
    }

    /// Select a category (or `None` for all products).
    ///
    /// Clears the search text, resets the offset and evaluates immediately.
    pub fn select_category(
        &mut self,
        category: Option<CategoryId>,
    ) -> JoinHandle<Result<usize, CatalogError>> {
        self.cancel_pending();
        self.inputs.category = category;
        self.inputs.search_text.clear();
        self.inputs.offset = 0;
        self.issue()
    }

    pub fn set_offset(&mut self, offset: u32) -> JoinHandle<Result<usize, CatalogError>> {
        self.cancel_pending();
        self.inputs.offset = offset;
        self.issue()
    }

    /// Advance one page.
    pub fn next_page(&mut self) -> JoinHandle<Result<usize, CatalogError>> {
        let offset = self.inputs.offset.saturating_add(self.store.page_size());
        self.set_offset(offset)
    }

    /// Go back one page, stopping at the first.
    pub fn previous_page(&mut self) -> JoinHandle<Result<usize, CatalogError>> {
        let offset = self.inputs.offset.saturating_sub(self.store.page_size());
        self.set_offset(offset)
    }

    /// Evaluate the current inputs immediately.
    pub fn refresh(&mut self) -> JoinHandle<Result<usize, CatalogError>> {
        self.cancel_pending();
        self.issue()
    }

    fn issue(&self) -> JoinHandle<Result<usize, CatalogError>> {
        spawn_query(self.store.clone(), self.inputs.resolve())
    }
}

fn spawn_query<A: CatalogApi>(
    store: CatalogStore<A>,
    query: CatalogQuery,
) -> JoinHandle<Result<usize, CatalogError>> {
    tokio::spawn(async move {
        debug!(?query, "Issuing catalog query");
        store.execute(&query).await
    })
}
