//! Catalog state held by [`CatalogStore`](crate::CatalogStore).
//!
//! Each resource tracks `{data, loading, error}` independently. The
//! reconciliation helpers here are the only code that merges mutation
//! results into loaded data; all of them match entries by product `id`.

use product_desk_core::{Category, Product, ProductId};

use crate::error::ResourceError;

/// Data plus request status for one catalog entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resource<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<ResourceError>,
}

impl<T> Resource<T> {
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self {
            data,
            loading: false,
            error: None,
        }
    }

    /// Mark a request in flight.
    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Replace the data with a settled response.
    pub(crate) fn succeed(&mut self, data: T) {
        self.data = data;
        self.settle();
    }

    /// Clear request status after data was merged in place.
    pub(crate) fn settle(&mut self) {
        self.loading = false;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, error: ResourceError) {
        self.loading = false;
        self.error = Some(error);
    }
}

/// Which resource an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Products,
    Product,
    Categories,
}

/// Remote-backed store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchList,
    FetchBySlug,
    SearchByText,
    FilterByCategory,
    Create,
    Update,
    Delete,
    FetchCategories,
}

impl Operation {
    /// Resource whose loading/error flags the operation drives.
    #[must_use]
    pub const fn resource(self) -> ResourceKind {
        match self {
            Self::FetchBySlug => ResourceKind::Product,
            Self::FetchCategories => ResourceKind::Categories,
            Self::FetchList
            | Self::SearchByText
            | Self::FilterByCategory
            | Self::Create
            | Self::Update
            | Self::Delete => ResourceKind::Products,
        }
    }

    /// Message recorded when the server gives none.
    #[must_use]
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::FetchList => "Failed to fetch products",
            Self::FetchBySlug => "Failed to fetch product",
            Self::SearchByText => "Failed to search products",
            Self::FilterByCategory => "Failed to filter products",
            Self::Create => "Failed to create product",
            Self::Update => "Failed to update product",
            Self::Delete => "Failed to delete product",
            Self::FetchCategories => "Failed to fetch categories",
        }
    }

    /// Whether a 429 gets the dedicated "too many requests" message.
    #[must_use]
    pub const fn reports_rate_limit(self) -> bool {
        matches!(self, Self::FetchList | Self::FetchBySlug)
    }
}

/// Snapshot of everything the catalog views render from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogState {
    /// Current page of the list, search results or category filter.
    pub products: Resource<Vec<Product>>,
    /// Product shown in the detail view.
    pub product: Resource<Option<Product>>,
    pub categories: Resource<Vec<Category>>,
}

impl CatalogState {
    pub(crate) fn begin(&mut self, resource: ResourceKind) {
        match resource {
            ResourceKind::Products => self.products.begin(),
            ResourceKind::Product => self.product.begin(),
            ResourceKind::Categories => self.categories.begin(),
        }
    }

    pub(crate) fn fail(&mut self, resource: ResourceKind, error: ResourceError) {
        match resource {
            ResourceKind::Products => self.products.fail(error),
            ResourceKind::Product => self.product.fail(error),
            ResourceKind::Categories => self.categories.fail(error),
        }
    }

    /// Append a newly created product to the loaded list.
    pub(crate) fn apply_created(&mut self, product: Product) {
        self.products.data.push(product);
        self.products.settle();
    }

    /// Replace the list entry and the detail product carrying the same id.
    pub(crate) fn apply_updated(&mut self, product: Product) {
        if let Some(entry) = self.products.data.iter_mut().find(|p| p.id == product.id) {
            *entry = product.clone();
        }
        if let Some(current) = self.product.data.as_mut().filter(|p| p.id == product.id) {
            *current = product;
        }
        self.products.settle();
    }

    /// Drop every list entry with `id`, keeping the order of the rest.
    pub(crate) fn apply_deleted(&mut self, id: &ProductId) {
        self.products.data.retain(|p| &p.id != id);
        self.products.settle();
    }

    /// Whether any resource has a request in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.products.loading || self.product.loading || self.categories.loading
    }
}
