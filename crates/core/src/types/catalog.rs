//! Catalog entities exchanged with the remote API.
//!
//! All types use the API's camelCase wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A product listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Canonical identifier, used to reconcile local state after mutations.
    pub id: ProductId,
    /// Unique human-readable key used in detail lookups.
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    /// Image URLs in display order.
    #[serde(default)]
    pub images: Vec<String>,
    /// Denormalized category, when the API embeds it.
    #[serde(default)]
    pub category: Option<CategoryRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// First image that looks like a remote URL.
    ///
    /// Relative or empty entries are skipped; callers render a placeholder
    /// when this returns `None`.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .iter()
            .map(String::as_str)
            .find(|url| url.starts_with("http"))
    }

    /// Name of the embedded category, if any.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Category embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A product category. Read-only from this client's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body sent when creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub images: Vec<String>,
    pub category_id: CategoryId,
}
