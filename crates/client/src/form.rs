//! Client-side product form validation.
//!
//! A [`ProductDraft`] holds what the user typed. Validation turns it into a
//! [`ProductPayload`] or a set of field-scoped errors; a draft that fails
//! validation never produces a network call.

use product_desk_core::{CategoryId, Price, Product, ProductPayload};
use thiserror::Error;

/// Form field an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Images,
    Category,
}

impl ProductField {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::Images => "images",
            Self::Category => "category",
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::Name => "Name is required",
            Self::Description => "Description is required",
            Self::Price => "Price must be greater than 0",
            Self::Images => "At least one image URL is required",
            Self::Category => "Category is required",
        }
    }
}

/// Field-scoped validation failures, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{}", join_messages(.fields))]
pub struct ValidationErrors {
    fields: Vec<ProductField>,
}

impl ValidationErrors {
    fn push(&mut self, field: ProductField) {
        if !self.fields.contains(&field) {
            self.fields.push(field);
            self.fields.sort_unstable();
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn message(&self, field: ProductField) -> Option<&'static str> {
        self.fields
            .contains(&field)
            .then(|| field.message())
    }

    /// Failed fields with their messages.
    pub fn iter(&self) -> impl Iterator<Item = (ProductField, &'static str)> + '_ {
        self.fields.iter().map(|field| (*field, field.message()))
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

fn join_messages(fields: &[ProductField]) -> String {
    fields
        .iter()
        .map(|field| field.message())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check a payload before it is sent.
///
/// # Errors
///
/// Returns every field that violates the payload invariants: blank name,
/// description or category, non-positive price, or an image list that is
/// empty or contains blank entries.
pub fn validate_payload(payload: &ProductPayload) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if payload.name.trim().is_empty() {
        errors.push(ProductField::Name);
    }
    if payload.description.trim().is_empty() {
        errors.push(ProductField::Description);
    }
    if !payload.price.is_positive() {
        errors.push(ProductField::Price);
    }
    if payload.images.is_empty() || payload.images.iter().any(|url| url.trim().is_empty()) {
        errors.push(ProductField::Images);
    }
    if payload.category_id.as_str().trim().is_empty() {
        errors.push(ProductField::Category);
    }

    errors.into_result()
}

/// Raw product form input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    /// Comma-separated image URLs.
    pub images: String,
    pub category_id: String,
}

impl ProductDraft {
    /// Pre-fill an edit form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            images: product.images.join(", "),
            category_id: product
                .category
                .as_ref()
                .map(|c| c.id.to_string())
                .unwrap_or_default(),
        }
    }

    /// Validate the draft and build the payload to send.
    ///
    /// # Errors
    ///
    /// Returns field-scoped errors for every invalid field.
    pub fn validate(&self) -> Result<ProductPayload, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let price = self
            .price
            .parse::<Price>()
            .ok()
            .filter(Price::is_positive);
        if price.is_none() {
            errors.push(ProductField::Price);
        }

        let images: Vec<String> = self
            .images
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_owned)
            .collect();

        let payload = ProductPayload {
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            price: price.unwrap_or_default(),
            images,
            category_id: CategoryId::new(self.category_id.trim()),
        };

        if let Err(payload_errors) = validate_payload(&payload) {
            for (field, _) in payload_errors.iter() {
                errors.push(field);
            }
        }

        errors.into_result().map(|()| payload)
    }
}
