//! Product commands.
//!
//! List, search and filter print one page from the catalog store. Create and
//! update go through [`ProductDraft`] validation first, so an invalid form
//! never reaches the API.

use std::io::Write;

use clap::Args;
use product_desk_client::{Desk, Operation, ProductDraft};
use product_desk_core::{CategoryId, ProductId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::{CommandError, render};

/// Product form fields. On update, omitted fields keep the current value.
#[derive(Args, Debug, Default)]
pub struct DraftArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Price, e.g. 24.90
    #[arg(long)]
    pub price: Option<String>,

    /// Comma-separated image URLs
    #[arg(long)]
    pub images: Option<String>,

    /// Category id
    #[arg(long)]
    pub category: Option<String>,
}

impl DraftArgs {
    /// Overlay the provided fields on `draft`.
    fn apply(self, mut draft: ProductDraft) -> ProductDraft {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(images) = self.images {
            draft.images = images;
        }
        if let Some(category) = self.category {
            draft.category_id = category;
        }
        draft
    }
}

fn print_list(desk: &Desk) -> Result<(), CommandError> {
    let state = desk.catalog().snapshot();
    render::product_list(&mut std::io::stdout().lock(), &state.products.data)?;
    Ok(())
}

pub async fn list(desk: &Desk, offset: u32, limit: u32) -> Result<(), CommandError> {
    desk.catalog()
        .fetch_list(offset, limit)
        .await
        .map_err(CommandError::catalog(Operation::FetchList))?;
    print_list(desk)
}

pub async fn search(desk: &Desk, text: &str) -> Result<(), CommandError> {
    desk.catalog()
        .search_by_text(text.trim())
        .await
        .map_err(CommandError::catalog(Operation::SearchByText))?;
    print_list(desk)
}

pub async fn filter(
    desk: &Desk,
    category_id: &str,
    offset: u32,
    limit: u32,
) -> Result<(), CommandError> {
    desk.catalog()
        .filter_by_category(&CategoryId::new(category_id), offset, limit)
        .await
        .map_err(CommandError::catalog(Operation::FilterByCategory))?;
    print_list(desk)
}

pub async fn show(desk: &Desk, slug: &str) -> Result<(), CommandError> {
    let product = desk
        .catalog()
        .fetch_by_slug(slug)
        .await
        .map_err(CommandError::catalog(Operation::FetchBySlug))?
        .ok_or_else(|| CommandError::NotFound(slug.to_owned()))?;
    render::product_detail(&mut std::io::stdout().lock(), &product)?;
    Ok(())
}

pub async fn create(desk: &Desk, args: DraftArgs) -> Result<(), CommandError> {
    let payload = args.apply(ProductDraft::default()).validate()?;
    let product = desk
        .catalog()
        .create(&payload)
        .await
        .map_err(CommandError::catalog(Operation::Create))?;

    info!(id = %product.id, "Product created");
    render::product_detail(&mut std::io::stdout().lock(), &product)?;
    Ok(())
}

/// Fetch the product by slug, overlay the provided fields and save.
pub async fn update(desk: &Desk, slug: &str, args: DraftArgs) -> Result<(), CommandError> {
    let current = desk
        .catalog()
        .fetch_by_slug(slug)
        .await
        .map_err(CommandError::catalog(Operation::FetchBySlug))?
        .ok_or_else(|| CommandError::NotFound(slug.to_owned()))?;

    let payload = args.apply(ProductDraft::from_product(&current)).validate()?;
    let product = desk
        .catalog()
        .update(&current.id, &payload)
        .await
        .map_err(CommandError::catalog(Operation::Update))?;

    info!(id = %product.id, "Product updated");
    render::product_detail(&mut std::io::stdout().lock(), &product)?;
    Ok(())
}

pub async fn delete(desk: &Desk, id: &str, yes: bool) -> Result<(), CommandError> {
    if !yes && !confirm(&format!("Delete product {id}? [y/N] ")).await? {
        return Err(CommandError::Aborted);
    }

    desk.catalog()
        .delete(&ProductId::new(id))
        .await
        .map_err(CommandError::catalog(Operation::Delete))?;

    writeln!(std::io::stdout().lock(), "Deleted {id}")?;
    Ok(())
}

async fn confirm(prompt: &str) -> Result<bool, CommandError> {
    {
        let mut err = std::io::stderr().lock();
        write!(err, "{prompt}")?;
        err.flush()?;
    }
    let answer = BufReader::new(tokio::io::stdin())
        .lines()
        .next_line()
        .await?
        .unwrap_or_default();
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
