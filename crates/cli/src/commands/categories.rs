//! Category listing.

use product_desk_client::{Desk, Operation};

use super::{CommandError, render};

pub async fn list(desk: &Desk, offset: u32, limit: u32) -> Result<(), CommandError> {
    desk.catalog()
        .fetch_categories(offset, limit)
        .await
        .map_err(CommandError::catalog(Operation::FetchCategories))?;

    let state = desk.catalog().snapshot();
    render::category_list(&mut std::io::stdout().lock(), &state.categories.data)?;
    Ok(())
}
