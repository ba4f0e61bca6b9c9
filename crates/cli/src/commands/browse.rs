//! Interactive product browser.
//!
//! Each stdin line is one input event for the query coordinator: plain text
//! replaces the search box (debounced), and `:`-prefixed lines are commands.
//! The product list is re-rendered whenever the store settles on a new
//! result.

use std::io::Write;

use product_desk_client::{CatalogState, Desk, Resource};
use product_desk_core::{CategoryId, Product};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::warn;

use super::{CommandError, render};

const HELP: &str = "\
Type to search by name. Commands:
  :cat <id>   filter by category
  :all        clear the category filter
  :next       next page
  :prev       previous page
  :cats       list categories
  :quit       exit";

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Search(String),
    Category(CategoryId),
    AllCategories,
    NextPage,
    PreviousPage,
    Categories,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let Some(command) = line.trim().strip_prefix(':') else {
            return Self::Search(line.to_owned());
        };
        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, arg)| (name, arg.trim()));
        match (name, arg) {
            ("cat", id) if !id.is_empty() => Self::Category(CategoryId::new(id)),
            ("all", _) => Self::AllCategories,
            ("next", _) => Self::NextPage,
            ("prev", _) => Self::PreviousPage,
            ("cats", _) => Self::Categories,
            ("help", _) => Self::Help,
            ("quit" | "q", _) => Self::Quit,
            _ => Self::Unknown(command.to_owned()),
        }
    }
}

pub async fn run(desk: &Desk) -> Result<(), CommandError> {
    let mut coordinator = desk.coordinator();
    let renderer = tokio::spawn(render_changes(desk.catalog().subscribe()));

    writeln!(std::io::stdout().lock(), "{HELP}")?;
    drop(coordinator.refresh());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Input::parse(&line) {
            Input::Search(text) => coordinator.set_search_text(text),
            Input::Category(id) => drop(coordinator.select_category(Some(id))),
            Input::AllCategories => drop(coordinator.select_category(None)),
            Input::NextPage => drop(coordinator.next_page()),
            Input::PreviousPage => drop(coordinator.previous_page()),
            Input::Categories => {
                if desk.catalog().ensure_categories().await.is_ok() {
                    let state = desk.catalog().snapshot();
                    render::category_list(&mut std::io::stdout().lock(), &state.categories.data)?;
                }
            }
            Input::Help => writeln!(std::io::stdout().lock(), "{HELP}")?,
            Input::Quit => break,
            Input::Unknown(command) => warn!(%command, "Unknown command, try :help"),
        }
    }

    renderer.abort();
    Ok(())
}

/// Print the product list each time it settles on something new.
async fn render_changes(mut changes: watch::Receiver<CatalogState>) {
    let mut shown: Option<Resource<Vec<Product>>> = None;
    while changes.changed().await.is_ok() {
        let products = changes.borrow_and_update().products.clone();
        if products.loading || shown.as_ref() == Some(&products) {
            continue;
        }

        let mut out = std::io::stdout().lock();
        let written = match &products.error {
            Some(error) => writeln!(out, "! {error}"),
            None => render::product_list(&mut out, &products.data),
        };
        if let Err(e) = written {
            warn!(error = %e, "Failed to render products");
        }
        shown = Some(products);
    }
}
