//! Product Desk CLI - manage the product catalog from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the token is persisted for later commands)
//! desk login ops@example.com
//!
//! # Browse and search
//! desk products list --offset 50
//! desk products search "running shoes"
//! desk products filter <category-id>
//! desk products show <slug>
//!
//! # Edit
//! desk products create --name Lamp --description "Warm light" \
//!     --price 24.90 --images https://cdn.example.com/lamp.png --category <id>
//! desk products update <slug> --price 19.90
//! desk products delete <id> --yes
//!
//! # Interactive browser driven by the query coordinator
//! desk browse
//! ```
//!
//! # Environment Variables
//!
//! See [`product_desk_client::ClientConfig`]; additionally
//! `PRODUCT_DESK_LOG_JSON` switches log output to JSON and `RUST_LOG`
//! overrides the default filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use product_desk_client::{ClientConfig, Desk};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CommandError;
use commands::products::DraftArgs;

#[derive(Parser)]
#[command(name = "desk")]
#[command(author, version, about = "Product Desk catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange an email address for an access token
    Login {
        /// Account email address
        email: String,
    },
    /// Forget the persisted access token
    Logout,
    /// Show whether a token is installed
    Status,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List categories
    Categories {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Interactive browser: type to search, `:help` for commands
    Browse,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List one page of products
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Free-text search by name
    Search {
        /// Text to search for
        text: String,
    },
    /// List one page of a category
    Filter {
        /// Category id
        category_id: String,

        #[command(flatten)]
        page: PageArgs,
    },
    /// Show a single product
    Show {
        /// Product slug
        slug: String,
    },
    /// Create a product
    Create {
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Update a product; unset fields keep their current value
    Update {
        /// Slug of the product to update
        slug: String,

        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Delete a product
    Delete {
        /// Product id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Clone, Copy)]
struct PageArgs {
    /// Number of entries to skip
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Entries per page (default: `PRODUCT_DESK_PAGE_SIZE`)
    #[arg(long)]
    limit: Option<u32>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "product_desk_client=info,product_desk_cli=info".into());

    let json = std::env::var("PRODUCT_DESK_LOG_JSON").is_ok_and(|v| !v.trim().is_empty());
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let config = ClientConfig::from_env()?;
    let desk = Desk::from_config(&config)?;
    let limit = |page: PageArgs| page.limit.unwrap_or(config.page_size);

    match cli.command {
        Commands::Login { email } => commands::auth::login(&desk, &email).await?,
        Commands::Logout => commands::auth::logout(&desk)?,
        Commands::Status => commands::auth::status(&desk, &config)?,
        Commands::Products { action } => match action {
            ProductsAction::List { page } => {
                commands::products::list(&desk, page.offset, limit(page)).await?;
            }
            ProductsAction::Search { text } => commands::products::search(&desk, &text).await?,
            ProductsAction::Filter { category_id, page } => {
                commands::products::filter(&desk, &category_id, page.offset, limit(page)).await?;
            }
            ProductsAction::Show { slug } => commands::products::show(&desk, &slug).await?,
            ProductsAction::Create { draft } => commands::products::create(&desk, draft).await?,
            ProductsAction::Update { slug, draft } => {
                commands::products::update(&desk, &slug, draft).await?;
            }
            ProductsAction::Delete { id, yes } => {
                commands::products::delete(&desk, &id, yes).await?;
            }
        },
        Commands::Categories { page } => {
            commands::categories::list(&desk, page.offset, limit(page)).await?;
        }
        Commands::Browse => commands::browse::run(&desk).await?,
    }
    Ok(())
}
