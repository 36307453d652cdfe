//! Ai-oko CLI - Browse the fabric catalog, manage the cart and check out.
//!
//! # Usage
//!
//! ```bash
//! # List categories
//! aioko categories
//!
//! # Browse lace, blue fabrics only, cheapest first, two pages
//! aioko browse --category lace --color blue --sort price-low --pages 2
//!
//! # Add to cart and check out
//! aioko cart add lace-001
//! aioko checkout
//! ```
//!
//! # Commands
//!
//! - `categories` - List catalog categories
//! - `facets` - List color filters for a category
//! - `browse` - Filter, sort and page through products
//! - `search` - Quick search by name, category or description
//! - `featured` - List featured products
//! - `cart` - Show or change the cart
//! - `checkout` - Compose the order message and link
//!
//! Configuration is read from `AIOKO_*` environment variables (and `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use aioko_storefront::browse::SortKey;
use aioko_storefront::config::StorefrontConfig;
use aioko_storefront::error::StoreError;
use aioko_storefront::state::Storefront;
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "aioko")]
#[command(author, version, about = "Ai-oko Fabrics storefront")]
struct Cli {
    /// Catalog JSON file (overrides `AIOKO_CATALOG_PATH`)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog categories
    Categories,
    /// List color filters for a category (or the whole catalog)
    Facets {
        /// Category name
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Filter, sort and page through products
    Browse {
        /// Category name
        #[arg(short, long, conflicts_with = "search")]
        category: Option<String>,

        /// Browse every search match instead of a category
        #[arg(short, long)]
        search: Option<String>,

        /// Color filter id (`all`, `other`, `blue`, `blue-white`, ...)
        #[arg(long)]
        color: Option<String>,

        /// Sort order (`name`, `price-low`, `price-high`)
        #[arg(long)]
        sort: Option<SortKey>,

        /// Pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Quick search by name, category or description
    Search {
        /// Search term (at least two characters)
        term: String,
    },
    /// List featured products
    Featured,
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Compose the order message and link for the current cart
    Checkout,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        id: String,
    },
    /// Remove a product's line
    Remove {
        /// Product id
        id: String,
    },
    /// Set a line's quantity (below 1 removes it)
    Set {
        /// Product id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A storefront operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The named category does not exist.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

impl CliError {
    fn notice(&self) -> String {
        match self {
            Self::Store(err) => err.notice(),
            Self::UnknownCategory(_) => self.to_string(),
        }
    }
}

fn init_tracing(json_logs: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aioko_cli=info,aioko_storefront=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[allow(clippy::print_stderr)]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("{}", e.notice());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = StorefrontConfig::from_env().map_err(StoreError::from)?;
    if let Some(path) = cli.catalog {
        config.catalog_path = path;
    }
    let store = Storefront::load(config).map_err(StoreError::from)?;

    match cli.command {
        Commands::Categories => commands::catalog::categories(&store),
        Commands::Facets { category } => commands::catalog::facets(&store, category.as_deref())?,
        Commands::Browse {
            category,
            search,
            color,
            sort,
            pages,
        } => commands::catalog::browse(
            &store,
            &commands::catalog::BrowseArgs {
                category,
                search,
                color,
                sort,
                pages,
            },
        )?,
        Commands::Search { term } => commands::catalog::search(&store, &term),
        Commands::Featured => commands::catalog::featured(&store),
        Commands::Cart { action } => match action.unwrap_or(CartAction::Show) {
            CartAction::Show => commands::cart::show(&store),
            CartAction::Add { id } => commands::cart::add(&store, &id)?,
            CartAction::Remove { id } => commands::cart::remove(&store, &id)?,
            CartAction::Set { id, quantity } => commands::cart::set(&store, &id, quantity)?,
            CartAction::Clear => commands::cart::clear(&store)?,
        },
        Commands::Checkout => commands::cart::checkout(&store)?,
    }
    Ok(())
}
