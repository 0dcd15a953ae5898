//! Medusa storefront CLI - catalog, cart and search tools.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally filtered
//! sf-cli products list --term shirt
//!
//! # Show one product with all variant prices
//! sf-cli products show prod_01HXYZ
//!
//! # Cart management
//! sf-cli cart create
//! sf-cli cart add cart_01HXYZ variant_01HXYZ --quantity 2
//! sf-cli cart show cart_01HXYZ
//!
//! # Search as you type: each stdin line is the input's current value
//! printf 's\nsh\nshirt\n' | sf-cli search
//!
//! # Format an amount in minor units
//! sf-cli price 123456 --currency eur --locale de-de
//! ```
//!
//! The Medusa backend is configured via the storefront's environment
//! variables (`PUBLIC_MEDUSA_URL`, `MEDUSA_PUBLISHABLE_KEY`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use medusa_storefront::search::{DebounceEdges, SEARCH_DEBOUNCE, SearchSyncConfig};
use medusa_storefront_core::Locale;

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Medusa storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Search interactively, one stdin line per keystroke
    Search {
        /// Debounce delay in milliseconds
        #[arg(long, default_value_t = duration_ms(SEARCH_DEBOUNCE))]
        delay_ms: u64,

        /// Which edges of a burst dispatch a search
        #[arg(long, value_enum, default_value_t = Edges::Both)]
        edges: Edges,
    },
    /// Format an amount given in minor units
    Price {
        /// Amount in minor units (cents); omitted means zero
        amount: Option<i64>,

        /// ISO 4217 currency code
        #[arg(short, long)]
        currency: Option<String>,

        /// Quantity multiplier
        #[arg(short, long)]
        quantity: Option<u32>,

        #[arg(short, long, value_enum, default_value_t = LocaleArg::EnUs)]
        locale: LocaleArg,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Free-text search term
        #[arg(short, long, default_value = "")]
        term: String,

        #[arg(long, default_value_t = medusa_storefront::medusa::PRODUCT_PAGE_SIZE)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Print the raw page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a product
    Show {
        id: String,

        /// Print the raw product as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Create an empty cart
    Create,
    /// Show a cart
    Show { id: String },
    /// Add a variant to a cart
    Add {
        cart_id: String,
        variant_id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Edges {
    Leading,
    Trailing,
    Both,
}

impl From<Edges> for DebounceEdges {
    fn from(edges: Edges) -> Self {
        match edges {
            Edges::Leading => Self::LEADING,
            Edges::Trailing => Self::TRAILING,
            Edges::Both => Self::BOTH,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LocaleArg {
    EnUs,
    DeDe,
}

impl From<LocaleArg> for Locale {
    fn from(locale: LocaleArg) -> Self {
        match locale {
            LocaleArg::EnUs => Self::EnUs,
            LocaleArg::DeDe => Self::DeDe,
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Products { action } => {
            let client = commands::client()?;
            match action {
                ProductsAction::List {
                    term,
                    limit,
                    offset,
                    json,
                } => commands::products::list(&client, &term, limit, offset, json).await?,
                ProductsAction::Show { id, json } => {
                    commands::products::show(&client, &id, json).await?;
                }
            }
        }
        Commands::Cart { action } => {
            let client = commands::client()?;
            match action {
                CartAction::Create => commands::cart::create(&client).await?,
                CartAction::Show { id } => commands::cart::show(&client, &id).await?,
                CartAction::Add {
                    cart_id,
                    variant_id,
                    quantity,
                } => commands::cart::add(&client, &cart_id, &variant_id, quantity).await?,
            }
        }
        Commands::Search { delay_ms, edges } => {
            let config = SearchSyncConfig {
                delay: Duration::from_millis(delay_ms),
                edges: edges.into(),
            };
            commands::search::interactive(config).await?;
        }
        Commands::Price {
            amount,
            currency,
            quantity,
            locale,
        } => commands::price::print(amount, currency.as_deref(), quantity, locale.into())?,
    }
    Ok(())
}
