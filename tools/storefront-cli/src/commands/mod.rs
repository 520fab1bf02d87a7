//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod options;
pub mod pages;
pub mod reconcile;
pub mod resolve;

use clap::{Args, Subcommand};

/// Arguments for the resolve command.
#[derive(Args)]
pub struct ResolveArgs {
    /// URL to resolve, e.g. `/store/category/rings?page=abc`.
    pub url: String,
}

/// Arguments for the pages command.
#[derive(Args)]
pub struct PagesArgs {
    /// Current page number.
    #[arg(short, long, default_value = "1")]
    pub page: i64,

    /// Total number of results.
    #[arg(long)]
    pub count: i64,

    /// Results per page.
    #[arg(short, long, default_value = "20")]
    pub size: i64,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// List cart lines.
    List,
    /// Add an item, replacing any line with the same sku.
    Add {
        /// Item sku.
        sku: String,
        /// Item slug.
        slug: String,
        /// Unit price, e.g. `19.99`.
        price: String,
        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,
        /// Maximum quantity per order.
        #[arg(short, long, default_value = "1")]
        limit: i64,
        /// Currency symbol.
        #[arg(long, default_value = "$")]
        symbol: String,
        /// Thumbnail URL.
        #[arg(long)]
        thumbnail: Option<String>,
    },
    /// Remove the line at a position (as shown by `cart list`, from 1).
    Remove {
        position: usize,
    },
    /// Change the quantity of a line.
    Qty {
        /// Item sku.
        sku: String,
        /// New quantity.
        quantity: i64,
    },
    /// Show cart totals.
    Totals,
}

/// Arguments for the reconcile command.
#[derive(Args)]
pub struct ReconcileArgs {
    /// Also check the cart against the API with this coupon code.
    #[arg(long)]
    pub coupon: Option<String>,
}

/// Arguments for the options command.
#[derive(Args)]
pub struct OptionsArgs {
    /// JSON file with product details or a list of variant records.
    pub file: String,

    /// Values to match variants against, e.g. `--select red --select 7`.
    #[arg(short, long)]
    pub select: Vec<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// API base URL to write.
        #[arg(long, default_value = "http://localhost:8000")]
        base_url: String,
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
