//! Storefront CLI - drive the storefront state core from the command line.
//!
//! Commands:
//! - `storefront resolve` - Resolve a URL through the route table and guards
//! - `storefront pages` - Show the pagination window for a listing
//! - `storefront cart` - Inspect and edit the persisted cart
//! - `storefront reconcile` - Refresh the cart from the API
//! - `storefront options` - Derive product options from a saved response
//! - `storefront config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use storefront_observability::init_logging;

use commands::{CartArgs, ConfigArgs, OptionsArgs, PagesArgs, ReconcileArgs, ResolveArgs};

/// Storefront CLI - cart, routing and catalog state from the command line
#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a URL to a route, repairing its query
    Resolve(ResolveArgs),

    /// Show the page window of a listing
    Pages(PagesArgs),

    /// Inspect and edit the cart
    Cart(CartArgs),

    /// Refresh cart lines from the API
    Reconcile(ReconcileArgs),

    /// Derive product options from a JSON file
    Options(OptionsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    if let Err(e) = init_logging(&ctx.config.logging) {
        ctx.output.debug(&e.to_string());
    }
    ctx.output.debug(&format!("api: {}", ctx.config.api.base_url));

    let result = match cli.command {
        Commands::Resolve(args) => commands::resolve::run(args, &ctx).await,
        Commands::Pages(args) => commands::pages::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Reconcile(args) => commands::reconcile::run(args, &ctx).await,
        Commands::Options(args) => commands::options::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from([
            "storefront", "--json", "cart", "add", "RING-1", "gold-ring", "19.99", "--quantity", "2",
            "--limit", "3",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Cart(CartArgs {
                command: commands::CartCommand::Add { sku, quantity, limit, .. },
            }) => {
                assert_eq!(sku, "RING-1");
                assert_eq!(quantity, 2);
                assert_eq!(limit, 3);
            }
            _ => panic!("expected cart add"),
        }
    }
}
