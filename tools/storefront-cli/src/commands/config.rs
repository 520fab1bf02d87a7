//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { base_url, force } => init_config(&base_url, force, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    let config = &ctx.config;

    ctx.output.info("[api]");
    ctx.output.kv("base_url", &config.api.base_url);
    ctx.output
        .kv("timeout_secs", &config.api.timeout_secs.to_string());
    if config.api.csrf_token.is_some() {
        ctx.output.kv("csrf_token", "(set)");
    }

    ctx.output.info("");
    ctx.output.info("[api.endpoints]");
    let endpoints = &config.api.endpoints;
    for (name, path) in [
        ("cart_check", &endpoints.cart_check),
        ("product_details", &endpoints.product_details),
        ("category_products", &endpoints.category_products),
        ("shipping_cost", &endpoints.shipping_cost),
        ("payment_methods", &endpoints.payment_methods),
    ] {
        ctx.output.kv(name, path);
    }

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output
        .kv("dir", &ctx.resolve_path(&config.storage.dir).display().to_string());
    ctx.output.kv("key_prefix", &config.storage.key_prefix);

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output
        .kv("level", config.logging.level.as_directive());
    ctx.output
        .kv("format", &format!("{:?}", config.logging.format).to_lowercase());

    Ok(())
}

async fn init_config(base_url: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("storefront.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config(base_url))?;
    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}
