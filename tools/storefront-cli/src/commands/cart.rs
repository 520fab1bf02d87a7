//! Cart commands.

use anyhow::{anyhow, bail, Context as _, Result};
use serde_json::json;
use storefront_core::cart::LineItem;
use storefront_core::checkout::Checkout;
use storefront_core::money::Money;

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let mut checkout = ctx.checkout()?;

    match args.command {
        CartCommand::List => list(&checkout, ctx),
        CartCommand::Add {
            sku,
            slug,
            price,
            quantity,
            limit,
            symbol,
            thumbnail,
        } => {
            let item = build_item(&sku, &slug, &price, quantity, limit, &symbol, thumbnail)?;
            checkout
                .add_item(item)
                .with_context(|| format!("Cannot add {}", sku))?;
            ctx.output.success(&format!("Added {}", sku));
            totals(&checkout, ctx)
        }
        CartCommand::Remove { position } => {
            let removed = remove_at(&mut checkout, position)?;
            ctx.output.success(&format!("Removed {}", removed.sku));
            Ok(())
        }
        CartCommand::Qty { sku, quantity } => {
            checkout
                .update_item_quantity(&sku, quantity)
                .with_context(|| format!("Cannot set quantity of {}", sku))?;
            ctx.output
                .success(&format!("{} quantity set to {}", sku, quantity));
            totals(&checkout, ctx)
        }
        CartCommand::Totals => totals(&checkout, ctx),
    }
}

fn build_item(
    sku: &str,
    slug: &str,
    price: &str,
    quantity: i64,
    limit: i64,
    symbol: &str,
    thumbnail: Option<String>,
) -> Result<LineItem> {
    let price = Money::parse(price).ok_or_else(|| anyhow!("Invalid price: {}", price))?;
    let mut item = LineItem::new(sku, slug, price)
        .with_currency_symbol(symbol)
        .with_limit_per_order(limit)
        .with_quantity(quantity);
    if let Some(thumbnail) = thumbnail {
        item = item.with_thumbnail(thumbnail);
    }
    Ok(item)
}

/// Remove by 1-based position.
fn remove_at(checkout: &mut Checkout, position: usize) -> Result<LineItem> {
    if position == 0 {
        bail!("Positions start at 1");
    }
    checkout
        .remove_item(position - 1)
        .ok_or_else(|| anyhow!("No cart line at position {}", position))
}

fn list(checkout: &Checkout, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&checkout.lines());
        return Ok(());
    }

    if checkout.lines().is_empty() {
        ctx.output.info("Cart is empty");
        return Ok(());
    }

    ctx.output.header("Cart");
    let widths = [3, 16, 24, 5, 5, 12];
    ctx.output
        .table_row(&["#", "SKU", "ITEM", "QTY", "MAX", "SUBTOTAL"], &widths);
    for (i, line) in checkout.lines().iter().enumerate() {
        let subtotal = format!(
            "{}{}",
            line.currency_symbol,
            Checkout::item_subtotal(line.price_amount, line.quantity)
        );
        ctx.output.table_row(
            &[
                &(i + 1).to_string(),
                line.sku.as_str(),
                line.item_slug.as_str(),
                &line.quantity.to_string(),
                &line.limit_per_order.to_string(),
                &subtotal,
            ],
            &widths,
        );
    }
    Ok(())
}

fn totals_json(checkout: &Checkout) -> serde_json::Value {
    let totals = checkout.totals();
    json!({
        "items_count": totals.items_count,
        "total_quantity": totals.total_quantity,
        "items_quantity": totals.items_quantity,
        "total_price": totals.total_price,
        "total_quantity_price": totals.total_quantity_price,
        "total_with_discount": totals.total_with_discount,
        "grand_total": totals.grand_total,
        "sku_string": totals.sku_string,
        "coupon_error": checkout.cart_api().error_msg,
    })
}

fn totals(checkout: &Checkout, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&totals_json(checkout));
        return Ok(());
    }

    let symbol = checkout
        .lines()
        .first()
        .map(|line| line.currency_symbol.as_str())
        .unwrap_or("$");
    ctx.output.header("Totals");
    ctx.output.kv("items", &checkout.items_count().to_string());
    ctx.output
        .kv("quantity", &checkout.cart_total_quantity().to_string());
    ctx.output.kv(
        "subtotal",
        &checkout.cart_total_quantity_price_amount().display_with(symbol),
    );
    ctx.output.kv(
        "with discount",
        &checkout.cart_total_with_discount().display_with(symbol),
    );
    ctx.output
        .kv("grand total", &checkout.grand_total().display_with(symbol));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_cache::Cache;

    #[test]
    fn test_build_item_parses_price() {
        let item = build_item("RING-1", "gold-ring", "19.99", 2, 3, "€", None).unwrap();
        assert_eq!(item.price_amount, Money::new(1999));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.currency_symbol, "€");
        assert!(build_item("RING-1", "gold-ring", "cheap", 1, 1, "$", None).is_err());
    }

    #[test]
    fn test_add_zero_quantity_is_rejected() {
        let mut checkout = Checkout::new(Cache::in_memory());
        let item = build_item("RING-1", "gold-ring", "10", 0, 2, "$", None).unwrap();
        assert!(checkout.add_item(item).is_err());
        assert!(checkout.lines().is_empty());
    }

    #[test]
    fn test_remove_by_position() {
        let mut checkout = Checkout::new(Cache::in_memory());
        for sku in ["A", "B"] {
            checkout
                .add_item(build_item(sku, sku, "5", 1, 1, "$", None).unwrap())
                .unwrap();
        }

        assert!(remove_at(&mut checkout, 0).is_err());
        assert!(remove_at(&mut checkout, 3).is_err());
        // newest line first
        assert_eq!(remove_at(&mut checkout, 1).unwrap().sku, "B");
        assert_eq!(checkout.lines().len(), 1);
    }

    #[test]
    fn test_totals_json() {
        let mut checkout = Checkout::new(Cache::in_memory());
        checkout
            .add_item(build_item("A", "a", "10.50", 2, 5, "$", None).unwrap())
            .unwrap();
        let value = totals_json(&checkout);
        assert_eq!(value["items_count"], 1);
        assert_eq!(value["total_quantity"], 2);
        assert_eq!(value["items_quantity"]["A"], 2);
        assert_eq!(value["sku_string"], "A");
    }
}
