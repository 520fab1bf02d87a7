//! Cart reconciliation against the API.

use anyhow::Result;
use serde_json::json;
use storefront_core::checkout::Checkout;
use storefront_data::FetchClient;

use super::ReconcileArgs;
use crate::context::Context;

/// Run the reconcile command.
pub async fn run(args: ReconcileArgs, ctx: &Context) -> Result<()> {
    let mut checkout = ctx.checkout()?;
    let client = ctx.client()?;
    let endpoint = &ctx.config.api.endpoints.cart_check;
    let logger = ctx.logger(endpoint);

    let before = checkout.items_count();
    if before == 0 {
        ctx.output.info("Cart is empty, nothing to reconcile");
        return Ok(());
    }

    let report = reconcile(&mut checkout, &client, endpoint, args.coupon.as_deref()).await;
    logger.info(&format!(
        "reconciled {} line(s) into {}",
        before, report.lines_after
    ));

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "updated": report.updated,
            "lines_before": before,
            "lines_after": report.lines_after,
            "cart_check_error": report.cart_check_error,
            "total_with_discount": checkout.cart_total_with_discount(),
        }));
        return Ok(());
    }

    if !report.updated {
        ctx.output
            .warn("Could not reach the API; the cart was left as it was");
        return Ok(());
    }

    ctx.output.success(&format!(
        "Cart reconciled: {} of {} line(s) kept",
        report.lines_after, before
    ));
    if let Some(error) = &report.cart_check_error {
        ctx.output.warn(&format!("Cart check: {}", error));
    } else if args.coupon.is_some() {
        let api = checkout.cart_api();
        if !api.coupon_title.is_empty() {
            ctx.output.kv("coupon", &api.coupon_title);
        }
        ctx.output.kv(
            "discount",
            &api.total_discount.display_with(&api.currency_symbol),
        );
        ctx.output.kv(
            "total",
            &checkout
                .cart_total_with_discount()
                .display_with(&api.currency_symbol),
        );
    }

    Ok(())
}

/// What a reconcile run changed.
#[derive(Debug, PartialEq)]
struct ReconcileReport {
    updated: bool,
    lines_after: usize,
    cart_check_error: Option<String>,
}

async fn reconcile(
    checkout: &mut Checkout,
    client: &FetchClient,
    endpoint: &str,
    coupon: Option<&str>,
) -> ReconcileReport {
    let updated = checkout.reconcile(client, endpoint).await;

    let mut cart_check_error = None;
    if let (true, Some(coupon)) = (updated, coupon) {
        checkout.cart_check(client, endpoint, coupon).await;
        let error = &checkout.cart_api().error_msg;
        if !error.is_empty() {
            cart_check_error = Some(error.clone());
        }
    }

    ReconcileReport {
        updated,
        lines_after: checkout.items_count(),
        cart_check_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use storefront_cache::Cache;
    use storefront_core::cart::LineItem;
    use storefront_core::money::Money;
    use storefront_data::{Method, Response, ScriptedTransport};

    const CART_CHECK: &str = "/api/v1/cart/check/";

    fn checkout() -> Checkout {
        let mut checkout = Checkout::new(Cache::in_memory());
        for sku in ["A", "B"] {
            checkout
                .add_item(
                    LineItem::new(sku, sku.to_lowercase(), Money::new(1000)).with_limit_per_order(5),
                )
                .unwrap();
        }
        checkout
    }

    fn catalog() -> serde_json::Value {
        json!([{
            "sku": "A",
            "slug": "a",
            "list_price_amount": "12.00",
            "deal_price_amount": null,
            "price_currency_symbol": "$",
            "limit_per_order": 5,
            "thumbnail": null
        }])
    }

    #[tokio::test]
    async fn test_reconcile_then_check_coupon() {
        let transport = ScriptedTransport::new()
            .on_json(Method::Get, CART_CHECK, &catalog())
            .on(
                Method::Post,
                CART_CHECK,
                Response::new(
                    400,
                    HashMap::new(),
                    br#"{"message": "Coupon expired"}"#.to_vec(),
                ),
            );
        let client = FetchClient::new(transport);
        let mut checkout = checkout();

        let report = reconcile(&mut checkout, &client, CART_CHECK, Some("SPRING")).await;

        assert!(report.updated);
        assert_eq!(report.lines_after, 1);
        assert_eq!(report.cart_check_error.as_deref(), Some("Coupon expired"));
        assert_eq!(checkout.lines()[0].price_amount, Money::new(1200));
    }

    #[tokio::test]
    async fn test_failed_reconcile_skips_cart_check() {
        let transport = Arc::new(ScriptedTransport::new().on(
            Method::Get,
            CART_CHECK,
            Response::new(503, HashMap::new(), Vec::new()),
        ));
        let client = FetchClient::from_shared(transport.clone());
        let mut checkout = checkout();

        let report = reconcile(&mut checkout, &client, CART_CHECK, Some("SPRING")).await;

        assert!(!report.updated);
        assert_eq!(report.lines_after, 2);
        assert_eq!(transport.requests().len(), 1);
    }
}
