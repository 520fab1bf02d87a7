//! Route resolution.

use anyhow::{Context as _, Result};
use serde_json::json;
use storefront_core::endpoints::Endpoints;
use storefront_core::routing::{keys, ResolvedRoute, Router};

use super::ResolveArgs;
use crate::context::Context;
use crate::output::route_badge;

/// Run the resolve command.
pub async fn run(args: ResolveArgs, ctx: &Context) -> Result<()> {
    let router = Router::storefront().context("Failed to build route table")?;
    let route = router
        .resolve_url(&args.url)
        .with_context(|| format!("Failed to resolve {}", args.url))?;

    ctx.logger(&route.name)
        .debug(&format!("{} resolved after {} redirect(s)", args.url, route.redirects));

    let api = api_endpoint(&route, &ctx.config.api.endpoints);

    if ctx.output.is_json() {
        let mut value = to_json(&route);
        value["api"] = json!(api);
        ctx.output.json(&value);
        return Ok(());
    }

    ctx.output.header("Resolved route");
    ctx.output
        .kv("route", &route_badge(&route.name, route.is_not_found()));
    for (name, value) in &route.params {
        ctx.output.kv(name, value);
    }
    ctx.output.kv("url", &route.location.to_url());
    if let Some(api) = &api {
        ctx.output.kv("api", api);
    }
    if route.redirects > 0 {
        ctx.output
            .warn(&format!("query repaired with {} redirect(s)", route.redirects));
    }

    Ok(())
}

/// API path the resolved page loads its data from.
fn api_endpoint(route: &ResolvedRoute, endpoints: &Endpoints) -> Option<String> {
    let query = &route.location.query;
    match route.name.as_str() {
        "categoryVariation" => Some(endpoints.category_details(&route.decoded_param("slug")?)),
        "storeCategory" => Some(endpoints.category_products(&route.decoded_param("slug")?, query)),
        "storeSearch" => Some(endpoints.search(&route.decoded_param("query")?, query)),
        "product" => {
            let item = route
                .decoded_param(keys::ITEM)
                .or_else(|| route.location.query_value(keys::ITEM).map(str::to_string));
            Some(endpoints.product_details(
                &route.decoded_param("slug")?,
                item.as_deref(),
                route.location.query_value(keys::ATTR),
            ))
        }
        _ => None,
    }
}

fn to_json(route: &ResolvedRoute) -> serde_json::Value {
    json!({
        "name": route.name,
        "params": route.params,
        "url": route.location.to_url(),
        "redirects": route.redirects,
        "not_found": route.is_not_found(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let router = Router::storefront().unwrap();
        let route = router.resolve_url("/store/category/rings?page=abc").unwrap();
        let value = to_json(&route);

        assert_eq!(value["name"], "storeCategory");
        assert_eq!(value["params"]["slug"], "rings");
        assert_eq!(value["url"], "/store/category/rings?page=1");
        assert_eq!(value["not_found"], false);
    }

    #[test]
    fn test_api_endpoint_for_listings() {
        let router = Router::storefront().unwrap();
        let endpoints = Endpoints::default();

        let route = router
            .resolve_url("/store/search/gold%09ring?maxPrice=50&page=2")
            .unwrap();
        assert_eq!(
            api_endpoint(&route, &endpoints).as_deref(),
            Some("/api/v1/store/search/gold%20ring/?page=2&max_price=50")
        );

        let route = router.resolve_url("/store/category/rings?page=abc").unwrap();
        assert_eq!(
            api_endpoint(&route, &endpoints).as_deref(),
            Some("/api/v1/store/products/category/rings/?page=1")
        );
    }

    #[test]
    fn test_api_endpoint_for_product_and_static_pages() {
        let router = Router::storefront().unwrap();
        let endpoints = Endpoints::default();

        let route = router.resolve_url("/product/ring/ring-red").unwrap();
        assert_eq!(
            api_endpoint(&route, &endpoints).as_deref(),
            Some("/api/v1/product/details/ring/?item_s=ring-red")
        );
        let route = router.resolve_url("/about").unwrap();
        assert_eq!(api_endpoint(&route, &endpoints), None);
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let router = Router::storefront().unwrap();
        let value = to_json(&router.resolve_url("/nowhere/at/all").unwrap());
        assert_eq!(value["not_found"], true);
        assert_eq!(value["params"]["pathMatch"], "nowhere/at/all");
    }
}
