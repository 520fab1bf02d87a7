//! Product option derivation from a saved API response.

use anyhow::{Context as _, Result};
use serde::Deserialize;
use serde_json::json;
use storefront_core::catalog::{derive_options, DerivedOptions, ProductDetails, VariantRecord};

use super::OptionsArgs;
use crate::context::Context;

/// Either a full product details body or a bare variant list.
#[derive(Deserialize)]
#[serde(untagged)]
enum VariantSource {
    Variants(Vec<VariantRecord>),
    Details(ProductDetails),
}

impl VariantSource {
    fn into_variants(self) -> Vec<VariantRecord> {
        match self {
            VariantSource::Variants(variants) => variants,
            VariantSource::Details(details) => details.related_product_items,
        }
    }
}

fn parse_variants(content: &str) -> Result<Vec<VariantRecord>> {
    let source: VariantSource =
        serde_json::from_str(content).context("Expected product details or a list of variants")?;
    Ok(source.into_variants())
}

/// Run the options command.
pub async fn run(args: OptionsArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.file);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let variants =
        parse_variants(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    let derived = derive_options(&variants);
    let selected: Vec<&str> = args.select.iter().map(String::as_str).collect();
    let matching = matching(&derived, &selected);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "options": derived.options,
            "multi_valued": derived.multi_valued,
            "matching_variants": matching,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Options from {} variant(s)", variants.len()));
    for (attribute, entries) in &derived.options {
        let values: Vec<&str> = entries.iter().map(|e| e.value.as_str()).collect();
        let label = if derived.is_multi_valued(attribute) {
            format!("{} (multi)", attribute)
        } else {
            attribute.clone()
        };
        ctx.output.kv(&label, &values.join(", "));
    }

    if !selected.is_empty() {
        ctx.output.header(&format!("Variants with {}", selected.join(" + ")));
        if matching.is_empty() {
            ctx.output.warn("No variant matches the selection");
        }
        for slug in &matching {
            ctx.output.list_item(slug);
        }
    }

    Ok(())
}

fn matching(derived: &DerivedOptions, selected: &[&str]) -> Vec<String> {
    if selected.is_empty() {
        return Vec::new();
    }
    derived
        .matching_variants(selected)
        .map(|slug| slug.to_string())
        .collect()
}
