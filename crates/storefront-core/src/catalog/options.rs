//! Product option derivation.
//!
//! A product page lists sibling variants (product items), each exposing one or
//! more values per attribute (`color: [red, blue]`, `size: [M]`). This module
//! folds those records into the selectable option lists the page shows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::ItemSlug;

/// One attribute value of a variant, as sent by the product details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    #[serde(rename = "child_attribute")]
    pub value: String,
    #[serde(rename = "parent_attribute", default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl AttributeValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            parent: None,
            thumbnail: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// A flattened attribute record: which attribute a value belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRecord<'a> {
    pub attribute_name: &'a str,
    pub child_value: &'a str,
    pub parent_value: Option<&'a str>,
    pub thumbnail: Option<&'a str>,
}

/// A sibling variant with its attribute values grouped by attribute name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariantRecord {
    pub slug: ItemSlug,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<AttributeValue>>,
}

impl VariantRecord {
    pub fn new(slug: impl Into<ItemSlug>) -> Self {
        Self {
            slug: slug.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Append values for `name`.
    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = AttributeValue>,
    ) -> Self {
        self.attributes.entry(name.into()).or_default().extend(values);
        self
    }

    /// Iterate every value as a flat record.
    pub fn records(&self) -> impl Iterator<Item = AttributeRecord<'_>> {
        self.attributes.iter().flat_map(|(name, values)| {
            values.iter().map(move |v| AttributeRecord {
                attribute_name: name,
                child_value: &v.value,
                parent_value: v.parent.as_deref(),
                thumbnail: v.thumbnail.as_deref(),
            })
        })
    }
}

/// A selectable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionEntry {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl OptionEntry {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            parent_attribute: None,
            thumbnail: None,
            disabled: false,
        }
    }
}

impl From<AttributeRecord<'_>> for OptionEntry {
    fn from(record: AttributeRecord<'_>) -> Self {
        Self {
            value: record.child_value.to_string(),
            parent_attribute: record.parent_value.map(str::to_string),
            thumbnail: record.thumbnail.map(str::to_string),
            disabled: false,
        }
    }
}

/// Attribute name to its options, unique by value in first-seen order.
pub type OptionSet = BTreeMap<String, Vec<OptionEntry>>;

/// Everything derived from a variant list.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DerivedOptions {
    pub options: OptionSet,
    /// Whether some single variant exposes several values for the attribute.
    pub multi_valued: BTreeMap<String, bool>,
    /// Variant slug to all values it exposes.
    pub variant_values: BTreeMap<ItemSlug, Vec<String>>,
}

impl DerivedOptions {
    pub fn is_multi_valued(&self, attribute: &str) -> bool {
        self.multi_valued.get(attribute).copied().unwrap_or(false)
    }

    /// Slugs of the variants exposing every one of `values`.
    pub fn matching_variants<'a>(&'a self, values: &'a [&'a str]) -> impl Iterator<Item = &'a ItemSlug> {
        self.variant_values.iter().filter_map(move |(slug, exposed)| {
            values
                .iter()
                .all(|v| exposed.iter().any(|e| e == v))
                .then_some(slug)
        })
    }
}

fn push_unique(list: &mut Vec<OptionEntry>, entry: OptionEntry) {
    if !list.iter().any(|e| e.value == entry.value) {
        list.push(entry);
    }
}

/// Fold sibling variants into option lists.
///
/// ```
/// use storefront_core::catalog::{derive_options, AttributeValue, VariantRecord};
///
/// let variants = vec![
///     VariantRecord::new("ring-red").with_attribute("color", [AttributeValue::new("red")]),
///     VariantRecord::new("ring-red-blue").with_attribute(
///         "color",
///         [AttributeValue::new("red"), AttributeValue::new("blue")],
///     ),
/// ];
/// let derived = derive_options(&variants);
/// assert_eq!(derived.options["color"].len(), 2);
/// assert!(derived.is_multi_valued("color"));
/// ```
pub fn derive_options(variants: &[VariantRecord]) -> DerivedOptions {
    let mut derived = DerivedOptions::default();

    for variant in variants {
        for (name, attribute_values) in &variant.attributes {
            derived.options.entry(name.clone()).or_default();
            let multi = derived.multi_valued.entry(name.clone()).or_insert(false);
            if attribute_values.len() > 1 {
                *multi = true;
            }
        }

        // A repeated slug replaces the values of the earlier variant.
        let mut values = Vec::new();
        for record in variant.records() {
            values.push(record.child_value.to_string());
            if let Some(options) = derived.options.get_mut(record.attribute_name) {
                push_unique(options, OptionEntry::from(record));
            }
        }
        derived.variant_values.insert(variant.slug.clone(), values);
    }

    derived
}

/// Options of the selected variant alone.
pub fn derive_selected_options(selected: &BTreeMap<String, Vec<String>>) -> OptionSet {
    selected
        .iter()
        .map(|(name, values)| {
            let mut list = Vec::new();
            for value in values {
                push_unique(&mut list, OptionEntry::new(value.as_str()));
            }
            (name.clone(), list)
        })
        .collect()
}
