//! Newtype identifiers.
//!
//! Keeps SKUs and item slugs apart: checkout lines are keyed by SKU while
//! "is this item in the cart" lookups go by slug.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

define_id!(
    /// Stock keeping unit of a purchasable variant.
    Sku
);
define_id!(
    /// URL slug of a product item (variant).
    ItemSlug
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_str_and_display() {
        let sku: Sku = "SKU-1".into();
        assert_eq!(sku.as_str(), "SKU-1");
        assert_eq!(format!("{}", sku), "SKU-1");
        assert_eq!(sku, "SKU-1");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let slug = ItemSlug::new("red-shirt-m");
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"red-shirt-m\"");
        let back: ItemSlug = serde_json::from_str("\"red-shirt-m\"").unwrap();
        assert_eq!(back, slug);
    }
}
