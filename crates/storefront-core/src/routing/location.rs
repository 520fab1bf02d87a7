//! Navigation targets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Route query parameters, ordered by key.
pub type RouteQuery = BTreeMap<String, String>;

/// Query keys the store views read.
pub mod keys {
    pub const PAGE: &str = "page";
    pub const ATTR: &str = "attr";
    pub const MIN_PRICE: &str = "minPrice";
    pub const MAX_PRICE: &str = "maxPrice";
    pub const SELECT_BY: &str = "selectBy";
    pub const ITEM: &str = "itemS";
}

/// A navigation target: path, query and hash fragment.
///
/// `hash` keeps its leading `#`, or is empty when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteLocation {
    pub path: String,
    #[serde(default)]
    pub query: RouteQuery,
    #[serde(default)]
    pub hash: String,
}

impl RouteLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: RouteQuery::new(),
            hash: String::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_hash(mut self, hash: impl AsRef<str>) -> Self {
        let hash = hash.as_ref().trim_start_matches('#');
        self.hash = if hash.is_empty() {
            String::new()
        } else {
            format!("#{}", hash)
        };
        self
    }

    /// Parse an origin-relative URL such as `/store/category/rings?page=2#top`.
    ///
    /// Query values are percent-decoded; when a key repeats the last value wins.
    pub fn parse(url: &str) -> Self {
        let (rest, hash) = match url.split_once('#') {
            Some((rest, hash)) => (rest, hash),
            None => (url, ""),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        let query = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            query,
            hash: String::new(),
        }
        .with_hash(hash)
    }

    /// Non-empty path segments.
    pub fn segments(&self) -> Vec<String> {
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Render back to an origin-relative URL.
    pub fn to_url(&self) -> String {
        let mut url = self.path.clone();
        if !self.query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.query.iter())
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        url.push_str(&self.hash);
        url
    }
}

impl fmt::Display for RouteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

/// Sort order selectable on store listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectBy {
    Deals,
    PriceLowToHigh,
    PriceHighToLow,
}

impl SelectBy {
    pub const ALL: [SelectBy; 3] = [
        SelectBy::Deals,
        SelectBy::PriceLowToHigh,
        SelectBy::PriceHighToLow,
    ];

    /// Query value (e.g. `price-low-to-high`).
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectBy::Deals => "deals",
            SelectBy::PriceLowToHigh => "price-low-to-high",
            SelectBy::PriceHighToLow => "price-high-to-low",
        }
    }

    /// Label shown in the sort dropdown.
    pub fn label(&self) -> &'static str {
        match self {
            SelectBy::Deals => "Deals",
            SelectBy::PriceLowToHigh => "Price: Low to High",
            SelectBy::PriceHighToLow => "Price: High to Low",
        }
    }
}

impl fmt::Display for SelectBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SelectBy::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| format!("unknown sort option: {}", s))
    }
}
