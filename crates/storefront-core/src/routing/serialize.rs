//! Query and endpoint string helpers.

use crate::routing::location::RouteQuery;

/// Merge `updates` into `query`.
///
/// Keys whose new value is `None` or one of `unwanted` are removed; the
/// others are set. `query` itself is left untouched.
///
/// ```
/// use storefront_core::routing::{serialize::merge_query, RouteQuery};
///
/// let mut query = RouteQuery::new();
/// query.insert("page".into(), "3".into());
/// query.insert("minPrice".into(), "10".into());
///
/// let merged = merge_query(&query, [("page", Some("1")), ("minPrice", Some(""))], &[""]);
/// assert_eq!(merged.get("page").map(String::as_str), Some("1"));
/// assert!(!merged.contains_key("minPrice"));
/// ```
pub fn merge_query<'a>(
    query: &RouteQuery,
    updates: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
    unwanted: &[&str],
) -> RouteQuery {
    let mut merged = query.clone();
    for (key, value) in updates {
        match value {
            Some(value) if !unwanted.contains(&value) => {
                merged.insert(key.to_string(), value.to_string());
            }
            _ => {
                merged.remove(key);
            }
        }
    }
    merged
}

/// Keep only `registered` keys with non-empty values.
pub fn clean_query(registered: &[&str], query: &RouteQuery) -> RouteQuery {
    query
        .iter()
        .filter(|(k, v)| registered.contains(&k.as_str()) && !v.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Build an API path from a base endpoint, path params and query pairs.
///
/// Params are appended as percent-encoded segments and the path always ends
/// with `/`. Query pairs with empty or missing values are skipped.
///
/// ```
/// use storefront_core::routing::serialize::build_endpoint;
///
/// assert_eq!(
///     build_endpoint("/api/v1/store/products/category/", &["rings"], &[("page", Some("2")), ("attr", None)]),
///     "/api/v1/store/products/category/rings/?page=2"
/// );
/// ```
pub fn build_endpoint(endpoint: &str, params: &[&str], query: &[(&str, Option<&str>)]) -> String {
    let mut path = endpoint.trim_end_matches('/').to_string();
    for param in params {
        path.push('/');
        path.extend(url::form_urlencoded::byte_serialize(param.as_bytes()).map(|chunk| {
            // form encoding writes spaces as '+', paths need %20
            if chunk == "+" {
                "%20"
            } else {
                chunk
            }
        }));
    }
    path.push('/');

    let pairs: Vec<(&str, &str)> = query
        .iter()
        .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (*k, v)))
        .collect();
    if !pairs.is_empty() {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        path.push('?');
        path.push_str(&encoded);
    }
    path
}

/// Replace every whitespace character in `s` with `with`.
pub fn replace_whitespace(s: &str, with: &str) -> String {
    s.chars().fold(String::with_capacity(s.len()), |mut out, c| {
        if c.is_whitespace() {
            out.push_str(with);
        } else {
            out.push(c);
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> RouteQuery {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_query_removes_unwanted() {
        let base = query(&[("page", "4"), ("attr", "gold"), ("selectBy", "deals")]);
        let merged = merge_query(
            &base,
            [("attr", Some("silver")), ("selectBy", None), ("minPrice", Some("0"))],
            &["", "0"],
        );
        assert_eq!(merged, query(&[("attr", "silver"), ("page", "4")]));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn test_clean_query() {
        let q = query(&[("page", "2"), ("utm", "x"), ("attr", "")]);
        assert_eq!(clean_query(&["page", "attr"], &q), query(&[("page", "2")]));
    }

    #[test]
    fn test_build_endpoint_without_query() {
        assert_eq!(
            build_endpoint("/api/v1/product/details/", &["gold-ring"], &[]),
            "/api/v1/product/details/gold-ring/"
        );
        assert_eq!(build_endpoint("/api/v1/home/", &[], &[]), "/api/v1/home/");
    }

    #[test]
    fn test_build_endpoint_encodes() {
        assert_eq!(
            build_endpoint("/api/v1/store/search/", &["red ring/7"], &[("attr", Some("a,b"))]),
            "/api/v1/store/search/red%20ring%2F7/?attr=a%2Cb"
        );
    }

    #[test]
    fn test_build_endpoint_skips_empty_values() {
        assert_eq!(
            build_endpoint("/x/", &["y"], &[("a", Some("")), ("b", None)]),
            "/x/y/"
        );
    }

    #[test]
    fn test_replace_whitespace() {
        assert_eq!(replace_whitespace("gold  ring\tsize 7", "-"), "gold--ring-size-7");
        assert_eq!(replace_whitespace("a b", ""), "ab");
    }
}
