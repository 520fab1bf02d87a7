//! Navigation guards that repair route queries before a view sees them.
//!
//! Each guard inspects the target and either lets navigation proceed or asks
//! for a redirect to a repaired target. `normalize_attr` is the exception: it
//! rewrites the query in place and never redirects, since a cleaned `attr`
//! would otherwise trigger the same redirect on every entry.

use crate::routing::location::{keys, RouteLocation, SelectBy};

/// Longest attribute title the backend accepts, exclusive.
pub const MAX_ATTR_LEN: usize = 25;

/// Inclusive bounds for the `minPrice` query value.
pub const MIN_PRICE_RANGE: (f64, f64) = (0.0, 4999.0);

/// Inclusive bounds for the `maxPrice` query value.
pub const MAX_PRICE_RANGE: (f64, f64) = (1.0, 5000.0);

/// What a guard decided about a navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Proceed,
    Redirect(RouteLocation),
}

impl GuardOutcome {
    pub fn is_redirect(&self) -> bool {
        matches!(self, GuardOutcome::Redirect(_))
    }
}

/// A navigation guard.
pub type Guard = fn(&mut RouteLocation) -> GuardOutcome;

/// `page` must be a positive integer; anything else becomes `1`.
pub fn normalize_page(to: &mut RouteLocation) -> GuardOutcome {
    let valid = to
        .query_value(keys::PAGE)
        .and_then(|v| v.parse::<i64>().ok())
        .is_some_and(|page| page >= 1);

    if valid {
        return GuardOutcome::Proceed;
    }
    to.query.insert(keys::PAGE.to_string(), "1".to_string());
    GuardOutcome::Redirect(to.clone())
}

/// Trim `attr` tokens and drop the ones too long to be attribute titles.
pub fn normalize_attr(to: &mut RouteLocation) -> GuardOutcome {
    if let Some(attr) = to.query.get_mut(keys::ATTR) {
        *attr = attr
            .split(',')
            .map(str::trim)
            .filter(|token| token.chars().count() < MAX_ATTR_LEN)
            .collect::<Vec<_>>()
            .join(",");
    }
    GuardOutcome::Proceed
}

fn price_in_range(value: &str, (low, high): (f64, f64)) -> bool {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .is_some_and(|v| (low..=high).contains(&v))
}

fn remove_invalid_price(to: &mut RouteLocation, key: &str, range: (f64, f64)) -> GuardOutcome {
    match to.query_value(key) {
        Some(value) if !price_in_range(value, range) => {
            to.query.remove(key);
            GuardOutcome::Redirect(to.clone())
        }
        _ => GuardOutcome::Proceed,
    }
}

/// Drop `minPrice` unless it is a number in `[0, 4999]`.
pub fn normalize_min_price(to: &mut RouteLocation) -> GuardOutcome {
    remove_invalid_price(to, keys::MIN_PRICE, MIN_PRICE_RANGE)
}

/// Drop `maxPrice` unless it is a number in `[1, 5000]`.
pub fn normalize_max_price(to: &mut RouteLocation) -> GuardOutcome {
    remove_invalid_price(to, keys::MAX_PRICE, MAX_PRICE_RANGE)
}

/// Drop `selectBy` unless it names a known sort order.
pub fn normalize_select_by(to: &mut RouteLocation) -> GuardOutcome {
    match to.query_value(keys::SELECT_BY) {
        Some(value) if value.parse::<SelectBy>().is_err() => {
            to.query.remove(keys::SELECT_BY);
            GuardOutcome::Redirect(to.clone())
        }
        _ => GuardOutcome::Proceed,
    }
}

/// Strip every query parameter.
pub fn clear_query(to: &mut RouteLocation) -> GuardOutcome {
    if to.query.is_empty() {
        return GuardOutcome::Proceed;
    }
    to.query.clear();
    GuardOutcome::Redirect(to.clone())
}

/// Strip the hash fragment.
pub fn clear_hash(to: &mut RouteLocation) -> GuardOutcome {
    if to.hash.is_empty() {
        return GuardOutcome::Proceed;
    }
    to.hash.clear();
    GuardOutcome::Redirect(to.clone())
}

/// Guards for store listings (category and search).
pub const STORE_GUARDS: &[Guard] = &[
    normalize_page,
    normalize_attr,
    normalize_min_price,
    normalize_max_price,
    normalize_select_by,
    clear_hash,
];

/// Guards for pages that take no query at all.
pub const STATIC_PAGE_GUARDS: &[Guard] = &[clear_query, clear_hash];

/// Guards for pages that only drop the hash.
pub const HASH_ONLY_GUARDS: &[Guard] = &[clear_hash];

/// Run `guards` in order against `to`, stopping at the first redirect.
pub fn run_guards(guards: &[Guard], to: &mut RouteLocation) -> GuardOutcome {
    for guard in guards {
        let outcome = guard(to);
        if outcome.is_redirect() {
            return outcome;
        }
    }
    GuardOutcome::Proceed
}

/// Apply every guard's repair in one pass without short-circuiting.
///
/// The result is a fixed point: running any guard of `guards` on it proceeds.
pub fn normalize(guards: &[Guard], location: &RouteLocation) -> RouteLocation {
    let mut to = location.clone();
    for guard in guards {
        if let GuardOutcome::Redirect(next) = guard(&mut to) {
            to = next;
        }
    }
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn store(query: &[(&str, &str)]) -> RouteLocation {
        query
            .iter()
            .fold(RouteLocation::new("/store/category/rings"), |loc, (k, v)| {
                loc.with_query(*k, *v)
            })
    }

    #[test]
    fn test_page_missing_or_invalid() {
        let cases: Vec<Vec<(&str, &str)>> = vec![
            vec![],
            vec![("page", "abc")],
            vec![("page", "0")],
            vec![("page", "-3")],
            vec![("page", "1.5")],
        ];
        for query in cases {
            let mut to = store(&query);
            let outcome = normalize_page(&mut to);
            assert!(outcome.is_redirect(), "{:?}", query);
            assert_eq!(to.query_value("page"), Some("1"));
        }
    }

    #[test]
    fn test_page_valid() {
        let mut to = store(&[("page", "7")]);
        assert_eq!(normalize_page(&mut to), GuardOutcome::Proceed);
        assert_eq!(to.query_value("page"), Some("7"));
    }

    #[test]
    fn test_attr_is_trimmed_in_place() {
        let long = "x".repeat(25);
        let mut to = store(&[("attr", &format!(" gold , {} ,silver", long))]);
        assert_eq!(normalize_attr(&mut to), GuardOutcome::Proceed);
        assert_eq!(to.query_value("attr"), Some("gold,silver"));
    }

    #[test]
    fn test_attr_keeps_24_char_token() {
        let token = "y".repeat(24);
        let mut to = store(&[("attr", &token)]);
        normalize_attr(&mut to);
        assert_eq!(to.query_value("attr"), Some(token.as_str()));
    }

    #[test]
    fn test_attr_absent_is_noop() {
        let mut to = store(&[]);
        assert_eq!(normalize_attr(&mut to), GuardOutcome::Proceed);
        assert!(!to.query.contains_key("attr"));
    }

    #[test]
    fn test_min_price_non_numeric_removed() {
        let mut to = store(&[("minPrice", "abc")]);
        let outcome = normalize_min_price(&mut to);
        assert!(outcome.is_redirect());
        assert!(!to.query.contains_key("minPrice"));
    }

    #[test]
    fn test_min_price_out_of_range_removed() {
        let mut to = store(&[("minPrice", "5000")]);
        assert!(normalize_min_price(&mut to).is_redirect());
        assert!(!to.query.contains_key("minPrice"));

        let mut to = store(&[("minPrice", "-1")]);
        assert!(normalize_min_price(&mut to).is_redirect());
    }

    #[test]
    fn test_min_price_valid_unchanged() {
        let mut to = store(&[("minPrice", "100")]);
        assert_eq!(normalize_min_price(&mut to), GuardOutcome::Proceed);
        assert_eq!(to.query_value("minPrice"), Some("100"));

        let mut to = store(&[("minPrice", "0")]);
        assert_eq!(normalize_min_price(&mut to), GuardOutcome::Proceed);
    }

    #[test]
    fn test_max_price_bounds() {
        let mut to = store(&[("maxPrice", "0")]);
        assert!(normalize_max_price(&mut to).is_redirect());

        let mut to = store(&[("maxPrice", "5000")]);
        assert_eq!(normalize_max_price(&mut to), GuardOutcome::Proceed);

        let mut to = store(&[("maxPrice", "")]);
        assert!(normalize_max_price(&mut to).is_redirect());
    }

    #[test]
    fn test_select_by() {
        let mut to = store(&[("selectBy", "newest")]);
        assert!(normalize_select_by(&mut to).is_redirect());
        assert!(!to.query.contains_key("selectBy"));

        let mut to = store(&[("selectBy", "deals")]);
        assert_eq!(normalize_select_by(&mut to), GuardOutcome::Proceed);
    }

    #[test]
    fn test_clear_query_and_hash() {
        let mut to = RouteLocation::new("/about").with_query("a", "1").with_hash("x");
        assert!(clear_query(&mut to).is_redirect());
        assert!(to.query.is_empty());
        assert!(clear_hash(&mut to).is_redirect());
        assert!(to.hash.is_empty());
        assert_eq!(clear_query(&mut to), GuardOutcome::Proceed);
        assert_eq!(clear_hash(&mut to), GuardOutcome::Proceed);
    }

    #[test]
    fn test_run_guards_stops_at_first_redirect() {
        let mut to = store(&[("minPrice", "abc"), ("selectBy", "bogus")]).with_hash("h");
        let outcome = run_guards(STORE_GUARDS, &mut to);
        let GuardOutcome::Redirect(next) = outcome else {
            panic!("expected redirect");
        };
        // page fixed first, the rest waits for the next pass
        assert_eq!(next.query_value("page"), Some("1"));
        assert_eq!(next.query_value("minPrice"), Some("abc"));
        assert_eq!(next.hash, "#h");
    }

    #[test]
    fn test_valid_query_is_fixed_point() {
        let mut to = store(&[
            ("page", "2"),
            ("attr", "gold"),
            ("minPrice", "100"),
            ("maxPrice", "300"),
            ("selectBy", "price-low-to-high"),
        ]);
        let before = to.clone();
        assert_eq!(run_guards(STORE_GUARDS, &mut to), GuardOutcome::Proceed);
        assert_eq!(run_guards(STORE_GUARDS, &mut to), GuardOutcome::Proceed);
        assert_eq!(to, before);
    }

    fn query_value() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            "[0-9]{1,5}".prop_map(Some),
            "-?[0-9]{1,4}(\\.[0-9]{1,2})?".prop_map(Some),
            "[a-z ,-]{0,60}".prop_map(Some),
            prop::sample::select(vec!["deals", "price-low-to-high", "price-high-to-low"])
                .prop_map(|s| Some(s.to_string())),
        ]
    }

    proptest! {
        #[test]
        fn prop_normalize_reaches_fixed_point(
            page in query_value(),
            attr in query_value(),
            min in query_value(),
            max in query_value(),
            select in query_value(),
            hash in "[a-z]{0,3}",
        ) {
            let mut loc = RouteLocation::new("/store/category/rings").with_hash(&hash);
            for (key, value) in [("page", page), ("attr", attr), ("minPrice", min), ("maxPrice", max), ("selectBy", select)] {
                if let Some(value) = value {
                    loc = loc.with_query(key, value);
                }
            }

            let once = normalize(STORE_GUARDS, &loc);
            let twice = normalize(STORE_GUARDS, &once);
            prop_assert_eq!(&once, &twice);

            let mut check = once.clone();
            prop_assert_eq!(run_guards(STORE_GUARDS, &mut check), GuardOutcome::Proceed);
        }
    }
}
