//! Route table and resolution.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;

use crate::routing::guards::{
    run_guards, Guard, GuardOutcome, HASH_ONLY_GUARDS, STATIC_PAGE_GUARDS, STORE_GUARDS,
};
use crate::routing::location::RouteLocation;
use crate::routing::RoutingError;

/// Name of the catch-all route.
pub const NOT_FOUND_ROUTE: &str = "page-not-found";

/// Param holding the unmatched path segments, joined with `/`.
pub const NOT_FOUND_PARAM: &str = "pathMatch";

/// Upper bound on guard redirects during one resolution.
pub const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param { name: String, optional: bool },
}

/// A path pattern such as `/product/:slug/:itemS?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern. Optional params may only be followed by optional params.
    pub fn parse(pattern: &str) -> Result<Self, RoutingError> {
        if !pattern.starts_with('/') {
            return Err(RoutingError::BadPattern(format!(
                "{}: must start with '/'",
                pattern
            )));
        }

        let mut segments = Vec::new();
        let mut seen_optional = false;
        for raw in pattern.split('/').filter(|s| !s.is_empty()) {
            let segment = match raw.strip_prefix(':') {
                Some(param) => {
                    let (name, optional) = match param.strip_suffix('?') {
                        Some(name) => (name, true),
                        None => (param, false),
                    };
                    if name.is_empty() {
                        return Err(RoutingError::BadPattern(format!(
                            "{}: empty param name",
                            pattern
                        )));
                    }
                    if seen_optional && !optional {
                        return Err(RoutingError::BadPattern(format!(
                            "{}: required param '{}' after optional one",
                            pattern, name
                        )));
                    }
                    seen_optional |= optional;
                    Segment::Param {
                        name: name.to_string(),
                        optional,
                    }
                }
                None => {
                    if seen_optional {
                        return Err(RoutingError::BadPattern(format!(
                            "{}: static segment after optional param",
                            pattern
                        )));
                    }
                    Segment::Static(raw.to_string())
                }
            };
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match `path`, returning the captured params.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() > self.segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match (segment, parts.get(i)) {
                (Segment::Static(expected), Some(part)) if expected == part => {}
                (Segment::Param { name, .. }, Some(part)) => {
                    params.insert(name.clone(), (*part).to_string());
                }
                (Segment::Param { optional: true, .. }, None) => {}
                _ => return None,
            }
        }
        Some(params)
    }
}

/// A named route with its path patterns and entry guards.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub name: String,
    pattern: RoutePattern,
    aliases: Vec<RoutePattern>,
    guards: Vec<Guard>,
}

impl RouteRecord {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, RoutingError> {
        Ok(Self {
            name: name.into(),
            pattern: RoutePattern::parse(pattern)?,
            aliases: Vec::new(),
            guards: Vec::new(),
        })
    }

    /// Add an alternate path that resolves to this route.
    pub fn with_alias(mut self, pattern: &str) -> Result<Self, RoutingError> {
        self.aliases.push(RoutePattern::parse(pattern)?);
        Ok(self)
    }

    pub fn with_guards(mut self, guards: &[Guard]) -> Self {
        self.guards = guards.to_vec();
        self
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        std::iter::once(&self.pattern)
            .chain(&self.aliases)
            .find_map(|p| p.matches(path))
    }
}

/// Outcome of resolving a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: String,
    pub params: BTreeMap<String, String>,
    /// Final location after guard redirects.
    pub location: RouteLocation,
    /// Number of guard redirects followed.
    pub redirects: usize,
}

impl ResolvedRoute {
    /// The catch-all route for `location`, preserving its path, query and hash.
    pub fn not_found(location: RouteLocation) -> Self {
        let mut params = BTreeMap::new();
        params.insert(NOT_FOUND_PARAM.to_string(), location.segments().join("/"));
        Self {
            name: NOT_FOUND_ROUTE.to_string(),
            params,
            location,
            redirects: 0,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.name == NOT_FOUND_ROUTE
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Percent-decoded value of a path param (`red%20ring` is `red ring`).
    pub fn decoded_param(&self, name: &str) -> Option<String> {
        self.param(name)
            .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
    }
}

/// Ordered route table.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<RouteRecord>,
    max_redirects: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            max_redirects: MAX_REDIRECTS,
        }
    }

    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn add(mut self, record: RouteRecord) -> Self {
        self.routes.push(record);
        self
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    pub fn route(&self, name: &str) -> Option<&RouteRecord> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// The storefront's route table.
    pub fn storefront() -> Result<Self, RoutingError> {
        let routes = [
            RouteRecord::new("home", "/home")?
                .with_alias("/")?
                .with_guards(STATIC_PAGE_GUARDS),
            RouteRecord::new("categoryVariation", "/categories/:slug")?
                .with_guards(HASH_ONLY_GUARDS),
            RouteRecord::new(
                "storeCategory",
                "/store/category/:slug/:attr?/:minPrice?/:maxPrice?/:page?",
            )?
            .with_guards(STORE_GUARDS),
            RouteRecord::new("storeSearch", "/store/search/:query/:page?")?
                .with_guards(STORE_GUARDS),
            RouteRecord::new("product", "/product/:slug/:itemS?")?.with_guards(HASH_ONLY_GUARDS),
            RouteRecord::new("checkout", "/checkout")?.with_guards(STATIC_PAGE_GUARDS),
            RouteRecord::new("checkoutCart", "/checkout/cart")?.with_guards(STATIC_PAGE_GUARDS),
            RouteRecord::new("checkoutShipping", "/checkout/shipping")?
                .with_guards(STATIC_PAGE_GUARDS),
            RouteRecord::new("checkoutPayment", "/checkout/payment")?
                .with_guards(STATIC_PAGE_GUARDS),
            RouteRecord::new("contact", "/contact")?.with_guards(STATIC_PAGE_GUARDS),
            RouteRecord::new("about", "/about")?.with_guards(STATIC_PAGE_GUARDS),
        ];

        Ok(routes.into_iter().fold(Self::new(), Router::add))
    }

    fn lookup(&self, path: &str) -> Option<(&RouteRecord, BTreeMap<String, String>)> {
        self.routes
            .iter()
            .find_map(|r| r.matches(path).map(|params| (r, params)))
    }

    /// Resolve `location`, following guard redirects until the target is stable.
    pub fn resolve(&self, location: RouteLocation) -> Result<ResolvedRoute, RoutingError> {
        let mut target = location;
        let mut redirects = 0;

        loop {
            let Some((record, params)) = self.lookup(&target.path) else {
                tracing::debug!(path = %target.path, "no route matched");
                let mut resolved = ResolvedRoute::not_found(target);
                resolved.redirects = redirects;
                return Ok(resolved);
            };

            let mut to = target.clone();
            match run_guards(record.guards(), &mut to) {
                GuardOutcome::Proceed => {
                    return Ok(ResolvedRoute {
                        name: record.name.clone(),
                        params,
                        location: to,
                        redirects,
                    });
                }
                GuardOutcome::Redirect(next) => {
                    redirects += 1;
                    if redirects > self.max_redirects {
                        return Err(RoutingError::RedirectLoop {
                            path: next.to_url(),
                            limit: self.max_redirects,
                        });
                    }
                    tracing::debug!(from = %target, to = %next, route = %record.name, "guard redirect");
                    target = next;
                }
            }
        }
    }

    /// Resolve an origin-relative URL.
    pub fn resolve_url(&self, url: &str) -> Result<ResolvedRoute, RoutingError> {
        self.resolve(RouteLocation::parse(url))
    }
}
