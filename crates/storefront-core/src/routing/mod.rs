//! Client-side routing: route table, query guards and URL helpers.

mod guards;
mod location;
mod router;
pub mod serialize;

pub use guards::*;
pub use location::{keys, RouteLocation, RouteQuery, SelectBy};
pub use router::{
    ResolvedRoute, RoutePattern, RouteRecord, Router, MAX_REDIRECTS, NOT_FOUND_PARAM,
    NOT_FOUND_ROUTE,
};

use thiserror::Error;

/// Errors raised while building or resolving routes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// Guards kept redirecting.
    #[error("Too many redirects (limit {limit}) while resolving {path}")]
    RedirectLoop { path: String, limit: usize },

    /// Malformed route pattern.
    #[error("Invalid route pattern: {0}")]
    BadPattern(String),
}
