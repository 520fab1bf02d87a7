//! CSRF token capture and injection.

use std::sync::{Arc, RwLock};

use crate::request::Request;
use crate::response::Response;

/// Cookie the API sets to hand out its CSRF token.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header unsafe requests must echo the token in.
pub const CSRF_HEADER: &str = "X-CSRFTOKEN";

/// Shared CSRF token store.
///
/// The token is read from the `csrftoken` cookie of any response and sent back
/// in the `X-CSRFTOKEN` header on every request that is not a safe method.
#[derive(Debug, Clone, Default)]
pub struct CsrfToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl CsrfToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a known token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    pub fn get(&self) -> Option<String> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }

    pub fn set(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(token.into());
        }
    }

    /// Remember the token if `response` sets the CSRF cookie.
    pub fn capture(&self, response: &Response) {
        if let Some((_, value)) = response
            .set_cookies()
            .into_iter()
            .find(|(name, value)| name == CSRF_COOKIE && !value.is_empty())
        {
            tracing::debug!("captured csrf token");
            self.set(value);
        }
    }

    /// Add the CSRF header to `request` when its method requires one.
    pub fn apply(&self, request: &mut Request) {
        if request.method.is_safe() || request.header(CSRF_HEADER).is_some() {
            return;
        }
        if let Some(token) = self.get() {
            request.headers.insert(CSRF_HEADER.to_string(), token);
        }
    }
}
