//! HTTP client for the storefront API.
//!
//! Provides a small builder API over a pluggable [`Transport`], with JSON
//! handling, server error messages and CSRF token round-tripping built in.
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront_data::{FetchClient, HttpTransport};
//! use std::time::Duration;
//!
//! let client = FetchClient::new(HttpTransport::new(Duration::from_secs(10))?)
//!     .with_base_url("https://shop.example");
//!
//! let countries: Vec<Choice> = client
//!     .get("/api/v1/shipping/countries/")
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod csrf;
mod error;
mod request;
mod response;
mod transport;

use std::collections::HashMap;
use std::sync::Arc;

pub use csrf::{CsrfToken, CSRF_COOKIE, CSRF_HEADER};
pub use error::FetchError;
pub use request::{Method, Request, RequestBuilder};
pub use response::Response;
pub use transport::{HttpTransport, ScriptedTransport, Transport};

/// HTTP client for the storefront API.
///
/// Cloning is cheap; clones share the transport and the CSRF token.
#[derive(Clone)]
pub struct FetchClient {
    base_url: Option<String>,
    default_headers: HashMap<String, String>,
    transport: Arc<dyn Transport>,
    csrf: CsrfToken,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a client over the given transport.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Create a client over a transport the caller keeps a handle to.
    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: None,
            default_headers: HashMap::new(),
            transport,
            csrf: CsrfToken::new(),
        }
    }

    /// Create a client with a base URL that will be prepended to all requests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Share an existing CSRF token store.
    pub fn with_csrf(mut self, csrf: CsrfToken) -> Self {
        self.csrf = csrf;
        self
    }

    pub fn csrf(&self) -> &CsrfToken {
        &self.csrf
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = match &self.base_url {
            Some(base) if !url.starts_with("http://") && !url.starts_with("https://") => {
                format!("{}{}", base.trim_end_matches('/'), url)
            }
            _ => url,
        };

        let builder = RequestBuilder::new(method, full_url)
            .accept("application/json")
            .headers(self.default_headers.clone());

        ClientRequestBuilder {
            builder,
            transport: Arc::clone(&self.transport),
            csrf: self.csrf.clone(),
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
    csrf: CsrfToken,
}

impl ClientRequestBuilder {
    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Send the request and return the response.
    ///
    /// Non-2xx responses are returned as-is; call
    /// [`Response::error_for_status`] to turn them into errors.
    pub async fn send(self) -> Result<Response, FetchError> {
        let mut request = self.builder.build()?;
        self.csrf.apply(&mut request);

        let method = request.method;
        let url = request.url.clone();
        tracing::debug!(method = method.as_str(), %url, "sending request");

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(method = method.as_str(), %url, error = %e, "request failed");
                return Err(e);
            }
        };

        self.csrf.capture(&response);
        tracing::debug!(method = method.as_str(), %url, status = response.status, "received response");
        Ok(response)
    }

    /// Send the request, fail on non-2xx and decode the JSON body.
    pub async fn fetch_json<T: serde::de::DeserializeOwned>(self) -> Result<T, FetchError> {
        self.send().await?.error_for_status()?.json()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Response, Transport};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie_response() -> Response {
        let mut headers = HashMap::new();
        headers.insert("Set-Cookie".to_string(), "csrftoken=from-server; Path=/".to_string());
        Response::new(200, headers, b"[]".to_vec())
    }

    #[tokio::test]
    async fn test_base_url_is_prepended() {
        let transport = Arc::new(ScriptedTransport::new().on_json(
            Method::Get,
            "/api/v1/home/",
            &serde_json::json!({}),
        ));
        let client = FetchClient::from_shared(transport.clone())
            .with_base_url("http://shop.test/");

        client.get("/api/v1/home/").send().await.unwrap();
        assert_eq!(transport.requests()[0].url, "http://shop.test/api/v1/home/");
    }

    #[tokio::test]
    async fn test_csrf_token_round_trip() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on(Method::Get, "/api/v1/shipping/countries/", cookie_response())
                .on_json(Method::Post, "/api/v1/cart/check/", &serde_json::json!({})),
        );
        let client = FetchClient::from_shared(transport.clone());

        client.get("/api/v1/shipping/countries/").send().await.unwrap();
        client
            .post("/api/v1/cart/check/")
            .json(&serde_json::json!({"coupon": ""}))
            .unwrap()
            .send()
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].header(CSRF_HEADER), None);
        assert_eq!(requests[1].header(CSRF_HEADER), Some("from-server"));
    }

    #[tokio::test]
    async fn test_fetch_json_surfaces_server_message() {
        let transport = ScriptedTransport::new().on(
            Method::Post,
            "/api/v1/cart/check/",
            Response::new(
                400,
                HashMap::new(),
                br#"{"message": "Coupon expired"}"#.to_vec(),
            ),
        );
        let client = FetchClient::new(transport);

        let err = client
            .post("/api/v1/cart/check/")
            .fetch_json::<serde_json::Value>()
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Coupon expired"));
    }
}
