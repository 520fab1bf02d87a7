//! Pluggable request transports.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::request::{Method, Request};
use crate::response::Response;
use crate::FetchError;

/// Something that can carry a [`Request`] to the API and bring back a [`Response`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, FetchError>;
}

/// Transport backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::RequestError(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        let mut builder = self.client.request(request.method.into(), url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else { continue };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push('\n');
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let body = response.bytes().await?.to_vec();
        Ok(Response::new(status, headers, body))
    }
}

/// In-process transport that replays canned responses.
///
/// Responses are registered per method and path (query string ignored). When
/// several are queued for the same route they are served in order and the last
/// one keeps being served. Unregistered routes answer `404`.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Response>>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `method` on `path`.
    pub fn on(self, method: Method, path: impl Into<String>, response: Response) -> Self {
        if let Ok(mut routes) = self.routes.lock() {
            routes
                .entry((method, path.into()))
                .or_default()
                .push_back(response);
        }
        self
    }

    /// Queue a `200` JSON response for `method` on `path`.
    pub fn on_json<T: serde::Serialize>(
        self,
        method: Method,
        path: impl Into<String>,
        value: &T,
    ) -> Self {
        match Response::json_ok(value) {
            Ok(response) => self.on(method, path, response),
            Err(_) => self,
        }
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

fn route_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let key = (request.method, route_path(&request.url));
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let mut routes = self
            .routes
            .lock()
            .map_err(|e| FetchError::RequestError(e.to_string()))?;
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        Ok(response.unwrap_or_else(|| {
            Response::new(
                404,
                HashMap::new(),
                br#"{"message": "Not found."}"#.to_vec(),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestBuilder;

    fn get(url: &str) -> Request {
        RequestBuilder::new(Method::Get, url).build().unwrap()
    }

    #[tokio::test]
    async fn test_scripted_routes_ignore_host_and_query() {
        let transport = ScriptedTransport::new().on_json(
            Method::Get,
            "/api/v1/home/",
            &serde_json::json!({"ok": true}),
        );

        let resp = transport
            .send(get("http://shop.test/api/v1/home/?page=2"))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_queue_serves_in_order_then_repeats_last() {
        let transport = ScriptedTransport::new()
            .on(Method::Get, "/x/", Response::new(500, HashMap::new(), Vec::new()))
            .on(Method::Get, "/x/", Response::new(200, HashMap::new(), Vec::new()));

        assert_eq!(transport.send(get("/x/")).await.unwrap().status, 500);
        assert_eq!(transport.send(get("/x/")).await.unwrap().status, 200);
        assert_eq!(transport.send(get("/x/")).await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_scripted_unknown_route_is_404() {
        let transport = ScriptedTransport::new();
        let err = transport
            .send(get("/missing/"))
            .await
            .unwrap()
            .error_for_status()
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
