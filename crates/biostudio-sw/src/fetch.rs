//! Request and response types plus the network seam.
//!
//! `Fetcher` is the only place the worker touches the network, so the
//! routing policy can be exercised against an in-memory implementation.

use std::future::Future;

use biostudio_common::{Result, StudioError};
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use mime::Mime;
use tracing::{debug, trace};
use url::Url;

/// An intercepted HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
}

impl Request {
    /// Create a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            headers: HeaderMap::new(),
        }
    }

    /// Create a request with an explicit method.
    pub fn with_method(method: Method, url: Url) -> Self {
        Self {
            url,
            method,
            headers: HeaderMap::new(),
        }
    }

    /// Add a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The Accept header value, if any.
    pub fn accept(&self) -> Option<&str> {
        self.headers.get(header::ACCEPT).and_then(|v| v.to_str().ok())
    }

    /// Whether the declared acceptable content type includes HTML.
    pub fn wants_html(&self) -> bool {
        self.accept().is_some_and(|a| a.contains("text/html"))
    }
}

/// A materialized HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Whether this response was served from the cache store.
    pub from_cache: bool,
}

impl Response {
    /// Check if the response is successful (2xx).
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Parsed Content-Type, if present and valid.
    pub fn content_type(&self) -> Option<Mime> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Mime>().ok())
    }
}

/// Network seam. Implementations issue a real (or simulated) fetch.
pub trait Fetcher: Send + Sync {
    /// Fetch the request over the network.
    fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<F: Fetcher> Fetcher for std::sync::Arc<F> {
    fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).fetch(request)
    }
}

/// Network client configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// User agent string.
    pub user_agent: String,
    /// Accept-Language header.
    pub accept_language: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            user_agent: "BioStudioSW/1.0".to_string(),
            accept_language: "pt-BR,pt;q=0.9,en;q=0.8".to_string(),
        }
    }
}

/// Reqwest-backed fetcher.
///
/// No timeout is configured here: per-request stalls are bounded only by
/// the transport, and the routing policy handles failures.
pub struct NetworkClient {
    client: reqwest::Client,
    config: LoaderConfig,
}

impl NetworkClient {
    /// Create a new network client.
    pub fn new(config: LoaderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| StudioError::network_with_source("failed to build HTTP client", e))?;

        Ok(Self { client, config })
    }

    async fn send(&self, request: &Request) -> Result<Response> {
        debug!(url = %request.url, method = %request.method, "Fetching resource");

        let mut req_builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        for (name, value) in request.headers.iter() {
            req_builder = req_builder.header(name, value);
        }
        req_builder = req_builder.header("Accept-Language", &self.config.accept_language);

        let response = req_builder
            .send()
            .await
            .map_err(|e| StudioError::network_with_source(request.url.to_string(), e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| StudioError::network_with_source(request.url.to_string(), e))?;

        trace!(
            url = %url,
            status = %status,
            body_len = body.len(),
            "Response received"
        );

        Ok(Response {
            url,
            status,
            headers,
            body,
            from_cache: false,
        })
    }
}

impl Fetcher for NetworkClient {
    fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response>> + Send {
        self.send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_request_builder() {
        let url = Url::parse("https://studio.example/schedule").unwrap();
        let request = Request::get(url.clone()).header(
            http::header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );

        assert_eq!(request.url, url);
        assert_eq!(request.method, Method::GET);
        assert!(request.wants_html());
    }

    #[test]
    fn test_wants_html_false_for_json() {
        let url = Url::parse("https://studio.example/api/training").unwrap();
        let request = Request::get(url).header(
            http::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        assert!(!request.wants_html());
    }

    #[test]
    fn test_wants_html_false_without_accept() {
        let url = Url::parse("https://studio.example/api/training").unwrap();
        assert!(!Request::get(url).wants_html());
    }

    #[test]
    fn test_response_content_type() {
        let url = Url::parse("https://studio.example/").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        let response = Response {
            url,
            status: StatusCode::OK,
            headers,
            body: Bytes::new(),
            from_cache: false,
        };
        assert_eq!(response.content_type(), Some(mime::TEXT_HTML_UTF_8));
    }

    #[tokio::test]
    async fn test_network_client_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/static/css/landing.css"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"body { margin: 0 }".to_vec())
                    .insert_header("content-type", "text/css"),
            )
            .mount(&server)
            .await;

        let client = NetworkClient::new(LoaderConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/static/css/landing.css", server.uri())).unwrap();
        let response = client.fetch(&Request::get(url)).await.unwrap();

        assert!(response.ok());
        assert_eq!(response.body.as_ref(), b"body { margin: 0 }");
        assert!(!response.from_cache);
    }

    #[tokio::test]
    async fn test_network_client_sends_accept_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schedule"))
            .and(header("accept", "text/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let client = NetworkClient::new(LoaderConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/schedule", server.uri())).unwrap();
        let request =
            Request::get(url).header(http::header::ACCEPT, HeaderValue::from_static("text/html"));
        let response = client.fetch(&request).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_network_client_connection_refused_is_network_error() {
        // Unroutable port on localhost.
        let client = NetworkClient::new(LoaderConfig::default()).unwrap();
        let url = Url::parse("http://127.0.0.1:1/").unwrap();
        let err = client.fetch(&Request::get(url)).await.unwrap_err();
        assert_eq!(err.category(), "network");
    }
}
