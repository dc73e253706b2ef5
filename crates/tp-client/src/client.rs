//! reqwest-backed HTTP client.

use std::collections::HashMap;

use tracing::{debug, info, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{Request, RequestBody, RequestMethod};
use crate::response::Response;
use crate::transport::{Transport, TransportFuture};

/// HTTP client for tastypie APIs.
///
/// Cloning is cheap: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
    base_url: Option<Url>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()?;

        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed)
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner,
            config,
            base_url,
        })
    }

    /// Create a new HTTP client with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve `url` against the configured base URL.
    ///
    /// Absolute URLs are returned unchanged; relative ones need a base URL.
    pub fn resolve_url(&self, url: &str) -> Result<Url> {
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(url).map_err(Into::into),
                None => Err(Error::new(ErrorKind::InvalidUrl(format!(
                    "relative URL '{}' needs a configured base URL",
                    url
                )))),
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> Request {
        Request::new(RequestMethod::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> Request {
        Request::new(RequestMethod::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> Request {
        Request::new(RequestMethod::Put, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> Request {
        Request::new(RequestMethod::Patch, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> Request {
        Request::new(RequestMethod::Delete, url)
    }

    /// Execute a single request.
    ///
    /// There is no retry: a failure is returned as-is. Non-success statuses
    /// become errors carrying the response text.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let mut url = self.resolve_url(request.url())?;
        if !request.query_params().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query_params());
        }

        let mut req = self.inner.request(request.method().to_reqwest(), url.clone());

        for (name, value) in request.header_map() {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body() {
            req = match body {
                RequestBody::Json(value) => req.json(value),
                RequestBody::Text(text) => req.body(text.clone()),
                RequestBody::Bytes(bytes) => req.body(bytes.clone()),
            };
        }

        if self.config.enable_tracing {
            debug!(method = %request.method(), url = %url, "Sending request");
        }

        let response = req.send().await?;
        let status = response.status().as_u16();

        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        if self.config.enable_tracing {
            if (200..300).contains(&status) {
                debug!(status, content_length = body.len(), "Response received");
            } else {
                info!(status, content_length = body.len(), "Non-success response");
            }
        }

        Response::new(status, headers, body).error_for_status()
    }
}

impl Transport for HttpClient {
    fn send(&self, request: Request) -> TransportFuture {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}
