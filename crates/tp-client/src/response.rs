//! Buffered HTTP responses.

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};

/// A fully buffered HTTP response.
///
/// The body is read eagerly so the response can be inspected (for emptiness,
/// headers, status) before deciding what to do with it.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Bytes,
}

impl Response {
    /// Create a response from its parts.
    pub fn new(status: u16, headers: HashMap<String, String>, body: impl Into<Bytes>) -> Self {
        // Normalize header names to lowercase for case-insensitive lookups
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Shorthand for a response with no headers.
    pub fn with_status(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, HashMap::new(), body)
    }

    /// Add a header, returning the updated response.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// All headers, keyed by lowercase name.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Get the Location header value.
    pub fn location(&self) -> Option<&str> {
        self.header("location").filter(|v| !v.is_empty())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// The raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns true if the body is absent or only whitespace.
    pub fn is_empty_body(&self) -> bool {
        self.body.iter().all(|b| b.is_ascii_whitespace())
    }

    /// The body decoded as UTF-8 text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| {
            Error::with_source(
                ErrorKind::Other("Failed to decode response as UTF-8".to_string()),
                e,
            )
        })
    }

    /// Deserialize the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }

    /// Deserialize the body as JSON, or `None` when the body is empty.
    pub fn json_opt(&self) -> Result<Option<serde_json::Value>> {
        if self.is_empty_body() {
            return Ok(None);
        }
        self.json().map(Some)
    }

    /// Convert a non-success response into an error, keeping the body text.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let body = String::from_utf8_lossy(&self.body).into_owned();
        Err(Error::from_status(self.status, body))
    }
}
