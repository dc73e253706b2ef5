//! HTTP request building.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;

use crate::error::Result;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }

    /// The method name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body content.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
    Bytes(Bytes),
}

/// A single HTTP request, independent of any transport.
///
/// Header names are matched case-insensitively: setting `authorization`
/// replaces an existing `Authorization`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: RequestMethod,
    url: String,
    headers: BTreeMap<String, String>,
    query_params: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl Request {
    /// Create a new request.
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: BTreeMap::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, url)
    }

    /// Add a header, replacing any header with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_header(name.into(), value.into());
        self
    }

    /// Add every header from `headers`, in order, replacing same-named ones.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.insert_header(name.into(), value.into());
        }
        self
    }

    fn insert_header(&mut self, name: String, value: String) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value);
    }

    /// Add a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((name.into(), value.into()));
        self
    }

    /// Set JSON body.
    pub fn json<T: Serialize>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)?;
        Ok(self.json_value(value))
    }

    /// Set raw JSON body.
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self.insert_header("Content-Type".to_string(), "application/json".to_string());
        self
    }

    /// Set text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self.insert_header("Content-Type".to_string(), "text/plain".to_string());
        self
    }

    /// Set bytes body.
    pub fn bytes(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    /// The request method.
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// The request URL, as given (may be relative).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// All headers set on the request.
    pub fn header_map(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Query parameters, in insertion order.
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}
