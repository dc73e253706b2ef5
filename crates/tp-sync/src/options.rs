//! Per-call options.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::Error;
use crate::pending::SyncResponse;

/// Called with the resolved response when an operation succeeds.
pub type SuccessCallback = Box<dyn FnOnce(&SyncResponse) + Send>;

/// Called with the error when an operation fails.
pub type ErrorCallback = Box<dyn FnOnce(&Error) + Send>;

/// Options for a single operation.
///
/// Everything is optional: by default the resource's own URL and payload are
/// used and only the configured headers are sent.
#[derive(Default)]
pub struct SyncOptions {
    pub(crate) url: Option<String>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) payload: Option<Value>,
    pub(crate) context: Option<Value>,
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
}

impl std::fmt::Debug for SyncOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOptions")
            .field("url", &self.url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("query", &self.query)
            .field("payload", &self.payload.is_some())
            .field("context", &self.context)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl SyncOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the request to `url` instead of the resource's URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Add a header. Caller headers win over configured ones.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a query parameter, e.g. tastypie's `limit` or `offset`.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Send `payload` instead of the resource's serialized state.
    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attach a caller value that is handed back on [`SyncResponse::context`].
    pub fn context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Callback fired once when the operation succeeds.
    pub fn on_success(mut self, callback: impl FnOnce(&SyncResponse) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Callback fired once when the operation fails.
    pub fn on_error(mut self, callback: impl FnOnce(&Error) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}
