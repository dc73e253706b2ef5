//! Error types for tastypie-sync.

use crate::operation::Operation;

/// Result type alias for tastypie-sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tastypie-sync operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// The transport error this error wraps, untouched.
    pub fn transport_error(&self) -> Option<&tastypie_client::Error> {
        self.source
            .as_ref()?
            .downcast_ref::<tastypie_client::Error>()
    }

    /// HTTP status of the failed response, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        self.transport_error()?.status()
    }

    /// Raw response text of the failed response, if any.
    pub fn response_text(&self) -> Option<&str> {
        self.transport_error()?.response_text()
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The transport failed on the primary request or the follow-up fetch.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Neither the options nor the resource supplied a URL.
    #[error("No URL for {0} request")]
    MissingUrl(Operation),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Environment variable not set.
    #[error("Environment variable not set: {0}")]
    EnvVar(String),
}

impl From<tastypie_client::Error> for Error {
    fn from(err: tastypie_client::Error) -> Self {
        Error::with_source(ErrorKind::Transport(err.to_string()), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}
