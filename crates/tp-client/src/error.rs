//! Error types for tastypie-client.

/// Result type alias for tastypie-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tastypie-client operations.
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

    /// Build the error for a non-success HTTP response.
    ///
    /// The response text is kept verbatim so callers see exactly what the
    /// server sent.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let kind = match status {
            400 => ErrorKind::BadRequest(body),
            401 => ErrorKind::Authentication(body),
            403 => ErrorKind::Authorization(body),
            404 => ErrorKind::NotFound(body),
            _ => ErrorKind::Http {
                status,
                message: body,
            },
        };
        Self::new(kind)
    }

    /// HTTP status of the failed response, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        self.kind.status()
    }

    /// Raw response text of the failed response, if any.
    pub fn response_text(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Http { message, .. } => Some(message),
            ErrorKind::BadRequest(body)
            | ErrorKind::Authentication(body)
            | ErrorKind::Authorization(body)
            | ErrorKind::NotFound(body) => Some(body),
            _ => None,
        }
    }

    /// The `error_message` field of a tastypie error body, if present.
    ///
    /// Tastypie reports unhandled errors as
    /// `{"error_message": "...", "traceback": "..."}`.
    pub fn error_message(&self) -> Option<String> {
        let body = self.response_text()?;
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value
            .get("error_message")
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication(_))
    }

    /// Returns true if the request never produced an HTTP response.
    pub fn is_network_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout | ErrorKind::Connection(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// HTTP request failed with a status not covered by a dedicated kind.
    #[error("HTTP error: {status} {message}")]
    Http { status: u16, message: String },

    /// Bad request (HTTP 400), usually a validation failure.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication error (HTTP 401).
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Authorization error (HTTP 403), including CSRF rejections.
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Resource not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request timeout.
    #[error("Request timeout")]
    Timeout,

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ErrorKind {
    /// HTTP status carried by this kind, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ErrorKind::Http { status, .. } => Some(*status),
            ErrorKind::BadRequest(_) => Some(400),
            ErrorKind::Authentication(_) => Some(401),
            ErrorKind::Authorization(_) => Some(403),
            ErrorKind::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout
        } else if err.is_connect() {
            ErrorKind::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ErrorKind::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ErrorKind::Other(err.to_string())
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}
