//! Adapter configuration: credentials, follow-up policy, request defaults.
//!
//! Secrets (API key, CSRF token) are redacted in Debug output.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, ErrorKind, Result};
use crate::operation::Operation;
use crate::resource::{Collection, Model};

/// Environment variable holding the API key username.
pub const ENV_API_USERNAME: &str = "TASTYPIE_API_USERNAME";
/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "TASTYPIE_API_KEY";
/// Environment variable holding the CSRF token.
pub const ENV_CSRF_TOKEN: &str = "TASTYPIE_CSRF_TOKEN";
/// Environment variable toggling the follow-up fetch after create.
pub const ENV_FOLLOW_UP_ON_CREATE: &str = "TASTYPIE_FOLLOW_UP_ON_CREATE";
/// Environment variable toggling the follow-up fetch after update.
pub const ENV_FOLLOW_UP_ON_UPDATE: &str = "TASTYPIE_FOLLOW_UP_ON_UPDATE";

/// Header carrying the API key.
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Header carrying the CSRF token.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Builds the URL segment addressing several resources at once.
pub type SetUrlConstructor = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Tastypie API key credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey {
    username: String,
    key: String,
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("username", &self.username)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl ApiKey {
    /// Create an API key.
    pub fn new(username: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            key: key.into(),
        }
    }

    /// The username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The secret key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// An API key without a username is not sent.
    pub fn is_set(&self) -> bool {
        !self.username.is_empty()
    }

    /// Value of the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("ApiKey {}:{}", self.username, self.key)
    }
}

/// Which operations get a follow-up GET when the server answers with an
/// empty body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUpPolicy {
    /// Follow up after create.
    pub on_create: bool,
    /// Follow up after update.
    pub on_update: bool,
}

impl Default for FollowUpPolicy {
    fn default() -> Self {
        Self {
            on_create: true,
            on_update: false,
        }
    }
}

impl FollowUpPolicy {
    /// Returns true if `operation` may be completed with a follow-up fetch.
    pub fn applies_to(&self, operation: Operation) -> bool {
        match operation {
            Operation::Create => self.on_create,
            Operation::Update => self.on_update,
            Operation::Read | Operation::Patch | Operation::Delete => false,
        }
    }
}

/// Request options applied to every operation unless the caller overrides them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultOptions {
    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,
    /// Query parameters sent with every request.
    pub query: Vec<(String, String)>,
}

/// Configuration shared by every operation of a [`SyncAdapter`](crate::SyncAdapter).
///
/// Built once and read-only afterwards.
#[derive(Clone)]
pub struct SyncConfig {
    api_key: Option<ApiKey>,
    csrf_token: Option<String>,
    follow_up: FollowUpPolicy,
    default_options: DefaultOptions,
    id_attribute: String,
    set_url: SetUrlConstructor,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("api_key", &self.api_key)
            .field("csrf_token", &self.csrf_token.as_ref().map(|_| "[REDACTED]"))
            .field("follow_up", &self.follow_up)
            .field("default_options", &self.default_options)
            .field("id_attribute", &self.id_attribute)
            .finish_non_exhaustive()
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            csrf_token: None,
            follow_up: FollowUpPolicy::default(),
            default_options: DefaultOptions::default(),
            id_attribute: "id".to_string(),
            set_url: Arc::new(default_set_url),
        }
    }
}

/// `set/1;2;3/`, the tastypie multi-get path.
pub(crate) fn default_set_url(ids: &[String]) -> String {
    format!("set/{}/", ids.join(";"))
}

impl SyncConfig {
    /// Create a new config builder.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Load credentials and follow-up toggles from the environment.
    ///
    /// Reads `TASTYPIE_API_USERNAME`, `TASTYPIE_API_KEY`, `TASTYPIE_CSRF_TOKEN`,
    /// `TASTYPIE_FOLLOW_UP_ON_CREATE` and `TASTYPIE_FOLLOW_UP_ON_UPDATE`. All are
    /// optional, except that a username requires a key.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(username) = lookup(ENV_API_USERNAME).filter(|v| !v.is_empty()) {
            let key = lookup(ENV_API_KEY)
                .ok_or_else(|| Error::new(ErrorKind::EnvVar(ENV_API_KEY.to_string())))?;
            builder = builder.with_api_key(username, key);
        }

        if let Some(token) = lookup(ENV_CSRF_TOKEN) {
            builder = builder.with_csrf_token(token);
        }

        if let Some(flag) = lookup(ENV_FOLLOW_UP_ON_CREATE) {
            builder = builder.with_follow_up_on_create(parse_flag(ENV_FOLLOW_UP_ON_CREATE, &flag)?);
        }

        if let Some(flag) = lookup(ENV_FOLLOW_UP_ON_UPDATE) {
            builder = builder.with_follow_up_on_update(parse_flag(ENV_FOLLOW_UP_ON_UPDATE, &flag)?);
        }

        Ok(builder.build())
    }

    /// The API key, if configured.
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    /// The CSRF token, if configured.
    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    /// The follow-up policy.
    pub fn follow_up(&self) -> FollowUpPolicy {
        self.follow_up
    }

    /// Default request options.
    pub fn default_options(&self) -> &DefaultOptions {
        &self.default_options
    }

    /// Name of the attribute holding a resource's identifier.
    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// Path segment addressing the resources with the given ids.
    pub fn set_url(&self, ids: &[String]) -> String {
        (self.set_url)(ids)
    }

    /// The set-URL constructor, shareable with collections.
    pub fn set_url_constructor(&self) -> SetUrlConstructor {
        Arc::clone(&self.set_url)
    }

    /// Headers derived from the credentials.
    ///
    /// The API key is omitted when its username is empty, the CSRF token when
    /// it is empty.
    pub fn credential_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();

        if let Some(api_key) = self.api_key.as_ref().filter(|k| k.is_set()) {
            headers.insert(AUTHORIZATION_HEADER.to_string(), api_key.header_value());
        }

        if let Some(token) = self.csrf_token.as_ref().filter(|t| !t.is_empty()) {
            headers.insert(CSRF_HEADER.to_string(), token.clone());
        }

        headers
    }

    /// A new model rooted at `url_root`, using the configured id attribute.
    pub fn model(&self, url_root: impl Into<String>) -> Model {
        Model::new(url_root).with_id_attribute(self.id_attribute.clone())
    }

    /// A new collection at `url`, using the configured id attribute and
    /// set-URL constructor.
    pub fn collection(&self, url: impl Into<String>) -> Collection {
        Collection::new(url)
            .with_id_attribute(self.id_attribute.clone())
            .with_set_url_constructor(self.set_url_constructor())
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::new(ErrorKind::Config(format!(
            "{} must be a boolean, got '{}'",
            name, other
        )))),
    }
}

/// Builder for SyncConfig.
#[derive(Debug, Default)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    /// Set the API key credentials.
    pub fn with_api_key(mut self, username: impl Into<String>, key: impl Into<String>) -> Self {
        self.config.api_key = Some(ApiKey::new(username, key));
        self
    }

    /// Set the CSRF token.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.config.csrf_token = Some(token.into());
        self
    }

    /// Enable or disable the follow-up fetch after an empty create response.
    pub fn with_follow_up_on_create(mut self, enabled: bool) -> Self {
        self.config.follow_up.on_create = enabled;
        self
    }

    /// Enable or disable the follow-up fetch after an empty update response.
    pub fn with_follow_up_on_update(mut self, enabled: bool) -> Self {
        self.config.follow_up.on_update = enabled;
        self
    }

    /// Add a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .default_options
            .headers
            .insert(name.into(), value.into());
        self
    }

    /// Add a query parameter sent with every request.
    pub fn with_default_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .default_options
            .query
            .push((name.into(), value.into()));
        self
    }

    /// Set the identifier attribute name (default `id`).
    pub fn with_id_attribute(mut self, name: impl Into<String>) -> Self {
        self.config.id_attribute = name.into();
        self
    }

    /// Replace the set-URL constructor.
    pub fn with_set_url_constructor(
        mut self,
        constructor: impl Fn(&[String]) -> String + Send + Sync + 'static,
    ) -> Self {
        self.config.set_url = Arc::new(constructor);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SyncConfig {
        self.config
    }
}
