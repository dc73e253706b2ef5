//! The sync adapter: turns persistence operations into tastypie requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tastypie_client::{Request, Transport};
use tokio::task::JoinHandle;
use tracing::{debug, debug_span, instrument};

use crate::config::SyncConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::operation::Operation;
use crate::options::SyncOptions;
use crate::pending::{FollowUpPlan, PendingOperation, Start, SyncResponse};
use crate::resource::Resource;

/// Runs persistence operations against a tastypie API.
///
/// Every request carries the configured credentials. Creates (and, if
/// enabled, updates) answered with an empty 201/202/204 are completed with a
/// GET of the `Location` header, or of the resource's own URL, so callers
/// always see the stored resource.
///
/// # Example
///
/// ```rust,ignore
/// use tastypie_client::{ClientConfig, HttpClient};
/// use tastypie_sync::{SyncAdapter, SyncConfig, SyncOptions};
///
/// let http = HttpClient::new(ClientConfig::builder().with_base_url("https://example.com").build())?;
/// let config = SyncConfig::builder().with_api_key("daniel", "204db7bc").build();
/// let adapter = SyncAdapter::new(http, config);
///
/// let mut entry = adapter.config().model("/api/v1/entry/");
/// entry.set("title", "Hello");
/// adapter.save(&mut entry, SyncOptions::new()).await?;
/// assert!(entry.id().is_some());
/// ```
pub struct SyncAdapter<T: Transport> {
    transport: Arc<T>,
    config: Arc<SyncConfig>,
}

impl<T: Transport> Clone for SyncAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: Arc::clone(&self.config),
        }
    }
}

impl<T: Transport> std::fmt::Debug for SyncAdapter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> SyncAdapter<T> {
    /// Create an adapter over `transport`.
    pub fn new(transport: T, config: SyncConfig) -> Self {
        Self::from_shared(Arc::new(transport), Arc::new(config))
    }

    /// Create an adapter sharing an existing transport and configuration.
    pub fn from_shared(transport: Arc<T>, config: Arc<SyncConfig>) -> Self {
        Self { transport, config }
    }

    /// The adapter configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Headers for a request: credentials, then configured defaults, then
    /// the caller's. Later names replace earlier ones case-insensitively.
    pub fn request_headers(&self, caller: &BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        let layers = [
            self.config.credential_headers(),
            self.config.default_options().headers.clone(),
            caller.clone(),
        ];
        for (name, value) in layers.into_iter().flatten() {
            headers.retain(|existing: &String, _| !existing.eq_ignore_ascii_case(&name));
            headers.insert(name, value);
        }
        headers
    }

    /// Query parameters for a request: configured defaults not named by the
    /// caller, then the caller's.
    fn request_query(&self, caller: &[(String, String)]) -> Vec<(String, String)> {
        self.config
            .default_options()
            .query
            .iter()
            .filter(|(name, _)| !caller.iter().any(|(n, _)| n == name))
            .chain(caller)
            .cloned()
            .collect()
    }

    /// Start `operation` on `resource`.
    ///
    /// The primary request is handed to the transport immediately; the
    /// returned [`PendingOperation`] drives it, and the follow-up fetch when
    /// one is needed, to a single result.
    pub fn execute<R: Resource + ?Sized>(
        &self,
        operation: Operation,
        resource: &R,
        options: SyncOptions,
    ) -> PendingOperation {
        let SyncOptions {
            url,
            headers,
            query,
            payload,
            context,
            on_success,
            on_error,
        } = options;

        let headers = self.request_headers(&headers);
        let resource_url = resource.url();
        let span = debug_span!("sync", operation = %operation);

        let start = Start {
            operation,
            transport: Arc::clone(&self.transport) as Arc<dyn Transport>,
            follow_up: FollowUpPlan {
                eligible: self.config.follow_up().applies_to(operation),
                fallback_url: resource_url.clone(),
                headers: headers.clone(),
                query: self.config.default_options().query.clone(),
            },
            context,
            on_success,
            on_error,
            span: span.clone(),
        };

        let Some(url) = url.or(resource_url) else {
            return PendingOperation::failed(start, Error::new(ErrorKind::MissingUrl(operation)));
        };

        // Body first: the merged headers may override its Content-Type.
        let mut request = Request::new(operation.method(), url);
        if operation.sends_body() {
            if let Some(body) = payload.or_else(|| resource.payload()) {
                request = request.json_value(body);
            }
        }
        let mut request = request.headers(headers);
        for (name, value) in self.request_query(&query) {
            request = request.query(name, value);
        }

        span.in_scope(|| {
            debug!(method = %request.method(), url = %request.url(), "Sending primary request");
        });

        PendingOperation::send(start, request)
    }

    /// Run `operation` on the tokio runtime.
    ///
    /// The operation runs to completion and fires its callbacks even if the
    /// returned handle is dropped.
    pub fn spawn<R: Resource + ?Sized>(
        &self,
        operation: Operation,
        resource: &R,
        options: SyncOptions,
    ) -> JoinHandle<Result<SyncResponse>> {
        tokio::spawn(self.execute(operation, resource, options))
    }

    /// Read `resource` and apply the response to it.
    #[instrument(skip(self, resource, options))]
    pub async fn fetch<R: Resource + ?Sized>(
        &self,
        resource: &mut R,
        options: SyncOptions,
    ) -> Result<SyncResponse> {
        self.run_and_apply(Operation::Read, resource, options).await
    }

    /// Create `resource` if it is new, update it otherwise, and apply the
    /// stored state to it.
    #[instrument(skip(self, resource, options))]
    pub async fn save<R: Resource + ?Sized>(
        &self,
        resource: &mut R,
        options: SyncOptions,
    ) -> Result<SyncResponse> {
        let operation = if resource.is_new() {
            Operation::Create
        } else {
            Operation::Update
        };
        self.run_and_apply(operation, resource, options).await
    }

    /// Send only `attributes` as a PATCH and apply the response.
    #[instrument(skip(self, resource, attributes, options))]
    pub async fn patch<R: Resource + ?Sized>(
        &self,
        resource: &mut R,
        attributes: Value,
        options: SyncOptions,
    ) -> Result<SyncResponse> {
        self.run_and_apply(Operation::Patch, resource, options.payload(attributes))
            .await
    }

    /// Delete `resource`.
    #[instrument(skip(self, resource, options))]
    pub async fn destroy<R: Resource + ?Sized>(
        &self,
        resource: &R,
        options: SyncOptions,
    ) -> Result<SyncResponse> {
        self.execute(Operation::Delete, resource, options).await
    }

    /// Callbacks fire after the payload is applied, so a failing
    /// [`Resource::apply`] reaches `on_error` instead of `on_success`.
    async fn run_and_apply<R: Resource + ?Sized>(
        &self,
        operation: Operation,
        resource: &mut R,
        mut options: SyncOptions,
    ) -> Result<SyncResponse> {
        let on_success = options.on_success.take();
        let on_error = options.on_error.take();

        let outcome = self
            .execute(operation, &*resource, options)
            .await
            .and_then(|response| {
                if let Some(payload) = &response.payload {
                    resource.apply(payload)?;
                }
                Ok(response)
            });

        match &outcome {
            Ok(response) => {
                if let Some(callback) = on_success {
                    callback(response);
                }
            }
            Err(error) => {
                if let Some(callback) = on_error {
                    callback(error);
                }
            }
        }
        outcome
    }
}
