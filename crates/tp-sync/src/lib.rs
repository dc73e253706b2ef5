//! # tastypie-sync
//!
//! Sync adapter for django-tastypie APIs.
//!
//! Turns persistence operations (create, read, update, patch, delete) on
//! models and collections into HTTP requests, and smooths over three tastypie
//! conventions:
//!
//! - **Credentials.** Every request carries `Authorization: ApiKey user:key`
//!   and `X-CSRFToken` when configured.
//! - **Empty write responses.** With `always_return_data = False` tastypie
//!   answers a create with `201 Created`, a `Location` header and no body. The
//!   adapter then fetches the resource with a GET, so the caller always sees
//!   the stored representation.
//! - **List envelopes.** `{"meta": {...}, "objects": [...]}` bodies are
//!   unwrapped; collections keep the `meta`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tastypie_sync::client::{ClientConfig, HttpClient};
//! use tastypie_sync::{Operation, SyncAdapter, SyncConfig, SyncOptions};
//!
//! #[tokio::main]
//! async fn main() -> tastypie_sync::Result<()> {
//!     let http = HttpClient::new(
//!         ClientConfig::builder()
//!             .with_base_url("https://example.com")
//!             .build(),
//!     )?;
//!     let adapter = SyncAdapter::new(http, SyncConfig::from_env()?);
//!
//!     let mut entries = adapter.config().collection("/api/v1/entry/");
//!     adapter
//!         .fetch(&mut entries, SyncOptions::new().query("limit", "20"))
//!         .await?;
//!     println!("{} of {:?}", entries.len(), entries.list_meta().and_then(|m| m.total_count));
//!
//!     let mut entry = entries.new_model();
//!     entry.set("title", "Hello");
//!     adapter
//!         .execute(
//!             Operation::Create,
//!             &entry,
//!             SyncOptions::new().on_success(|response| println!("stored: {:?}", response.payload)),
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

mod adapter;
mod config;
mod envelope;
mod error;
mod operation;
mod options;
mod pending;
mod resource;

#[cfg(test)]
mod test_support;

pub use adapter::SyncAdapter;
pub use config::{
    ApiKey, DefaultOptions, FollowUpPolicy, SetUrlConstructor, SyncConfig, SyncConfigBuilder,
    AUTHORIZATION_HEADER, CSRF_HEADER, ENV_API_KEY, ENV_API_USERNAME, ENV_CSRF_TOKEN,
    ENV_FOLLOW_UP_ON_CREATE, ENV_FOLLOW_UP_ON_UPDATE,
};
pub use envelope::{
    parse_many, parse_single, EnvelopeShape, ListMeta, ParsedList, META_FIELD, OBJECTS_FIELD,
};
pub use error::{Error, ErrorKind, Result};
pub use operation::Operation;
pub use options::{ErrorCallback, SuccessCallback, SyncOptions};
pub use pending::{PendingOperation, Phase, SyncResponse, EMPTY_BODY_STATUSES};
pub use resource::{Collection, Model, Resource};

/// The transport layer, re-exported.
pub use tastypie_client as client;
