//! # tastypie-api
//!
//! Client and sync adapter for django-tastypie REST APIs.
//!
//! ## Security
//!
//! - API keys and CSRF tokens are redacted in Debug output
//! - Tracing spans skip request options and resources
//! - Server error bodies are passed through untouched, never rewritten
//!
//! ## Crates
//!
//! - **tastypie-client** - HTTP transport: request building, buffered responses,
//!   status-to-error mapping, URL resolution
//! - **tastypie-sync** - Sync adapter: credential headers, follow-up fetch after
//!   empty create/update responses, envelope parsing, models and collections
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tastypie_api::client::{ClientConfig, HttpClient};
//! use tastypie_api::sync::{SyncAdapter, SyncConfig, SyncOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = HttpClient::new(
//!         ClientConfig::builder()
//!             .with_base_url("https://blog.example.com")
//!             .build(),
//!     )?;
//!     let adapter = SyncAdapter::new(
//!         http,
//!         SyncConfig::builder().with_api_key("daniel", "204db7bc").build(),
//!     );
//!
//!     let mut entry = adapter.config().model("/api/v1/entry/");
//!     entry.set("title", "First post");
//!     adapter.save(&mut entry, SyncOptions::new()).await?;
//!
//!     println!("saved as {:?}", entry.id());
//!     Ok(())
//! }
//! ```

#[cfg(feature = "client")]
pub use tastypie_client as client;
#[cfg(feature = "sync")]
pub use tastypie_sync as sync;
