//! # tastypie-client
//!
//! HTTP transport for django-tastypie style REST APIs.
//!
//! This crate provides the transport layer the sync adapter sits on:
//! - Request building with per-request headers, query parameters and JSON bodies
//! - Fully buffered responses (status, headers, body) that can be inspected
//!   more than once
//! - Mapping of non-success statuses to typed errors, with the raw response
//!   text preserved
//! - Resolution of relative paths and `Location` values against a base URL
//! - Request/response tracing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    tastypie-sync                            │
//! │  (SyncAdapter, envelope parsing, Model/Collection)          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │  Transport::send
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HttpClient                               │
//! │  - reqwest connection pool, compression, timeouts           │
//! │  - URL resolution against the configured base URL           │
//! │  - Status → error mapping                                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use tastypie_client::{ClientConfig, HttpClient, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tastypie_client::Error> {
//!     let client = HttpClient::new(
//!         ClientConfig::builder()
//!             .with_base_url("https://example.com")
//!             .build(),
//!     )?;
//!
//!     let response = client
//!         .send(client.get("/api/v1/entry/").query("limit", "20"))
//!         .await?;
//!
//!     let entries: Option<serde_json::Value> = response.json_opt()?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
mod transport;

pub use client::HttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::{Request, RequestBody, RequestMethod};
pub use response::Response;
pub use transport::{Transport, TransportFuture};

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("tastypie-api/", env!("CARGO_PKG_VERSION"));
