use tastypie_api::client::{ClientConfig, HttpClient};
use tastypie_api::sync::{SyncAdapter, SyncConfig, SyncConfigBuilder};
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

pub const API_USERNAME: &str = "daniel";
pub const API_KEY: &str = "204db7bc";
pub const CSRF_TOKEN: &str = "csrf123";
pub const AUTHORIZATION: &str = "ApiKey daniel:204db7bc";

/// Install a test subscriber once; output is controlled by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config with API key and CSRF token set.
pub fn credentials() -> SyncConfigBuilder {
    SyncConfig::builder()
        .with_api_key(API_USERNAME, API_KEY)
        .with_csrf_token(CSRF_TOKEN)
}

/// An adapter whose client resolves paths against the mock server.
pub fn adapter(server: &MockServer, config: SyncConfig) -> SyncAdapter<HttpClient> {
    init_tracing();
    let http = HttpClient::new(ClientConfig::builder().with_base_url(server.uri()).build())
        .expect("Failed to create HTTP client");
    SyncAdapter::new(http, config)
}
