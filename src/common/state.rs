use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::vendor::{build_token_cache, TokenCache};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    /// Shared client for all vendor portals; adapters are cheap per-call
    /// wrappers around it.
    pub http: reqwest::Client,
    pub token_cache: TokenCache,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.vendor_http_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        let token_cache = build_token_cache(
            config.token_cache_max_entries,
            config.token_cache_ttl_seconds,
        );

        Self {
            db,
            config: Arc::new(config),
            http,
            token_cache,
        }
    }
}
