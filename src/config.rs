use std::env;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Sync trigger auth
    pub sync_trigger_secret: String,

    // Vendor HTTP clients
    pub vendor_http_timeout_seconds: u64,
    pub token_expiry_margin_seconds: i64,
    pub token_cache_max_entries: u64,
    pub token_cache_ttl_seconds: u64,

    // Sync scheduling
    pub sync_utc_offset_minutes: i32,
    pub sync_restricted_window: String,
    pub plant_sync_tick_seconds: u64,
    pub alert_sync_interval_seconds: u64,
    pub alert_sync_start_date: Option<String>,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_api_per_second: u64,
    pub rate_limit_api_burst: u32,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            // Database
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,

            // Sync trigger auth
            sync_trigger_secret: env::var("SYNC_TRIGGER_SECRET")
                .map_err(|_| ConfigError::Missing("SYNC_TRIGGER_SECRET"))?,

            // Vendor HTTP clients
            vendor_http_timeout_seconds: env::var("VENDOR_HTTP_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            token_expiry_margin_seconds: env::var("TOKEN_EXPIRY_MARGIN_SECONDS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            token_cache_max_entries: env::var("TOKEN_CACHE_MAX_ENTRIES")
                .unwrap_or_else(|_| "1024".to_string())
                .parse()
                .unwrap_or(1024),
            token_cache_ttl_seconds: env::var("TOKEN_CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "43200".to_string())
                .parse()
                .unwrap_or(43200), // 12 hours default

            // Sync scheduling
            sync_utc_offset_minutes: env::var("SYNC_UTC_OFFSET_MINUTES")
                .unwrap_or_else(|_| "330".to_string())
                .parse()
                .unwrap_or(330), // IST default
            sync_restricted_window: env::var("SYNC_RESTRICTED_WINDOW")
                .unwrap_or_else(|_| "19:00-06:00".to_string()),
            plant_sync_tick_seconds: env::var("PLANT_SYNC_TICK_SECONDS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            alert_sync_interval_seconds: env::var("ALERT_SYNC_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .unwrap_or(900),
            alert_sync_start_date: env::var("ALERT_SYNC_START_DATE").ok(),

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),

            // Rate limiting
            disable_rate_limiting: env::var("DISABLE_RATE_LIMITING")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            rate_limit_api_per_second: env::var("RATE_LIMIT_API_PER_SECOND")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            rate_limit_api_burst: env::var("RATE_LIMIT_API_BURST")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
