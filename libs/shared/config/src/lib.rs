use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_bearer_token: Option<String>,
    pub request_timeout_secs: u64,
    pub queue_poll_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("API_BASE_URL not set, using empty value");
                    String::new()
                }),
            api_bearer_token: env::var("API_BEARER_TOKEN").ok(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("REQUEST_TIMEOUT_SECS not set, using default of 3");
                    3
                }),
            queue_poll_interval_secs: env::var("QUEUE_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("QUEUE_POLL_INTERVAL_SECS not set, using default of 10");
                    10
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.api_base_url.is_empty()
    }

    /// Config pointed at an arbitrary base URL, keeping the default timings.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            api_bearer_token: None,
            request_timeout_secs: 3,
            queue_poll_interval_secs: 10,
        }
    }
}
