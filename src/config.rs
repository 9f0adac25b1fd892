//! Client configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the controller base URL.
pub const ENV_URL: &str = "CLASH_API_URL";
/// Environment variable holding the controller secret.
pub const ENV_SECRET: &str = "CLASH_API_SECRET";
/// Optional request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "CLASH_API_TIMEOUT_MS";

/// Connection settings for a controller.
///
/// Neither the URL nor the token is checked here; a bad URL is reported
/// by the first request made with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    /// Applied by the HTTP transport. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build a config from `CLASH_API_URL`, `CLASH_API_SECRET` and the
    /// optional `CLASH_API_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(ENV_URL)
            .ok_or_else(|| Error::Config(format!("{ENV_URL} is not set")))?;
        let token = lookup(ENV_SECRET)
            .ok_or_else(|| Error::Config(format!("{ENV_SECRET} is not set")))?;

        let mut config = Self::new(base_url, token);
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!("{ENV_TIMEOUT_MS} must be an integer, got '{raw}'"))
            })?;
            config.timeout = Some(Duration::from_millis(millis));
        }

        Ok(config)
    }
}
