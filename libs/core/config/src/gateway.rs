use crate::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the architectures REST API
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    /// API base URL, without the `/architectures` suffix
    pub api_url: String,
    /// Bearer credential; requests are sent anonymously when unset
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(api_url: String, api_token: Option<String>) -> Self {
        Self {
            api_url,
            api_token,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FromEnv for GatewayConfig {
    /// Reads from environment variables:
    /// - ARCHITECTURE_API_URL: defaults to http://localhost:8000/api/v1
    /// - ARCHITECTURE_API_TOKEN: optional
    /// - ARCHITECTURE_API_TIMEOUT_SECS: defaults to 30
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = env_or_default("ARCHITECTURE_API_URL", DEFAULT_API_URL);
        let api_token = env_optional("ARCHITECTURE_API_TOKEN");
        let timeout_secs = env_parse("ARCHITECTURE_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::ParseError {
                key: "ARCHITECTURE_API_TIMEOUT_SECS".to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            api_url,
            api_token,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL.to_string(), None)
    }
}
