//! Fastly backend configuration.

use std::time::Duration;

use serde::Deserialize;
use tagpurge_core::{ApiKey, PurgeMethod, ServiceId};
use url::Url;

use crate::error::FastlyError;

/// Public Fastly API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.fastly.com";

/// Configuration for the Fastly backend.
///
/// Credentials are optional so a half-configured install can still start
/// and report itself as "not configured" on the status hook.
#[derive(Debug, Clone, Deserialize)]
pub struct FastlyConfig {
    /// Base URL of the Fastly API.
    #[serde(default = "default_api_url")]
    api_url: String,

    /// API token sent as `Fastly-Key`.
    #[serde(default)]
    api_key: Option<ApiKey>,

    /// Service whose cache is purged.
    #[serde(default)]
    service_id: Option<ServiceId>,

    /// Instant or soft purging.
    #[serde(default)]
    purge_method: PurgeMethod,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,

    /// How long a validation result is trusted, in seconds. 0 trusts it
    /// until the next explicit validation.
    #[serde(default)]
    validation_ttl_seconds: u64,

    /// Background revalidation interval, in seconds. 0 disables it.
    #[serde(default)]
    revalidate_interval_seconds: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl FastlyConfig {
    /// Creates a new builder for FastlyConfig.
    pub fn builder() -> FastlyConfigBuilder {
        FastlyConfigBuilder::default()
    }

    /// Returns the API base URL without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Returns the API key, if one is set and non-empty.
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref().filter(|k| !k.is_empty())
    }

    /// Returns the service id, if one is set and non-empty.
    pub fn service_id(&self) -> Option<&ServiceId> {
        self.service_id.as_ref().filter(|s| !s.is_empty())
    }

    pub fn purge_method(&self) -> PurgeMethod {
        self.purge_method
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Returns how long a validation result is trusted.
    pub fn validation_ttl(&self) -> Option<Duration> {
        (self.validation_ttl_seconds > 0).then(|| Duration::from_secs(self.validation_ttl_seconds))
    }

    /// Returns the background revalidation interval.
    pub fn revalidate_interval(&self) -> Option<Duration> {
        (self.revalidate_interval_seconds > 0)
            .then(|| Duration::from_secs(self.revalidate_interval_seconds))
    }

    /// Returns true if both credentials are present.
    pub fn is_configured(&self) -> bool {
        self.api_key().is_some() && self.service_id().is_some()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), FastlyError> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| FastlyError::InvalidConfig(format!("api_url: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(FastlyError::InvalidConfig(format!(
                "api_url: unsupported scheme '{}'",
                url.scheme()
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(FastlyError::InvalidConfig(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for FastlyConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            service_id: None,
            purge_method: PurgeMethod::default(),
            timeout_seconds: default_timeout_seconds(),
            validation_ttl_seconds: 0,
            revalidate_interval_seconds: 0,
        }
    }
}

/// Builder for FastlyConfig.
#[derive(Debug, Default)]
pub struct FastlyConfigBuilder {
    api_url: Option<String>,
    api_key: Option<ApiKey>,
    service_id: Option<ServiceId>,
    purge_method: PurgeMethod,
    timeout: Option<Duration>,
    validation_ttl: Option<Duration>,
    revalidate_interval: Option<Duration>,
}

impl FastlyConfigBuilder {
    /// Sets the API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<ApiKey>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the service id.
    pub fn service_id(mut self, id: impl Into<ServiceId>) -> Self {
        self.service_id = Some(id.into());
        self
    }

    /// Sets the purge method.
    pub fn purge_method(mut self, method: PurgeMethod) -> Self {
        self.purge_method = method;
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how long a validation result is trusted.
    pub fn validation_ttl(mut self, ttl: Duration) -> Self {
        self.validation_ttl = Some(ttl);
        self
    }

    /// Enables background revalidation.
    pub fn revalidate_interval(mut self, interval: Duration) -> Self {
        self.revalidate_interval = Some(interval);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<FastlyConfig, FastlyError> {
        let config = FastlyConfig {
            api_url: self.api_url.unwrap_or_else(default_api_url),
            api_key: self.api_key,
            service_id: self.service_id,
            purge_method: self.purge_method,
            timeout_seconds: self
                .timeout
                .map(|t| t.as_secs())
                .unwrap_or_else(default_timeout_seconds),
            validation_ttl_seconds: self.validation_ttl.map(|t| t.as_secs()).unwrap_or(0),
            revalidate_interval_seconds: self
                .revalidate_interval
                .map(|t| t.as_secs())
                .unwrap_or(0),
        };

        config.validate()?;
        Ok(config)
    }
}
