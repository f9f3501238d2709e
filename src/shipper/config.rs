use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Construction-time configuration for a [`LogShipper`](super::LogShipper).
///
/// There is no runtime reconfiguration; environment binding, if any, is the
/// host application's responsibility.
#[derive(Debug, Clone)]
pub struct ShipperConfig {
    /// Base URL of the AppVital ingestion API.
    pub api_url: String,
    /// Service label attached to every entry from this instance.
    pub service_name: String,
    /// Entry count that triggers an immediate flush from within `log()`.
    pub batch_size: usize,
    /// Period of the recurring timer-driven flush.
    pub flush_interval: Duration,
    /// Per-request timeout for ingestion POSTs.
    pub request_timeout: Duration,
    /// Maximum idle HTTP connections kept per host.
    pub max_connections: usize,
    pub user_agent: String,
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            service_name: "unknown_service".to_string(),
            batch_size: 10,
            flush_interval: Duration::from_millis(5000),
            request_timeout: Duration::from_secs(5),
            max_connections: 10,
            user_agent: concat!("appvital-log-shipper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ShipperConfig {
    /// Default configuration with an explicit service name.
    pub fn for_service(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.api_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid API URL '{}': {}", self.api_url, e))
        })?;

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if self.flush_interval.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Flush interval must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_original_client_defaults() {
        let config = ShipperConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.service_name, "unknown_service");
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.flush_interval, Duration::from_millis(5000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn for_service_overrides_only_the_name() {
        let config = ShipperConfig::for_service("auth_service");
        assert_eq!(config.service_name, "auth_service");
        assert_eq!(config.batch_size, 10);
    }

    #[test]
    fn rejects_invalid_url() {
        let config = ShipperConfig {
            api_url: "not a url".to_string(),
            ..ShipperConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let config = ShipperConfig {
            batch_size: 0,
            ..ShipperConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_zero_flush_interval() {
        let config = ShipperConfig {
            flush_interval: Duration::ZERO,
            ..ShipperConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfig(_))
        ));
    }
}
