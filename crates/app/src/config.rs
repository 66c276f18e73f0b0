//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Runtime configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `RESERVE_REPLY_TIMEOUT_MS` — inventory request/reply deadline
///   (default: `5000`)
/// - `GATEWAY_APPROVE` — static gateway verdict (default: `true`)
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub reserve_reply_timeout_ms: u64,
    pub gateway_approve: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            reserve_reply_timeout_ms: std::env::var("RESERVE_REPLY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
            gateway_approve: std::env::var("GATEWAY_APPROVE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Returns the reservation round-trip deadline as a duration.
    pub fn reserve_reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reserve_reply_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            reserve_reply_timeout_ms: 5_000,
            gateway_approve: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.reserve_reply_timeout(), Duration::from_secs(5));
        assert!(config.gateway_approve);
    }
}
