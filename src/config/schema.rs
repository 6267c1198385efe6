//! Service configuration schema.
//!
//! Describes how the service runs (where it listens, which snapshot file it
//! serves, observability). Routing data itself lives in the snapshot.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Preview API listener.
    pub listener: ListenerConfig,

    /// Snapshot source.
    pub snapshot: SnapshotSourceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8085").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8085".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Where the configuration snapshot comes from.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SnapshotSourceConfig {
    /// Path to the JSON snapshot. Empty starts with an empty snapshot.
    pub path: String,

    /// Reload the snapshot when the file changes.
    pub watch: bool,

    /// Poll interval for the file watcher, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for SnapshotSourceConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            watch: true,
            poll_interval_secs: 2,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9095".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.listener.bind_address, "127.0.0.1:8085");
        assert!(config.snapshot.watch);
    }

    #[test]
    fn test_partial_sections() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [snapshot]
            path = "/var/lib/proxy-selector/state.json"
            watch = false

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.snapshot.path, "/var/lib/proxy-selector/state.json");
        assert!(!config.snapshot.watch);
        assert_eq!(config.snapshot.poll_interval_secs, 2);
        assert_eq!(config.observability.log_level, "debug");
        assert!(!config.observability.metrics_enabled);
    }
}
