//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the application.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Application settings (mode, deployment paths, store).
    pub app: ApplicationConfig,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Locale files by language code (e.g. `fr = "locales/fr.json"`).
    pub locales: BTreeMap<String, String>,
}

/// Application settings shared with the router and handlers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Developer mode: error pages show message and stack trace.
    pub developer_mode: bool,

    /// Project root on disk.
    pub base_dir: String,

    /// Web server document root; `base_dir` minus this is the URL base path.
    pub document_root: String,

    /// URL path of the front controller script.
    pub front_controller: String,

    /// Optional JSON key/value store file.
    pub store_path: Option<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            developer_mode: false,
            base_dir: "/var/www/html".to_string(),
            document_root: "/var/www/html".to_string(),
            front_controller: "/index.php".to_string(),
            store_path: None,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(!config.app.developer_mode);
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.locales.is_empty());
    }

    #[test]
    fn test_full_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [app]
            developer_mode = true
            base_dir = "/srv/www/blog"
            document_root = "/srv/www"
            store_path = "data/store.json"

            [observability]
            log_level = "debug"
            log_format = "json"

            [locales]
            fr = "locales/fr.json"
            "#,
        )
        .unwrap();

        assert!(config.app.developer_mode);
        assert_eq!(config.app.front_controller, "/index.php");
        assert_eq!(config.app.store_path.as_deref(), Some("data/store.json"));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.locales.get("fr").map(String::as_str), Some("locales/fr.json"));
    }
}
