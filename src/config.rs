//! Configuration management with TOML support
//!
//! Configuration is loaded once at startup and is not runtime-mutable;
//! cache tuning (entry limits, TTLs, sweep interval) applies at
//! construction time only.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Cache layer tuning
    #[serde(default)]
    pub cache: CacheTuning,

    /// Monitoring and observability
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// CORS allowed origins (empty = allow all, for development)
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// Tuning for all cache layers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheTuning {
    /// Per-user volatile data (short TTL, written through on updates)
    #[serde(default = "default_user_data_layer")]
    pub user_data: LayerConfig,

    /// Image metadata listings (rarely change, longer TTL)
    #[serde(default = "default_image_metadata_layer")]
    pub image_metadata: LayerConfig,

    /// Property analysis records
    #[serde(default = "default_property_analysis_layer")]
    pub property_analysis: LayerConfig,

    /// Background sweep interval in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Tuning for a single cache layer
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayerConfig {
    /// Hard cap on entry count; eviction keeps the map at or below this
    pub max_entries: usize,

    /// Default time-to-live in seconds for entries in this layer
    pub ttl_secs: u64,
}

impl LayerConfig {
    /// Default TTL as a [`Duration`]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Monitoring configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Enable the Prometheus metrics endpoint
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_workers() -> usize {
    num_cpus::get()
}
fn default_user_data_layer() -> LayerConfig {
    LayerConfig {
        max_entries: 500,
        ttl_secs: 120,
    }
}
fn default_image_metadata_layer() -> LayerConfig {
    LayerConfig {
        max_entries: 200,
        ttl_secs: 600,
    }
}
fn default_property_analysis_layer() -> LayerConfig {
    LayerConfig {
        max_entries: 100,
        ttl_secs: 300,
    }
}
fn default_sweep_interval_secs() -> u64 {
    60
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for CacheTuning {
    fn default() -> Self {
        Self {
            user_data: default_user_data_layer(),
            image_metadata: default_image_metadata_layer(),
            property_analysis: default_property_analysis_layer(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Configuration(format!("failed to parse {}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (name, layer) in [
            ("user_data", &self.cache.user_data),
            ("image_metadata", &self.cache.image_metadata),
            ("property_analysis", &self.cache.property_analysis),
        ] {
            if layer.max_entries == 0 {
                return Err(Error::Configuration(format!(
                    "cache.{}.max_entries must be greater than 0",
                    name
                )));
            }
            if layer.ttl_secs == 0 {
                return Err(Error::Configuration(format!(
                    "cache.{}.ttl_secs must be greater than 0",
                    name
                )));
            }
        }

        if self.cache.sweep_interval_secs == 0 {
            return Err(Error::Configuration(
                "cache.sweep_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(Error::Configuration("server.port must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Background sweep interval as a [`Duration`]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache.sweep_interval_secs)
    }
}
