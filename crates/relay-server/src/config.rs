use crate::cli::Args;
use crate::error::{ConfigError, ConfigResult};
use derive_setters::Setters;
use relay_api::ApiSettings;
use relay_engine::ReaperConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete relay server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Setters, Default)]
#[setters(strip_option, into)]
pub struct RelayConfig {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub reaper: ReaperConfig,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Setters)]
#[setters(strip_option, into)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize, Setters)]
#[setters(strip_option, into)]
pub struct TelemetrySettings {
    pub service_name: String,
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            service_name: "relay-server".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from multiple sources
    pub fn load(args: &Args) -> ConfigResult<Self> {
        let mut config = Self::default();

        // Load from file if specified
        if let Some(config_file) = args.config_file() {
            config = Self::from_file(config_file)?;
        }

        // Override with environment variables
        config.merge_with_env()?;

        // Override with CLI arguments
        config.merge_with_args(args);

        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: Self = toml::from_str(&content).map_err(ConfigError::Toml)?;

        Ok(config)
    }

    /// Merge with environment variables
    pub fn merge_with_env(&mut self) -> ConfigResult<()> {
        if let Ok(bind_address) = std::env::var("RELAY_BIND_ADDRESS") {
            self.server.bind_address = bind_address;
        }
        if let Ok(port) = std::env::var("RELAY_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "RELAY_PORT".to_string(),
                value: port,
            })?;
        }
        if let Ok(retention) = std::env::var("RELAY_RETENTION_SECS") {
            let secs = retention.parse().map_err(|_| ConfigError::InvalidValue {
                field: "RELAY_RETENTION_SECS".to_string(),
                value: retention,
            })?;
            self.reaper.retention_window = Duration::from_secs(secs);
        }
        if let Ok(sweep) = std::env::var("RELAY_SWEEP_SECS") {
            let secs = sweep.parse().map_err(|_| ConfigError::InvalidValue {
                field: "RELAY_SWEEP_SECS".to_string(),
                value: sweep,
            })?;
            self.reaper.sweep_interval = Duration::from_secs(secs);
        }
        if let Ok(origin) = std::env::var("RELAY_CORS_ORIGIN") {
            self.api.cors_origins = origin.split(',').map(str::to_string).collect();
        }
        if let Ok(expose) = std::env::var("RELAY_EXPOSE_DEBUG") {
            self.api.expose_debug = matches!(expose.as_str(), "1" | "true" | "yes");
        }

        Ok(())
    }

    /// Merge with CLI arguments
    pub fn merge_with_args(&mut self, args: &Args) {
        self.server.bind_address = args.bind_address.clone();
        self.server.port = args.port;
        self.telemetry.log_level = args.log_level.clone();
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
            });
        }

        if self.server.bind_address.is_empty() {
            return Err(ConfigError::MissingRequired(
                "server.bind_address".to_string(),
            ));
        }

        if self.reaper.retention_window.is_zero() {
            return Err(ConfigError::Validation(
                "reaper.retention_window must be greater than zero".to_string(),
            ));
        }

        if self.reaper.sweep_interval.is_zero() {
            return Err(ConfigError::Validation(
                "reaper.sweep_interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> ConfigResult<String> {
        let config = Self::default();
        toml::to_string_pretty(&config).map_err(|e| ConfigError::InvalidFile(e.to_string()))
    }
}
