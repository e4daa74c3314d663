use thiserror::Error;

/// Errors that can occur in the relay server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Service error: {service} - {error}")]
    Service { service: String, error: String },

    #[error("Health check failed: {0}")]
    HealthCheck(String),

    #[error("Signal handling error: {0}")]
    Signal(String),

    #[error("Shutdown timeout exceeded")]
    ShutdownTimeout,
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_error_display() {
        let fixture = ServerError::ShutdownTimeout;
        let actual = fixture.to_string();
        let expected = "Shutdown timeout exceeded";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_config_error_display() {
        let fixture = ConfigError::MissingRequired("server.port".to_string());
        let actual = fixture.to_string();
        let expected = "Missing required configuration: server.port";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_service_error_display() {
        let fixture = ServerError::Service {
            service: "api".to_string(),
            error: "failed to bind to port".to_string(),
        };
        let actual = fixture.to_string();
        let expected = "Service error: api - failed to bind to port";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_invalid_value_display() {
        let fixture = ConfigError::InvalidValue {
            field: "RELAY_PORT".to_string(),
            value: "not-a-port".to_string(),
        };
        let actual = fixture.to_string();
        let expected = "Invalid configuration value: RELAY_PORT = not-a-port";
        assert_eq!(actual, expected);
    }
}
