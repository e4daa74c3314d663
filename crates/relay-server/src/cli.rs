use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Signer Callback Relay - bridges signing callbacks to waiting requesters
#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(about = "Relays wallet-signing callbacks over push and pull channels")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "RELAY_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Server bind address
    #[arg(long, env = "RELAY_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Server port
    #[arg(short, long, env = "RELAY_PORT", default_value = "8080")]
    pub port: u16,

    /// Log level
    #[arg(long, env = "RELAY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the relay server
    Start,
    /// Check server health
    Health {
        /// Health check endpoint URL
        #[arg(long, default_value = "http://localhost:8080/health")]
        url: String,
    },
    /// Validate configuration
    Config {
        /// Show resolved configuration
        #[arg(long)]
        show: bool,
    },
    /// Generate default configuration
    Init {
        /// Output file path
        #[arg(short, long, default_value = "relay.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

impl Args {
    /// Get the effective configuration file path
    pub fn config_file(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    /// Get the server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
