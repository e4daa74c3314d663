use clap::Parser;
use relay_server::{
    cli::{Args, Commands},
    config::RelayConfig,
    error::Result,
    server::RelayServer,
};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging before anything else can fail
    init_logging(&args.log_level);

    let command = args.command.clone();

    // Execute the appropriate command
    let result = match command {
        Some(Commands::Start) => run_server(args).await,
        Some(Commands::Health { url }) => check_health(&url).await,
        Some(Commands::Config { show }) => handle_config(args, show).await,
        Some(Commands::Init { output, force }) => init_config(&output, force).await,
        None => {
            // Default to starting the server
            run_server(args).await
        }
    };

    match result {
        Ok(_) => {
            process::exit(0);
        }
        Err(e) => {
            error!("Command failed: {:?}", e);
            process::exit(1);
        }
    }
}

/// Run the relay server
async fn run_server(args: Args) -> Result<()> {
    info!("Starting signer callback relay");

    let config = RelayConfig::load(&args)?;
    config.validate()?;

    info!(
        retention_secs = config.reaper.retention_window.as_secs(),
        sweep_secs = config.reaper.sweep_interval.as_secs(),
        "Configuration loaded and validated"
    );

    let server = RelayServer::new(config);
    server.start().await?;

    info!("Relay server stopped");
    Ok(())
}

/// Check server health
async fn check_health(url: &str) -> Result<()> {
    info!("Checking server health at: {}", url);

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .timeout(std::time::Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| relay_server::error::ServerError::Service {
            service: "health-check".to_string(),
            error: e.to_string(),
        })?;

    if response.status().is_success() {
        info!("Server is healthy");
        let body = response.text().await.unwrap_or_default();
        if !body.is_empty() {
            println!("{body}");
        }
        Ok(())
    } else {
        error!("Server is unhealthy: {}", response.status());
        Err(relay_server::error::ServerError::HealthCheck(format!(
            "HTTP {}",
            response.status()
        )))
    }
}

/// Handle configuration commands
async fn handle_config(args: Args, show: bool) -> Result<()> {
    let config = RelayConfig::load(&args)?;
    config.validate()?;

    if show {
        let config_str = toml::to_string_pretty(&config)
            .map_err(|e| relay_server::error::ConfigError::InvalidFile(e.to_string()))?;

        println!("{config_str}");
    } else {
        info!("Configuration is valid");
    }

    Ok(())
}

/// Initialize default configuration
async fn init_config(output: &std::path::Path, force: bool) -> Result<()> {
    info!("Initializing configuration file: {:?}", output);

    if output.exists() && !force {
        error!("Configuration file already exists. Use --force to overwrite.");
        return Err(relay_server::error::ServerError::Service {
            service: "init".to_string(),
            error: "File already exists".to_string(),
        });
    }

    let config_content = RelayConfig::generate_default()?;

    std::fs::write(output, config_content)
        .map_err(relay_server::error::ConfigError::Io)?;

    info!("Configuration file created: {:?}", output);
    Ok(())
}

/// Initialize tracing with an env-filter fallback to the CLI log level
fn init_logging(level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "relay_server={level},relay_api={level},relay_engine={level},relay_core={level}"
                ))
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
