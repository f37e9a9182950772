//! Vitae: the process entry point.
//!
//! Loads configuration, ingests the knowledge sources once, then serves the
//! HTTP API until the process is stopped. There are no subcommands.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use vitae_config::AppConfig;

#[derive(Parser)]
#[command(
    name = "vitae",
    about = "Vitae: a persona chat assistant for your career questions",
    version,
    author
)]
struct Cli {
    /// Path to a TOML config file (also read from VITAE_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listening port
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let mut config =
        AppConfig::load(cli.config.as_deref()).map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(port) = cli.port {
        config.gateway.port = port;
        config.validate()?;
    }
    config.log_degraded_features();

    info!(
        persona = %config.persona.name,
        model = %config.openai.model,
        listen = %config.gateway.bind_addr(),
        "Starting Vitae"
    );

    vitae_gateway::start(config).await?;

    Ok(())
}
