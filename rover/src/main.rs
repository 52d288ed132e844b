use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use rover::config::ServerConfig;
use rover::server::Server;
use rover::{install_interrupt_handler, RoverError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rover")]
#[command(about = "ROVER - robot coordination server")]
#[command(version)]
struct Cli {
    /// Config file (default: first of ./rover.toml, ~/.rover/config.toml, /etc/rover/config.toml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read operator input from FILE instead of stdin
    #[arg(short = 's', long = "script", value_name = "FILE")]
    script: Option<PathBuf>,

    /// Worker threads in the pool
    #[arg(short = 'w', long = "workers")]
    workers: Option<usize>,

    /// Log level used when RUST_LOG is not set
    #[arg(short = 'l', long = "log-level", default_value = "info")]
    log_level: String,
}

fn load_config(cli: &Cli) -> Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => match ServerConfig::find_and_load() {
            Ok(config) => config,
            Err(RoverError::NotFound(_)) => {
                tracing::debug!("No config file found, using defaults");
                ServerConfig::default()
            }
            Err(e) => return Err(e.into()),
        },
    };

    if let Some(workers) = cli.workers {
        config.server.workers = workers;
    }
    if let Some(script) = &cli.script {
        config.client.script = Some(script.clone());
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rover={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(&cli)?;
    let grace = config.server.shutdown_grace();
    let server = Server::from_config(config).context("Failed to build server")?;
    install_interrupt_handler(server.token(), grace)?;

    tracing::info!("ROVER {} starting", rover::VERSION);
    let report = server.run()?;

    println!("\n{}", report);
    let failed = report.failures().count();
    if failed > 0 {
        bail!("{} task(s) crashed", failed);
    }
    println!("{}", "ROVER stopped cleanly".green());
    Ok(())
}
