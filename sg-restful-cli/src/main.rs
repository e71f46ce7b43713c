use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use sg_restful::prelude::*;

/// sg-restful - REST gateway for the Shotgun JSON-RPC API
#[derive(Parser, Debug)]
#[command(name = "sg-restful")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Shotgun site URL, e.g. https://studio.shotgunstudio.com
    #[arg(short = 's', long, env = "SG_HOST")]
    shotgun_host: Option<String>,

    /// Read configuration from this file instead of the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,

    /// Active query formats in dispatch order
    #[arg(long, value_delimiter = ',')]
    formats: Option<Vec<String>>,
}

impl Cli {
    /// Load configuration and apply command-line overrides
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => Config::load().context("Failed to load configuration")?,
        };

        if let Some(port) = self.port {
            config.service.port = port;
        }
        if let Some(host) = &self.shotgun_host {
            config.backend.host = host.clone();
        }
        if let Some(level) = &self.log_level {
            config.service.log_level = level.clone();
        }
        if let Some(formats) = &self.formats {
            config.query.formats = formats.iter().map(|f| f.trim().to_string()).collect();
        }

        config.validate()?;
        Ok(config)
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config()?;
    init_tracing(&config)?;

    let state = AppState::new(config.clone()).context("Failed to build application state")?;
    tracing::info!(
        version = VERSION,
        formats = ?state.formats().active_names(),
        "sg-restful starting"
    );

    Server::new(config).serve(router(state)).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);

        if let Some(source) = e.source() {
            eprintln!("\n{} {}", "Caused by:".yellow(), source);
        }

        std::process::exit(1);
    }
}
