//! CLI for vidgate.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidgate_core::config;

use commands::{run_config_path, run_gateways, run_pin, run_preload, run_resolve};

/// Top-level CLI for vidgate.
#[derive(Debug, Parser)]
#[command(name = "vidgate")]
#[command(about = "vidgate: gateway resolution, preload and pinning for content-addressed video", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve a content identifier to a retrieval URL.
    Resolve {
        /// Content identifier (hash).
        cid: String,
        /// Skip the relay fallback.
        #[arg(long)]
        no_relay: bool,
    },

    /// Drive playback loading for an identifier and print each state transition.
    Preload {
        /// Content identifier (hash).
        cid: String,
        /// Manual retries to issue after automatic retries are exhausted.
        #[arg(long, default_value = "0", value_name = "N")]
        manual_retries: u32,
    },

    /// Pin a local video file with the pinning service and print its identifier.
    Pin {
        /// Path to the video file.
        path: PathBuf,
    },

    /// List configured gateways in priority order.
    Gateways,

    /// Print the config file location.
    ConfigPath,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Resolve { cid, no_relay } => run_resolve(&cfg, &cid, no_relay).await?,
            CliCommand::Preload {
                cid,
                manual_retries,
            } => run_preload(&cfg, &cid, manual_retries).await?,
            CliCommand::Pin { path } => run_pin(&cfg, &path).await?,
            CliCommand::Gateways => run_gateways(&cfg)?,
            CliCommand::ConfigPath => run_config_path()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
