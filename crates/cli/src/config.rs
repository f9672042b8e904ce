//! Command-line options.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use corelib::PartitionerKind;
use engine::{Cluster, EngineConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::commands::Command;

/// Fulfillment routing and fleet health control tool.
#[derive(Parser, Debug)]
#[command(name = "fleetctl")]
#[command(author, version, about, long_about = None)]
pub struct CliConfig {
    /// Engine configuration file (JSON). Missing fields use defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for the metrics random walk and simulated rebalances.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Ring partitioner (siphash, degrees).
    #[arg(long, global = true)]
    pub partitioner: Option<PartitionerKind>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: Level,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// The engine config after applying file and flag overrides.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.monitor.seed = seed;
        }
        if let Some(partitioner) = self.partitioner {
            config.partitioner = partitioner;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn run(self) -> anyhow::Result<()> {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(self.log_level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;

        let config = self.engine_config()?;
        info!(partitioner = ?config.partitioner, seed = config.monitor.seed, "starting fleetctl");
        let cluster = Cluster::seeded(&config).context("failed to seed the default fleet")?;

        let result = self.command.execute(cluster, &config)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        if let Some(message) = result.error() {
            anyhow::bail!(message);
        }
        Ok(())
    }
}
