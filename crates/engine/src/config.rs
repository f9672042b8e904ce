//! Engine configuration.
//!
//! Loaded from JSON; every field has a default, so a partial file (or none)
//! is valid.

use std::path::Path;
use std::time::Duration;

use corelib::{Error, PartitionerKind, RebalancePolicy, Result};
use monitor::MonitorConfig;
use routing::RoutingConfig;
use serde::{Deserialize, Serialize};

/// Periods of the two scheduled jobs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleConfig {
    pub tick_ms: u64,
    pub route_refresh_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_ms: 3_000,
            route_refresh_ms: 5_000,
        }
    }
}

impl ScheduleConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn route_interval(&self) -> Duration {
        Duration::from_millis(self.route_refresh_ms)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub partitioner: PartitionerKind,
    pub rebalance: RebalancePolicy,
    pub routing: RoutingConfig,
    /// Thresholds, random walk and simulated-rebalance settings.
    pub monitor: MonitorConfig,
    pub schedule: ScheduleConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid engine config: {e}")))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.rebalance.validate()?;
        self.routing.validate()?;
        self.monitor.validate()?;
        if self.schedule.tick_ms == 0 || self.schedule.route_refresh_ms == 0 {
            return Err(Error::Config("schedule periods must be positive".into()));
        }
        Ok(())
    }
}
