//! Utilization thresholds driving the node status state machine.

use corelib::{Error, NodeStatus, Result};
use serde::{Deserialize, Serialize};

/// `utilization >= critical` is critical, `>= warning` is warning, anything
/// below is healthy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthThresholds {
    pub warning: u8,
    pub critical: u8,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            warning: 70,
            critical: 90,
        }
    }
}

impl HealthThresholds {
    pub fn classify(&self, utilization: u8) -> NodeStatus {
        if utilization >= self.critical {
            NodeStatus::Critical
        } else if utilization >= self.warning {
            NodeStatus::Warning
        } else {
            NodeStatus::Healthy
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.warning == 0 || self.warning >= self.critical || self.critical > 100 {
            return Err(Error::Config(format!(
                "thresholds must satisfy 0 < warning < critical <= 100, got {}/{}",
                self.warning, self.critical
            )));
        }
        Ok(())
    }
}
