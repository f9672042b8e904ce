//! Reports handed back to the engine after a tick or a forced rebalance.

use corelib::{Error, NodeId, NodeStatus, RebalanceReport, RebalanceTrigger};
use serde::Serialize;

/// A node crossing a threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTransition {
    pub node_id: NodeId,
    pub from: NodeStatus,
    pub to: NodeStatus,
    pub utilization: u8,
}

/// Outcome of one `tick()`.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub tick: u64,
    pub updated: usize,
    pub transitions: Vec<StatusTransition>,
    /// Nodes skipped this tick, one error each.
    pub errors: Vec<Error>,
    /// Present when any status changed; the ring should be rebalanced with it.
    pub trigger: Option<RebalanceTrigger>,
}

impl TickReport {
    pub fn is_noop(&self) -> bool {
        self.updated == 0 && self.errors.is_empty()
    }
}

/// Acknowledgment of `simulate_rebalance_trigger`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceAck {
    pub ring_version: u64,
    pub degraded: Vec<NodeId>,
    pub relieved: Vec<NodeId>,
    pub report: RebalanceReport,
}
