//! Status-driven rebalancing.
//!
//! # Layout rule
//!
//! Every node has a fixed *home* token. Sorting nodes by home, node `i` owns
//! the home range `(home[i-1], home[i]]`. A degraded node sheds part of that
//! range by moving its current position counter-clockwise:
//!
//! ```text
//!   pred_home                         home
//!      |-------- kept --------|-- shed --|
//!                          position
//! ```
//!
//! The shed slice `(position, home]` now falls through to the successor.
//! Since every position stays inside `(pred_home, home]` and the predecessor's
//! own position is at most `pred_home`, positions remain unique and the
//! clockwise order of nodes never changes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::node::{NodeId, NodeStatus};
use crate::token::Token;
use crate::topology::Ownership;

/// How much of its home range a node keeps, per status, in thousandths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RebalancePolicy {
    pub warning_keep_per_mille: u32,
    pub critical_keep_per_mille: u32,
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        Self {
            warning_keep_per_mille: 500,
            critical_keep_per_mille: 125,
        }
    }
}

impl RebalancePolicy {
    pub fn keep_per_mille(&self, status: NodeStatus) -> u32 {
        match status {
            NodeStatus::Healthy => 1000,
            NodeStatus::Warning => self.warning_keep_per_mille,
            NodeStatus::Critical => self.critical_keep_per_mille,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (warning, critical) = (self.warning_keep_per_mille, self.critical_keep_per_mille);
        if warning > 1000 || critical > 1000 {
            return Err(Error::Config("keep ratios must be at most 1000 per mille".into()));
        }
        if critical > warning {
            return Err(Error::Config(format!(
                "critical nodes must keep no more than warning nodes ({critical} > {warning})"
            )));
        }
        Ok(())
    }
}

/// Why a rebalance was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerReason {
    /// A monitor tick moved at least one node across a threshold.
    StatusChange,
    /// Operator request (the dashboard's "simulate rebalance" button).
    Manual,
}

/// Status table handed from the monitor to the ring.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceTrigger {
    pub reason: TriggerReason,
    pub statuses: BTreeMap<NodeId, NodeStatus>,
}

impl RebalanceTrigger {
    pub fn new(reason: TriggerReason) -> Self {
        Self {
            reason,
            statuses: BTreeMap::new(),
        }
    }

    pub fn with_status(mut self, id: impl Into<NodeId>, status: NodeStatus) -> Self {
        self.statuses.insert(id.into(), status);
        self
    }
}

/// A node whose position changed during a rebalance.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMove {
    pub node_id: NodeId,
    pub status: NodeStatus,
    pub from: Token,
    pub to: Token,
}

/// Outcome of a rebalance. Callers must treat a non-empty `moved` list as a
/// cache invalidation: keys may now resolve to different nodes.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceReport {
    pub version: u64,
    pub reason: TriggerReason,
    pub moved: Vec<NodeMove>,
    /// Per-node failures; the remaining nodes were still rebalanced.
    pub errors: Vec<Error>,
    pub ownership_before: Vec<Ownership>,
    pub ownership_after: Vec<Ownership>,
}

impl RebalanceReport {
    pub fn changed(&self) -> bool {
        !self.moved.is_empty()
    }
}

/// Compute current positions for nodes given as `(home, id, status)`.
///
/// `nodes` must be sorted by `(home, id)` with unique homes. Returns one
/// position per input, in the same order.
pub(crate) fn layout(
    nodes: &[(Token, NodeId, NodeStatus)],
    policy: &RebalancePolicy,
    space: u128,
) -> Vec<Token> {
    let n = nodes.len();
    if n < 2 {
        return nodes.iter().map(|(home, _, _)| *home).collect();
    }
    nodes
        .iter()
        .enumerate()
        .map(|(i, (home, _, status))| {
            let keep = u128::from(policy.keep_per_mille(*status));
            if keep >= 1000 {
                return *home;
            }
            let pred_home = nodes[(i + n - 1) % n].0;
            let range = pred_home.distance_to(home, space);
            let kept = (range * keep / 1000).clamp(1, range);
            pred_home.advance(kept, space)
        })
        .collect()
}
