//! Route requests and plans.

use corelib::NodeId;
use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::cost::CostBreakdown;
use crate::money::Cents;

/// Request as received from the API layer. The algorithm stays a raw string
/// until `RouteOptimizer::optimize` normalizes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Source warehouse id or name.
    pub source: String,
    /// Destination node id/name or city label.
    pub destination: String,
    pub algorithm: String,
}

impl RouteRequest {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, algorithm: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            algorithm: algorithm.into(),
        }
    }
}

/// One hop of a plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub from: String,
    pub to: String,
    pub miles: f64,
    pub cost: Cents,
    pub minutes: u32,
}

/// Immutable result of one optimization. A refresh produces a new plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub order_id: String,
    pub algorithm: Algorithm,
    /// False for greedy plans, whose cost is an approximation.
    pub optimal: bool,
    pub source: NodeId,
    pub destination: String,
    /// Labels from source to destination, at least two entries.
    pub path: Vec<String>,
    /// Vertex ids matching `path`.
    pub path_ids: Vec<NodeId>,
    pub legs: Vec<RouteLeg>,
    /// Number of legs.
    pub hops: usize,
    pub total_cost: Cents,
    /// Minutes.
    pub estimated_time: u32,
    /// Miles, one decimal.
    pub distance: f64,
    pub cost_breakdown: CostBreakdown,
    /// Ring version the plan was computed against.
    pub ring_version: u64,
}
