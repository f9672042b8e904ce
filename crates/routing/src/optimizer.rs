//! Route optimizer.
//!
//! # Algorithm
//!
//! 1. Normalize the algorithm tag (`InvalidAlgorithm` on anything unknown)
//! 2. Resolve source and destination against the ring snapshot and node table
//! 3. Build the route graph for this request
//! 4. Run the selected strategy under the search budget
//! 5. Price the path and assemble an immutable `RoutePlan`
//!
//! The optimizer only reads: it works on a ring snapshot and a copy of the
//! node table, so it can never observe a half-applied rebalance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use corelib::{Error, Node, NodeId, Result, RingSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algorithm::Algorithm;
use crate::cost::{CostBreakdown, CostModel};
use crate::destination::{Destination, Gazetteer};
use crate::graph::{GraphConfig, RouteGraph};
use crate::money::Cents;
use crate::plan::{RouteLeg, RoutePlan, RouteRequest};
use crate::strategy::SearchBudget;

/// Router configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoutingConfig {
    pub cost: CostModel,
    pub graph: GraphConfig,
    /// Savings applied by the exact strategies, per mille of the gross cost.
    pub savings_per_mille: u64,
    /// Per-call deadline; `None` disables it.
    pub timeout_ms: Option<u64>,
    pub max_expansions: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            cost: CostModel::default(),
            graph: GraphConfig::default(),
            savings_per_mille: 50,
            timeout_ms: Some(250),
            max_expansions: 100_000,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<()> {
        self.cost.validate()?;
        if self.savings_per_mille >= 1000 {
            return Err(Error::Config(format!(
                "savings_per_mille must be below 1000, got {}",
                self.savings_per_mille
            )));
        }
        if !(self.graph.max_link_miles >= 0.0 && self.graph.max_final_mile_miles > 0.0) {
            return Err(Error::Config("link radii must be positive".into()));
        }
        if self.max_expansions == 0 {
            return Err(Error::Config("max_expansions must be positive".into()));
        }
        Ok(())
    }
}

/// Computes route plans against the current ring and fleet load.
#[derive(Debug)]
pub struct RouteOptimizer {
    config: RoutingConfig,
    gazetteer: Gazetteer,
    orders: AtomicU64,
}

impl Default for RouteOptimizer {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl RouteOptimizer {
    pub fn new(config: RoutingConfig) -> Self {
        Self::with_gazetteer(config, Gazetteer::default())
    }

    pub fn with_gazetteer(config: RoutingConfig, gazetteer: Gazetteer) -> Self {
        Self {
            config,
            gazetteer,
            orders: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Compute a plan for `request`. Failures are returned whole; a partial
    /// plan is never produced.
    pub fn optimize(&self, request: &RouteRequest, snapshot: &RingSnapshot, nodes: &[Node]) -> Result<RoutePlan> {
        let algorithm: Algorithm = request.algorithm.parse()?;
        if snapshot.is_empty() {
            return Err(Error::NoPathFound("ring is empty".into()));
        }

        let source = self.resolve_source(&request.source, snapshot, nodes)?;
        let destination = self.resolve_destination(&request.destination, snapshot, nodes)?;
        let graph = RouteGraph::build(
            snapshot,
            nodes,
            &source,
            &destination,
            &self.config.cost,
            &self.config.graph,
        )?;
        debug!(
            %algorithm,
            source = %source,
            destination = %request.destination,
            vertices = graph.vertex_count(),
            legs = graph.leg_count(),
            "route graph built"
        );

        let strategy = algorithm.strategy();
        let mut budget = SearchBudget::new(
            self.config.timeout_ms.map(Duration::from_millis),
            self.config.max_expansions,
        );
        let found = strategy.find_path(&graph, &mut budget)?;

        let mut legs = Vec::with_capacity(found.vertices.len().saturating_sub(1));
        let mut leg_costs = Vec::with_capacity(legs.capacity());
        let (mut miles, mut minutes) = (0.0, 0);
        for pair in found.vertices.windows(2) {
            let leg = graph.leg(pair[0], pair[1]).ok_or_else(|| {
                Error::NoPathFound("search returned a path over a missing leg".into())
            })?;
            miles += leg.miles;
            minutes += leg.minutes;
            leg_costs.push(leg.cost);
            legs.push(RouteLeg {
                from: graph.waypoint(pair[0]).label.clone(),
                to: graph.waypoint(pair[1]).label.clone(),
                miles: round_tenth(leg.miles),
                cost: Cents(leg.cost.weight()),
                minutes: leg.minutes,
            });
        }
        if legs.is_empty() {
            return Err(Error::NoPathFound("search returned an empty path".into()));
        }

        let savings = if strategy.is_optimal() {
            self.config.savings_per_mille
        } else {
            0
        };
        let cost_breakdown = CostBreakdown::from_legs(&leg_costs, savings);
        let plan = RoutePlan {
            order_id: format!("ord-{:06}", self.orders.fetch_add(1, Ordering::Relaxed) + 1),
            algorithm,
            optimal: strategy.is_optimal(),
            source,
            destination: graph.waypoint(graph.sink()?).label.clone(),
            path: found
                .vertices
                .iter()
                .map(|idx| graph.waypoint(*idx).label.clone())
                .collect(),
            path_ids: found
                .vertices
                .iter()
                .map(|idx| graph.waypoint(*idx).id.clone())
                .collect(),
            hops: legs.len(),
            legs,
            total_cost: cost_breakdown.total,
            estimated_time: minutes.max(1),
            distance: round_tenth(miles).max(0.1),
            cost_breakdown,
            ring_version: snapshot.version,
        };

        info!(
            order = %plan.order_id,
            %algorithm,
            hops = plan.hops,
            total = %plan.total_cost,
            expansions = budget.expansions(),
            "route optimized"
        );
        Ok(plan)
    }

    /// Source by node id, then by case-insensitive name; must be on the ring.
    fn resolve_source(&self, source: &str, snapshot: &RingSnapshot, nodes: &[Node]) -> Result<NodeId> {
        find_node(source, nodes)
            .filter(|node| snapshot.contains(&node.id))
            .map(|node| node.id.clone())
            .ok_or_else(|| Error::NodeNotFound(NodeId::from(source)))
    }

    /// Destination by node id or name on the ring, then by gazetteer city.
    fn resolve_destination(&self, destination: &str, snapshot: &RingSnapshot, nodes: &[Node]) -> Result<Destination> {
        if let Some(node) = find_node(destination, nodes).filter(|n| snapshot.contains(&n.id)) {
            return Ok(Destination::Node(node.id.clone()));
        }
        self.gazetteer
            .lookup(destination)
            .map(|city| Destination::City {
                name: city.name.clone(),
                location: city.location,
            })
            .ok_or_else(|| Error::NoPathFound(format!("unknown destination {destination:?}")))
    }
}

fn find_node<'a>(key: &str, nodes: &'a [Node]) -> Option<&'a Node> {
    let key = key.trim();
    nodes
        .iter()
        .find(|n| n.id.as_str() == key)
        .or_else(|| nodes.iter().find(|n| n.name.eq_ignore_ascii_case(key)))
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
