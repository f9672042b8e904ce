//! The explicitly owned core state of one process.
//!
//! `Cluster` holds the ring, the fleet monitor, the route optimizer and the
//! most recent plan. Every operation is synchronous and runs to completion;
//! the scheduler and the API layer serialize access to it.

use std::sync::Arc;

use corelib::{
    Error, HashRing, Node, NodeId, NodeStatus, Ownership, RebalanceReport, RebalanceTrigger, Result, RingSnapshot, Token,
    Topology, TriggerReason,
};
use monitor::{FleetHealthMonitor, RebalanceAck, TickReport};
use routing::{Algorithm, RouteOptimizer, RoutePlan, RouteRequest};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::seed;
use crate::telemetry;

/// A monitor tick and the rebalance it caused, if any.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickOutcome {
    pub report: TickReport,
    pub rebalance: Option<RebalanceReport>,
}

#[derive(Debug)]
pub struct Cluster {
    ring: HashRing,
    monitor: FleetHealthMonitor,
    optimizer: RouteOptimizer,
    algorithm: Algorithm,
    last_request: Option<RouteRequest>,
    current_plan: Option<RoutePlan>,
}

impl Cluster {
    /// Empty cluster built from a validated config.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ring: HashRing::with_policy(config.partitioner.build(), config.rebalance),
            monitor: FleetHealthMonitor::new(config.monitor.clone()),
            optimizer: RouteOptimizer::new(config.routing.clone()),
            algorithm: Algorithm::default(),
            last_request: None,
            current_plan: None,
        })
    }

    /// Cluster pre-populated with the default six warehouses.
    pub fn seeded(config: &EngineConfig) -> Result<Self> {
        Self::with_nodes(config, seed::default_warehouses())
    }

    pub fn with_nodes(config: &EngineConfig, nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let mut cluster = Self::new(config)?;
        for node in nodes {
            cluster.add_node(node)?;
        }
        Ok(cluster)
    }

    /// Track a node and place it on the ring.
    pub fn add_node(&mut self, node: Node) -> Result<Token> {
        let id = node.id.clone();
        self.monitor.add_node(node)?;
        let tracked = self
            .monitor
            .node(&id)
            .cloned()
            .ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        match self.ring.add_node(&tracked) {
            Ok(position) => Ok(position),
            Err(err) => {
                // Keep the monitor and the ring in step.
                if let Err(rollback) = self.monitor.remove_node(&id) {
                    warn!(node = %id, error = %rollback, "rollback of tracked node failed");
                }
                Err(err)
            }
        }
    }

    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node> {
        self.ring.remove_node(id)?;
        let node = self.monitor.remove_node(id)?;
        if self
            .current_plan
            .as_ref()
            .is_some_and(|plan| plan.path_ids.contains(id))
        {
            debug!(node = %id, "current plan routes through a removed node");
            self.current_plan = None;
        }
        Ok(node)
    }

    /// One monitor tick; a status change rebalances the ring before returning.
    ///
    /// Statuses recorded between ticks are folded into the trigger, so the
    /// ring never lags the monitor by more than one tick.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let mut report = self.monitor.tick();
        telemetry::record_tick(report.errors.len(), &self.monitor.nodes());
        report.trigger = self.reconcile(report.trigger.take());

        let rebalance = match &report.trigger {
            Some(trigger) => {
                let rebalance = self.ring.rebalance(trigger)?;
                telemetry::record_rebalance("status_change");
                Some(rebalance)
            }
            None => None,
        };
        Ok(TickOutcome { report, rebalance })
    }

    /// Add every node whose monitored status differs from its ring entry.
    fn reconcile(&self, trigger: Option<RebalanceTrigger>) -> Option<RebalanceTrigger> {
        let snapshot = self.ring.snapshot();
        let drifted: Vec<(NodeId, NodeStatus)> = self
            .monitor
            .statuses()
            .into_iter()
            .filter(|(id, status)| snapshot.entry(id).is_some_and(|e| e.status != *status))
            .collect();
        if drifted.is_empty() {
            return trigger;
        }
        let trigger = trigger.unwrap_or_else(|| RebalanceTrigger::new(TriggerReason::StatusChange));
        Some(drifted.into_iter().fold(trigger, |t, (id, status)| {
            debug!(node = %id, %status, "ring status behind monitor");
            t.with_status(id, status)
        }))
    }

    /// Force a status reshuffle and rebalance (the operator button).
    pub fn simulate_rebalance(&mut self) -> Result<RebalanceAck> {
        let ack = self.monitor.simulate_rebalance_trigger(&self.ring)?;
        telemetry::record_rebalance("manual");
        Ok(ack)
    }

    /// Compute a plan against a consistent snapshot of the ring and the fleet.
    ///
    /// An empty algorithm in the request means the selected algorithm. A
    /// successful plan becomes the current plan.
    pub fn optimize(&mut self, request: &RouteRequest) -> Result<RoutePlan> {
        let mut request = request.clone();
        if request.algorithm.trim().is_empty() {
            request.algorithm = self.algorithm.as_str().to_string();
        }
        let label = request
            .algorithm
            .parse::<Algorithm>()
            .map(|a| a.as_str())
            .unwrap_or("invalid");

        let snapshot = self.ring.snapshot();
        let nodes = self.monitor.nodes();
        match self.optimizer.optimize(&request, &snapshot, &nodes) {
            Ok(plan) => {
                telemetry::record_route(label, true);
                self.last_request = Some(request);
                self.current_plan = Some(plan.clone());
                Ok(plan)
            }
            Err(err) => {
                telemetry::record_route(label, false);
                warn!(
                    source = %request.source,
                    destination = %request.destination,
                    algorithm = %request.algorithm,
                    error = %err,
                    "route optimization failed"
                );
                Err(err)
            }
        }
    }

    /// Recompute the last requested route with the selected algorithm.
    ///
    /// Returns `Ok(None)` when nothing has been requested yet.
    pub fn refresh_route(&mut self) -> Result<Option<RoutePlan>> {
        let Some(mut request) = self.last_request.clone() else {
            return Ok(None);
        };
        request.algorithm = self.algorithm.as_str().to_string();
        self.optimize(&request).map(Some)
    }

    pub fn select_algorithm(&mut self, algorithm: &str) -> Result<Algorithm> {
        let algorithm: Algorithm = algorithm.parse()?;
        if algorithm != self.algorithm {
            info!(from = %self.algorithm, to = %algorithm, "route algorithm selected");
        }
        self.algorithm = algorithm;
        Ok(algorithm)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn locate(&self, key: &str) -> Result<NodeId> {
        self.ring.locate(key.as_bytes())
    }

    /// Node copies with their current ring positions.
    pub fn nodes(&self) -> Vec<Node> {
        let snapshot = self.ring.snapshot();
        self.monitor
            .nodes()
            .into_iter()
            .map(|mut node| {
                node.ring_position = snapshot.position_of(&node.id);
                node
            })
            .collect()
    }

    pub fn ring(&self) -> Arc<RingSnapshot> {
        self.ring.snapshot()
    }

    pub fn ownership(&self) -> Vec<Ownership> {
        Topology::new(&self.ring.snapshot()).ownership()
    }

    pub fn current_plan(&self) -> Option<&RoutePlan> {
        self.current_plan.as_ref()
    }

    pub fn hash_ring(&self) -> &HashRing {
        &self.ring
    }

    pub fn monitor(&self) -> &FleetHealthMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut FleetHealthMonitor {
        &mut self.monitor
    }
}
