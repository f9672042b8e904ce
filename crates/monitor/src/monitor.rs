//! Fleet health monitor.
//!
//! # Tick
//!
//! 1. Ask the metrics source for one sample per node, in id order
//! 2. Apply it to a copy of the node; on error log, record and skip the node
//! 3. Reclassify the status from the new utilization
//! 4. Collect transitions into a `RebalanceTrigger` for the ring
//!
//! The monitor is the single writer of node metrics. Ring positions are not
//! tracked here; the engine stamps them onto node copies from a snapshot.

use std::collections::BTreeMap;

use corelib::{Error, HashRing, Node, NodeId, NodeStatus, RebalanceTrigger, Result, TriggerReason};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::report::{RebalanceAck, StatusTransition, TickReport};
use crate::sample::Sample;
use crate::source::{MetricsSource, RandomWalkConfig, RandomWalkSource};
use crate::thresholds::HealthThresholds;

/// Monitor configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
    pub thresholds: HealthThresholds,
    pub random_walk: RandomWalkConfig,
    /// Share of the fleet degraded by a simulated rebalance, rounded up.
    pub degrade_fraction: f64,
    pub seed: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: HealthThresholds::default(),
            random_walk: RandomWalkConfig::default(),
            degrade_fraction: 0.2,
            seed: 42,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if !(0.0..=1.0).contains(&self.degrade_fraction) {
            return Err(Error::Config(format!(
                "degrade_fraction must be within [0, 1], got {}",
                self.degrade_fraction
            )));
        }
        if !self.random_walk.load_step.is_finite() || self.random_walk.load_step < 0.0 {
            return Err(Error::Config("random walk load step must be non-negative".into()));
        }
        Ok(())
    }
}

/// Owns live node metrics and derives health status from them.
#[derive(Debug)]
pub struct FleetHealthMonitor {
    config: MonitorConfig,
    nodes: BTreeMap<NodeId, Node>,
    source: Box<dyn MetricsSource>,
    rng: StdRng,
    ticks: u64,
}

impl FleetHealthMonitor {
    /// Monitor fed by a random walk seeded from `config.seed`.
    pub fn new(config: MonitorConfig) -> Self {
        let source = RandomWalkSource::new(config.seed, config.random_walk.clone());
        Self::with_source(config, Box::new(source))
    }

    pub fn with_source(config: MonitorConfig, source: Box<dyn MetricsSource>) -> Self {
        let rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
        Self {
            config,
            nodes: BTreeMap::new(),
            source,
            rng,
            ticks: 0,
        }
    }

    pub fn set_source(&mut self, source: Box<dyn MetricsSource>) {
        self.source = source;
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Start tracking a node. Its status is derived from its utilization.
    pub fn add_node(&mut self, mut node: Node) -> Result<()> {
        node.validate()?;
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateNode(node.id));
        }
        node.set_load(node.load);
        node.status = self.config.thresholds.classify(node.utilization);
        debug!(node = %node.id, status = %node.status, "node tracked");
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node> {
        self.nodes
            .remove(id)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Copies of every node, ordered by id.
    pub fn nodes(&self) -> Vec<Node> {
        self.nodes.values().cloned().collect()
    }

    pub fn statuses(&self) -> BTreeMap<NodeId, NodeStatus> {
        self.nodes
            .iter()
            .map(|(id, node)| (id.clone(), node.status))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance every node by one sample from the metrics source.
    ///
    /// With no nodes this is a no-op and the tick counter does not move.
    pub fn tick(&mut self) -> TickReport {
        if self.nodes.is_empty() {
            return TickReport {
                tick: self.ticks,
                ..TickReport::default()
            };
        }
        self.ticks += 1;

        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };
        let ids: Vec<NodeId> = self.nodes.keys().cloned().collect();
        for id in ids {
            let sample = match self.nodes.get(&id) {
                Some(node) => self.source.sample(node),
                None => None,
            };
            let Some(sample) = sample else {
                continue;
            };
            match self.apply(&id, &sample) {
                Ok(transition) => {
                    report.updated += 1;
                    report.transitions.extend(transition);
                }
                Err(err) => {
                    warn!(node = %id, error = %err, tick = self.ticks, "metric sample rejected");
                    report.errors.push(err);
                }
            }
        }

        if !report.transitions.is_empty() {
            let trigger = report
                .transitions
                .iter()
                .fold(RebalanceTrigger::new(TriggerReason::StatusChange), |t, tr| {
                    t.with_status(tr.node_id.clone(), tr.to)
                });
            report.trigger = Some(trigger);
        }
        debug!(
            tick = report.tick,
            updated = report.updated,
            transitions = report.transitions.len(),
            failures = report.errors.len(),
            "fleet tick"
        );
        report
    }

    /// Ingest one measurement outside the tick cadence.
    pub fn record(&mut self, id: &NodeId, sample: &Sample) -> Result<Option<StatusTransition>> {
        self.apply(id, sample)
    }

    fn apply(&mut self, id: &NodeId, sample: &Sample) -> Result<Option<StatusTransition>> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        let mut next = sample.apply(node)?;
        next.status = self.config.thresholds.classify(next.utilization);

        let transition = (next.status != node.status).then(|| StatusTransition {
            node_id: id.clone(),
            from: node.status,
            to: next.status,
            utilization: next.utilization,
        });
        if let Some(t) = &transition {
            info!(node = %id, from = %t.from, to = %t.to, utilization = t.utilization, "node status changed");
        }
        *node = next;
        Ok(transition)
    }

    /// Force a status reshuffle and rebalance `ring` with the result.
    ///
    /// `ceil(n * degrade_fraction)` random nodes are pushed into the warning
    /// or critical band; previously degraded nodes outside that set are
    /// relieved to a healthy band. Nodes unknown to the ring show up as
    /// per-node errors in the report.
    pub fn simulate_rebalance_trigger(&mut self, ring: &HashRing) -> Result<RebalanceAck> {
        let thresholds = self.config.thresholds;
        let ids: Vec<NodeId> = self.nodes.keys().cloned().collect();
        let count = ((ids.len() as f64) * self.config.degrade_fraction).ceil() as usize;
        let mut chosen: Vec<NodeId> = ids
            .choose_multiple(&mut self.rng, count.min(ids.len()))
            .cloned()
            .collect();
        chosen.sort();

        let mut degraded = Vec::new();
        let mut relieved = Vec::new();
        for (id, node) in self.nodes.iter_mut() {
            let target = if chosen.contains(id) {
                degraded.push(id.clone());
                self.rng.gen_range(thresholds.warning..=100)
            } else if node.status.is_degraded() {
                relieved.push(id.clone());
                self.rng.gen_range(30.min(thresholds.warning.saturating_sub(1))..thresholds.warning.max(1))
            } else {
                continue;
            };
            // Round up into the degraded band, down into the healthy one.
            let capacity = u64::from(node.capacity);
            let load = if target >= thresholds.warning {
                (capacity * u64::from(target)).div_ceil(100)
            } else {
                capacity * u64::from(target) / 100
            };
            node.set_load(load as u32);
            node.cpu_load = self.rng.gen_range(20.0..80.0);
            node.ram_load = self.rng.gen_range(25.0..80.0);
            node.status = thresholds.classify(node.utilization);
        }

        let trigger = RebalanceTrigger {
            reason: TriggerReason::Manual,
            statuses: self.statuses(),
        };
        let report = ring.rebalance(&trigger)?;
        info!(
            version = report.version,
            degraded = degraded.len(),
            relieved = relieved.len(),
            moved = report.moved.len(),
            "simulated rebalance applied"
        );
        Ok(RebalanceAck {
            ring_version: report.version,
            degraded,
            relieved,
            report,
        })
    }
}
