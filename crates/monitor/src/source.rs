//! Metric sources.
//!
//! The monitor does not care where measurements come from. A live deployment
//! plugs in a collector; the engine defaults to a seeded random walk, and
//! tests replay scripted samples.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;

use corelib::{Node, NodeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// Supplies the next measurement for a node, or `None` when there is none
/// this tick.
pub trait MetricsSource: Send + Debug {
    fn sample(&mut self, node: &Node) -> Option<Sample>;
}

/// Per-tick step sizes of the random walk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RandomWalkConfig {
    /// Maximum cpu/ram change in percentage points.
    pub load_step: f64,
    pub order_step: u32,
    /// Maximum stored-load change, per mille of capacity.
    pub stock_step_per_mille: u32,
}

impl Default for RandomWalkConfig {
    fn default() -> Self {
        Self {
            load_step: 5.0,
            order_step: 2,
            stock_step_per_mille: 20,
        }
    }
}

/// Bounded random deltas from a seeded generator.
#[derive(Debug)]
pub struct RandomWalkSource {
    rng: StdRng,
    config: RandomWalkConfig,
}

impl RandomWalkSource {
    pub fn new(seed: u64, config: RandomWalkConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }
}

impl MetricsSource for RandomWalkSource {
    fn sample(&mut self, node: &Node) -> Option<Sample> {
        let step = self.config.load_step.abs();
        let orders = i64::from(self.config.order_step);
        let stock = i64::from(node.capacity) * i64::from(self.config.stock_step_per_mille) / 1000;
        Some(Sample::Delta {
            cpu_load: self.rng.gen_range(-step..=step),
            ram_load: self.rng.gen_range(-step..=step),
            active_orders: self.rng.gen_range(-orders..=orders),
            load: self.rng.gen_range(-stock..=stock),
        })
    }
}

/// Replays queued samples per node, then goes quiet.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    queues: HashMap<NodeId, VecDeque<Sample>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: impl Into<NodeId>, sample: Sample) {
        self.queues.entry(id.into()).or_default().push_back(sample);
    }

    pub fn with(mut self, id: impl Into<NodeId>, sample: Sample) -> Self {
        self.push(id, sample);
        self
    }

    pub fn pending(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}

impl MetricsSource for ScriptedSource {
    fn sample(&mut self, node: &Node) -> Option<Sample> {
        self.queues.get_mut(&node.id)?.pop_front()
    }
}
