//! Route search strategies.
//!
//! Every algorithm implements the same trait, so the optimizer can dispatch on
//! the `Algorithm` tag without knowing how the search works:
//!
//! - **Dijkstra**: minimum cost, priority frontier ordered by cost so far
//! - **AStar**: minimum cost, frontier ordered by cost so far plus an
//!   admissible straight-line estimate
//! - **Greedy**: locally cheapest hop, fast, no optimality guarantee

pub mod astar;
pub mod dijkstra;
pub mod greedy;
mod search;

use std::time::{Duration, Instant};

use corelib::{Error, Result};
use petgraph::graph::NodeIndex;

use crate::algorithm::Algorithm;
use crate::graph::RouteGraph;

pub use astar::AStar;
pub use dijkstra::Dijkstra;
pub use greedy::Greedy;

/// A path through the route graph with its summed edge weight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResult {
    pub vertices: Vec<NodeIndex>,
    pub cost: u64,
}

/// Trait for route search strategies.
///
/// # Thread Safety
///
/// Strategies are stateless and shared as `&'static dyn RouteStrategy`.
pub trait RouteStrategy: Send + Sync + 'static {
    fn algorithm(&self) -> Algorithm;

    /// Whether the returned path is guaranteed to be minimum-cost.
    fn is_optimal(&self) -> bool;

    /// Find a path from the graph's source to its sink.
    ///
    /// Ties on cost go to fewer hops, then to the lexicographically smallest
    /// sequence of vertex ids.
    fn find_path(&self, graph: &RouteGraph, budget: &mut SearchBudget) -> Result<PathResult>;
}

/// Time and work limits for one search.
#[derive(Debug)]
pub struct SearchBudget {
    started: Instant,
    timeout: Option<Duration>,
    max_expansions: usize,
    expansions: usize,
}

impl SearchBudget {
    pub fn new(timeout: Option<Duration>, max_expansions: usize) -> Self {
        Self {
            started: Instant::now(),
            timeout,
            max_expansions,
            expansions: 0,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None, usize::MAX)
    }

    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// Account for one frontier expansion.
    pub fn charge(&mut self) -> Result<()> {
        self.expansions += 1;
        let elapsed = self.started.elapsed();
        let over_time = self.timeout.is_some_and(|limit| elapsed > limit);
        if over_time || self.expansions > self.max_expansions {
            return Err(Error::OptimizationTimeout {
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }
        Ok(())
    }
}
