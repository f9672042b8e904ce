//! Shortest-cost search.

use corelib::Result;

use crate::algorithm::Algorithm;
use crate::graph::RouteGraph;
use crate::strategy::search::best_first;
use crate::strategy::{PathResult, RouteStrategy, SearchBudget};

/// Dijkstra over non-negative leg weights.
///
/// Deterministic: the frontier is ordered by (cost, hops, id sequence), so
/// equal-cost paths always resolve the same way.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dijkstra;

impl RouteStrategy for Dijkstra {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ShortestCost
    }

    fn is_optimal(&self) -> bool {
        true
    }

    fn find_path(&self, graph: &RouteGraph, budget: &mut SearchBudget) -> Result<PathResult> {
        best_first(graph, |_| 0, budget)
    }
}
