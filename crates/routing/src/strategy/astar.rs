//! Heuristic-guided search.

use corelib::Result;

use crate::algorithm::Algorithm;
use crate::graph::RouteGraph;
use crate::strategy::search::best_first;
use crate::strategy::{PathResult, RouteStrategy, SearchBudget};

/// A* with the straight-line cost lower bound as heuristic.
///
/// The estimate must never exceed the true remaining cost; `RouteGraph`
/// guarantees this because every leg costs at least its distance at the base
/// rate. Given that, A* returns the same cost as Dijkstra while expanding
/// fewer vertices.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStar;

impl RouteStrategy for AStar {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Heuristic
    }

    fn is_optimal(&self) -> bool {
        true
    }

    fn find_path(&self, graph: &RouteGraph, budget: &mut SearchBudget) -> Result<PathResult> {
        best_first(graph, |idx| graph.heuristic(idx), budget)
    }
}
