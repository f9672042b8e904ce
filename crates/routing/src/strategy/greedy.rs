//! Greedy next-hop search.

use std::collections::HashSet;

use corelib::{Error, Result};

use crate::algorithm::Algorithm;
use crate::graph::RouteGraph;
use crate::strategy::{PathResult, RouteStrategy, SearchBudget};

/// Repeatedly takes the hop with the lowest leg weight plus straight-line
/// estimate to the destination. Never backtracks, so it can dead-end on a
/// graph where a path exists, and its cost is only an approximation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl RouteStrategy for Greedy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Greedy
    }

    fn is_optimal(&self) -> bool {
        false
    }

    fn find_path(&self, graph: &RouteGraph, budget: &mut SearchBudget) -> Result<PathResult> {
        let (source, sink) = (graph.source()?, graph.sink()?);
        let ranks = graph.id_ranks();

        let mut current = source;
        let mut visited = HashSet::from([source]);
        let mut vertices = vec![source];
        let mut cost = 0;

        while current != sink {
            budget.charge()?;
            let (next, weight) = graph
                .neighbours(current)
                .filter(|(next, _)| !visited.contains(next))
                .min_by_key(|(next, weight)| (weight + graph.heuristic(*next), ranks[next.index()]))
                .ok_or_else(|| {
                    Error::NoPathFound(format!(
                        "greedy search dead-ended at {}",
                        graph.waypoint(current).label
                    ))
                })?;
            visited.insert(next);
            vertices.push(next);
            cost += weight;
            current = next;
        }

        Ok(PathResult { vertices, cost })
    }
}
