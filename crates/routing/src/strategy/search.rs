//! Shared best-first search for the exact strategies.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use corelib::{Error, Result};
use petgraph::graph::NodeIndex;

use crate::graph::RouteGraph;
use crate::strategy::{PathResult, SearchBudget};

/// Ordering key of a partial path: cost, hop count, id ranks.
type Key = (u64, usize, Vec<u32>);

#[derive(Debug, PartialEq, Eq)]
struct Label {
    /// Cost so far plus heuristic.
    priority: u64,
    cost: u64,
    ranks: Vec<u32>,
    path: Vec<NodeIndex>,
}

impl Label {
    fn key(&self) -> Key {
        (self.cost, self.path.len(), self.ranks.clone())
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on (priority, hops, ranks)
        (other.priority, other.path.len(), &other.ranks).cmp(&(self.priority, self.path.len(), &self.ranks))
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search from source to sink with `heuristic` added to the
/// frontier priority. A zero heuristic gives Dijkstra.
///
/// Labels can be reopened when a better one arrives, so an admissible (not
/// necessarily consistent) heuristic still yields a minimum-cost path.
pub(crate) fn best_first<H>(graph: &RouteGraph, heuristic: H, budget: &mut SearchBudget) -> Result<PathResult>
where
    H: Fn(NodeIndex) -> u64,
{
    let (source, sink) = (graph.source()?, graph.sink()?);
    let ranks = graph.id_ranks();

    let mut best: HashMap<NodeIndex, Key> = HashMap::new();
    let mut frontier = BinaryHeap::new();
    let start = Label {
        priority: heuristic(source),
        cost: 0,
        ranks: vec![ranks[source.index()]],
        path: vec![source],
    };
    best.insert(source, start.key());
    frontier.push(start);

    while let Some(label) = frontier.pop() {
        budget.charge()?;
        let at = *label.path.last().unwrap_or(&source);
        if best.get(&at).is_some_and(|known| *known < label.key()) {
            continue;
        }
        if at == sink {
            return Ok(PathResult {
                vertices: label.path,
                cost: label.cost,
            });
        }

        for (next, weight) in graph.neighbours(at) {
            if label.path.contains(&next) {
                continue;
            }
            let mut path = label.path.clone();
            path.push(next);
            let mut id_ranks = label.ranks.clone();
            id_ranks.push(ranks[next.index()]);
            let candidate = Label {
                priority: label.cost + weight + heuristic(next),
                cost: label.cost + weight,
                ranks: id_ranks,
                path,
            };
            let key = candidate.key();
            if best.get(&next).map_or(true, |known| key < *known) {
                best.insert(next, key);
                frontier.push(candidate);
            }
        }
    }

    Err(Error::NoPathFound(format!(
        "{} is unreachable from {}",
        graph.waypoint(sink).label,
        graph.waypoint(source).label
    )))
}
