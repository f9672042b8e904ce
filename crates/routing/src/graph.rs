//! Route graph construction.
//!
//! Vertices are the warehouses currently on the ring (minus critical ones,
//! which neither ship nor relay) plus a destination sink. Warehouse legs join
//! ring neighbours and any pair within `max_link_miles`; final-mile legs join
//! warehouses within `max_final_mile_miles` of an external destination.

use std::collections::HashMap;

use corelib::{Error, GeoPoint, Node, NodeId, NodeStatus, Result, RingSnapshot};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::cost::{ArrivalLoad, CostModel, Leg};
use crate::destination::Destination;

/// Topology parameters for graph construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
    pub max_link_miles: f64,
    pub max_final_mile_miles: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_link_miles: 1100.0,
            max_final_mile_miles: 1500.0,
        }
    }
}

/// A vertex of the route graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    /// Node id, or `dest:<city>` for an external sink.
    pub id: NodeId,
    /// Display label used in plan paths.
    pub label: String,
    pub location: GeoPoint,
}

/// Weighted directed graph with a fixed source and sink.
#[derive(Clone, Debug)]
pub struct RouteGraph {
    graph: DiGraph<Waypoint, Leg>,
    model: CostModel,
    source: Option<NodeIndex>,
    sink: Option<NodeIndex>,
}

impl RouteGraph {
    /// Empty graph priced with `model`; populate with `add_waypoint`/`add_leg`.
    pub fn new(model: CostModel) -> Self {
        Self {
            graph: DiGraph::new(),
            model,
            source: None,
            sink: None,
        }
    }

    pub fn add_waypoint(&mut self, id: impl Into<NodeId>, label: impl Into<String>, location: GeoPoint) -> NodeIndex {
        self.graph.add_node(Waypoint {
            id: id.into(),
            label: label.into(),
            location,
        })
    }

    /// Add a leg priced by the cost model.
    pub fn connect(&mut self, from: NodeIndex, to: NodeIndex, arrival: Option<ArrivalLoad>) {
        let leg = self
            .model
            .leg(&self.graph[from].location, &self.graph[to].location, arrival);
        self.add_leg(from, to, leg);
    }

    pub fn add_leg(&mut self, from: NodeIndex, to: NodeIndex, leg: Leg) {
        self.graph.update_edge(from, to, leg);
    }

    pub fn set_endpoints(&mut self, source: NodeIndex, sink: NodeIndex) {
        self.source = Some(source);
        self.sink = Some(sink);
    }

    /// Build the graph for one request from a ring snapshot and node metrics.
    pub fn build(
        snapshot: &RingSnapshot,
        nodes: &[Node],
        source: &NodeId,
        destination: &Destination,
        model: &CostModel,
        config: &GraphConfig,
    ) -> Result<Self> {
        let by_id: HashMap<&NodeId, &Node> = nodes.iter().map(|n| (&n.id, n)).collect();
        let mut graph = RouteGraph::new(model.clone());

        // Ring order, skipping nodes without metrics and critical nodes.
        let members: Vec<&Node> = snapshot
            .node_ids()
            .filter_map(|id| by_id.get(id).copied())
            .filter(|n| n.status != NodeStatus::Critical)
            .collect();
        if members.is_empty() {
            return Err(Error::NoPathFound("no healthy warehouses on the ring".into()));
        }

        let mut index = HashMap::with_capacity(members.len() + 1);
        for node in &members {
            let idx = graph.add_waypoint(node.id.clone(), node.name.clone(), node.location);
            index.insert(node.id.clone(), idx);
        }

        let source_idx = *index.get(source).ok_or_else(|| {
            Error::NoPathFound(format!("source {source} is critical or off the ring"))
        })?;

        let n = members.len();
        for (i, from) in members.iter().enumerate() {
            for (j, to) in members.iter().enumerate() {
                if i == j {
                    continue;
                }
                let ring_neighbour = j == (i + 1) % n || i == (j + 1) % n;
                let within_link = from.location.distance_miles(&to.location) <= config.max_link_miles;
                if ring_neighbour || within_link {
                    graph.connect(index[&from.id], index[&to.id], Some(ArrivalLoad::from(*to)));
                }
            }
        }

        let sink_idx = match destination {
            Destination::Node(id) => *index.get(id).ok_or_else(|| {
                Error::NoPathFound(format!("destination {id} is critical or off the ring"))
            })?,
            Destination::City { name, location } => {
                let sink = graph.add_waypoint(format!("dest:{}", name.to_lowercase()), name.clone(), *location);
                for node in &members {
                    if node.location.distance_miles(location) <= config.max_final_mile_miles {
                        graph.connect(index[&node.id], sink, None);
                    }
                }
                sink
            }
        };

        if source_idx == sink_idx {
            return Err(Error::NoPathFound("source and destination are the same".into()));
        }
        graph.set_endpoints(source_idx, sink_idx);
        Ok(graph)
    }

    pub fn source(&self) -> Result<NodeIndex> {
        self.source
            .ok_or_else(|| Error::NoPathFound("route graph has no source".into()))
    }

    pub fn sink(&self) -> Result<NodeIndex> {
        self.sink
            .ok_or_else(|| Error::NoPathFound("route graph has no destination".into()))
    }

    pub fn waypoint(&self, idx: NodeIndex) -> &Waypoint {
        &self.graph[idx]
    }

    pub fn leg(&self, from: NodeIndex, to: NodeIndex) -> Option<&Leg> {
        self.graph.find_edge(from, to).map(|e| &self.graph[e])
    }

    pub fn legs_from(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeReference<'_, Leg>> {
        self.graph.edges_directed(idx, Direction::Outgoing)
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn leg_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn model(&self) -> &CostModel {
        &self.model
    }

    /// Admissible, consistent estimate of the cost from `idx` to the sink.
    pub fn heuristic(&self, idx: NodeIndex) -> u64 {
        match self.sink {
            Some(sink) => {
                let miles = self.graph[idx].location.distance_miles(&self.graph[sink].location);
                self.model.lower_bound(miles)
            }
            None => 0,
        }
    }

    /// Rank of every vertex id in lexicographic order, indexed by vertex.
    ///
    /// Comparing rank sequences equals comparing id sequences, which is the
    /// final tie-break between equal-cost paths.
    pub fn id_ranks(&self) -> Vec<u32> {
        let mut order: Vec<NodeIndex> = self.graph.node_indices().collect();
        order.sort_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));
        let mut ranks = vec![0; order.len()];
        for (rank, idx) in order.into_iter().enumerate() {
            ranks[idx.index()] = rank as u32;
        }
        ranks
    }

    /// Outgoing legs as `(target, weight)`.
    pub fn neighbours(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, u64)> + '_ {
        self.legs_from(idx)
            .map(|edge| (edge.target(), edge.weight().cost.weight()))
    }
}
