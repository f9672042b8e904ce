//! Tests for the route optimizer and its strategies.
//!
//! # Test Strategy
//!
//! 1. **Scenarios**: six-warehouse network, dashboard requests
//! 2. **Failures**: invalid algorithm, empty ring, disconnected graph, timeout
//! 3. **Hand-built graphs**: tie-breaks, A* against Dijkstra
//! 4. **Properties**: optimality against exhaustive enumeration, breakdown
//!    reconciliation

use corelib::{GeoPoint, Node, NodeId, NodeStatus, RingBuilder};
use petgraph::graph::NodeIndex;
use proptest::prelude::*;
use routing::cost::{ArrivalLoad, CostModel, Leg, LegCost};
use routing::strategy::{AStar, Dijkstra, Greedy, RouteStrategy, SearchBudget};
use routing::{Algorithm, Cents, RouteGraph, RouteOptimizer, RouteRequest, RoutingConfig};

fn fleet() -> Vec<Node> {
    [
        ("wh-1", "Seattle DC", 47.6062, -122.3321, 12_000),
        ("wh-2", "Portland DC", 45.5152, -122.6784, 10_500),
        ("wh-3", "San Francisco DC", 37.7749, -122.4194, 14_000),
        ("wh-4", "Los Angeles DC", 34.0522, -118.2437, 13_200),
        ("wh-5", "Phoenix DC", 33.4484, -112.0740, 11_000),
        ("wh-6", "Denver DC", 39.7392, -104.9903, 12_500),
    ]
    .into_iter()
    .map(|(id, name, lat, lng, capacity)| {
        Node::new(id, name, GeoPoint::new(lat, lng), capacity)
            .with_load(capacity / 2)
            .with_resources(40.0, 45.0, 30)
    })
    .collect()
}

fn optimize(request: RouteRequest, nodes: &[Node]) -> corelib::Result<routing::RoutePlan> {
    let ring = RingBuilder::new().add_nodes(nodes.iter().cloned()).build().unwrap();
    RouteOptimizer::default().optimize(&request, &ring.snapshot(), nodes)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_seattle_to_chicago_dijkstra() {
    let plan = optimize(RouteRequest::new("Seattle DC", "Chicago", "dijkstra"), &fleet()).unwrap();

    assert_eq!(plan.path.first().map(String::as_str), Some("Seattle DC"));
    assert_eq!(plan.path.last().map(String::as_str), Some("Chicago"));
    assert!(plan.path.len() >= 2);
    assert!(plan.total_cost > Cents(0));
    assert!(plan.estimated_time > 0);
    assert!(plan.distance > 0.0);
    assert!(plan.optimal);
    assert_eq!(plan.algorithm, Algorithm::ShortestCost);
    assert!(plan.cost_breakdown.reconciles());
    assert_eq!(plan.cost_breakdown.total, plan.total_cost);
}

#[test]
fn test_all_algorithms_reach_destination() {
    for algorithm in ["dijkstra", "ASTAR", "greedy"] {
        let plan = optimize(RouteRequest::new("wh-1", "Miami", algorithm), &fleet()).unwrap();
        assert_eq!(plan.path_ids.first(), Some(&NodeId::from("wh-1")));
        assert_eq!(plan.path.last().map(String::as_str), Some("Miami"));
        assert_eq!(plan.legs.len(), plan.path.len() - 1);
    }
}

#[test]
fn test_astar_matches_dijkstra_cost() {
    let nodes = fleet();
    for city in ["Chicago", "Dallas", "Atlanta", "New York"] {
        let exact = optimize(RouteRequest::new("Seattle DC", city, "dijkstra"), &nodes);
        let guided = optimize(RouteRequest::new("Seattle DC", city, "astar"), &nodes);
        match (exact, guided) {
            (Ok(exact), Ok(guided)) => assert_eq!(exact.total_cost, guided.total_cost, "{city}"),
            (Err(a), Err(b)) => assert_eq!(a.kind(), b.kind()),
            (a, b) => panic!("strategies disagree for {city}: {a:?} vs {b:?}"),
        }
    }
}

#[test]
fn test_greedy_is_labeled_approximate() {
    let plan = optimize(RouteRequest::new("Seattle DC", "Chicago", "greedy"), &fleet()).unwrap();
    assert!(!plan.optimal);
    assert_eq!(plan.cost_breakdown.savings, Cents(0));

    let exact = optimize(RouteRequest::new("Seattle DC", "Chicago", "dijkstra"), &fleet()).unwrap();
    assert!(exact.cost_breakdown.gross() <= plan.cost_breakdown.gross());
}

#[test]
fn test_destination_can_be_a_node() {
    let plan = optimize(RouteRequest::new("wh-1", "Denver DC", "dijkstra"), &fleet()).unwrap();
    assert_eq!(plan.path_ids.last(), Some(&NodeId::from("wh-6")));
}

#[test]
fn test_critical_nodes_are_not_used() {
    let mut nodes = fleet();
    nodes[5].status = NodeStatus::Critical; // Denver
    let plan = optimize(RouteRequest::new("Seattle DC", "Chicago", "dijkstra"), &nodes).unwrap();
    assert!(!plan.path_ids.contains(&NodeId::from("wh-6")));
    // Phoenix is the only remaining warehouse within final-mile reach.
    assert_eq!(plan.path_ids.iter().rev().nth(1), Some(&NodeId::from("wh-5")));
    assert_eq!(plan.hops, plan.legs.len());
}

#[test]
fn test_plans_get_fresh_order_ids() {
    let nodes = fleet();
    let ring = RingBuilder::new().add_nodes(nodes.iter().cloned()).build().unwrap();
    let optimizer = RouteOptimizer::default();
    let request = RouteRequest::new("wh-1", "Chicago", "dijkstra");
    let a = optimizer.optimize(&request, &ring.snapshot(), &nodes).unwrap();
    let b = optimizer.optimize(&request, &ring.snapshot(), &nodes).unwrap();
    assert_ne!(a.order_id, b.order_id);
    assert_eq!(a.path, b.path);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_invalid_algorithm() {
    let err = optimize(RouteRequest::new("Seattle DC", "Chicago", "quantum"), &fleet()).unwrap_err();
    assert_eq!(err, corelib::Error::InvalidAlgorithm("quantum".into()));
}

#[test]
fn test_empty_ring_has_no_path() {
    let ring = RingBuilder::new().build().unwrap();
    let err = RouteOptimizer::default()
        .optimize(&RouteRequest::new("Seattle DC", "Chicago", "dijkstra"), &ring.snapshot(), &[])
        .unwrap_err();
    assert!(matches!(err, corelib::Error::NoPathFound(_)));
}

#[test]
fn test_all_critical_has_no_path() {
    let mut nodes = fleet();
    for node in &mut nodes {
        node.status = NodeStatus::Critical;
    }
    let err = optimize(RouteRequest::new("Seattle DC", "Chicago", "dijkstra"), &nodes).unwrap_err();
    assert!(matches!(err, corelib::Error::NoPathFound(_)));
    assert!(err.is_retryable());
}

#[test]
fn test_unknown_source_and_destination() {
    let err = optimize(RouteRequest::new("Gotham DC", "Chicago", "dijkstra"), &fleet()).unwrap_err();
    assert_eq!(err, corelib::Error::NodeNotFound(NodeId::from("Gotham DC")));

    let err = optimize(RouteRequest::new("Seattle DC", "Atlantis", "dijkstra"), &fleet()).unwrap_err();
    assert!(matches!(err, corelib::Error::NoPathFound(_)));

    let err = optimize(RouteRequest::new("Seattle DC", "wh-1", "dijkstra"), &fleet()).unwrap_err();
    assert!(matches!(err, corelib::Error::NoPathFound(_)));
}

#[test]
fn test_out_of_reach_destination() {
    let config = RoutingConfig {
        graph: routing::GraphConfig {
            max_link_miles: 1100.0,
            max_final_mile_miles: 10.0,
        },
        ..RoutingConfig::default()
    };
    let nodes = fleet();
    let ring = RingBuilder::new().add_nodes(nodes.iter().cloned()).build().unwrap();
    let err = RouteOptimizer::new(config)
        .optimize(&RouteRequest::new("Seattle DC", "Chicago", "astar"), &ring.snapshot(), &nodes)
        .unwrap_err();
    assert!(matches!(err, corelib::Error::NoPathFound(_)));
}

#[test]
fn test_expansion_budget_times_out() {
    let config = RoutingConfig {
        max_expansions: 1,
        ..RoutingConfig::default()
    };
    let nodes = fleet();
    let ring = RingBuilder::new().add_nodes(nodes.iter().cloned()).build().unwrap();
    let err = RouteOptimizer::new(config)
        .optimize(&RouteRequest::new("Seattle DC", "Chicago", "dijkstra"), &ring.snapshot(), &nodes)
        .unwrap_err();
    assert!(matches!(err, corelib::Error::OptimizationTimeout { .. }));
    assert!(err.is_retryable());
}

// ============================================================================
// Hand-built graphs
// ============================================================================

fn leg(miles: f64, base: u64, surcharge: u64) -> Leg {
    Leg {
        miles,
        cost: LegCost {
            base: Cents(base),
            surcharge: Cents(surcharge),
            handling: Cents(0),
        },
        minutes: 10,
    }
}

/// Diamond with two equal-cost routes: s -> b -> t and s -> a -> t.
fn diamond() -> (RouteGraph, [NodeIndex; 4]) {
    let model = CostModel {
        rate_cents_per_mile: 1,
        ..CostModel::default()
    };
    let mut graph = RouteGraph::new(model);
    let here = GeoPoint::new(40.0, -100.0);
    let s = graph.add_waypoint("s", "S", here);
    let b = graph.add_waypoint("b", "B", here);
    let a = graph.add_waypoint("a", "A", here);
    let t = graph.add_waypoint("t", "T", here);
    graph.add_leg(s, b, leg(0.0, 5, 0));
    graph.add_leg(b, t, leg(0.0, 5, 0));
    graph.add_leg(s, a, leg(0.0, 4, 1));
    graph.add_leg(a, t, leg(0.0, 5, 0));
    graph.set_endpoints(s, t);
    (graph, [s, a, b, t])
}

#[test]
fn test_tie_break_prefers_smaller_ids() {
    let (graph, [s, a, _, t]) = diamond();
    let found = Dijkstra.find_path(&graph, &mut SearchBudget::unlimited()).unwrap();
    assert_eq!(found.cost, 10);
    assert_eq!(found.vertices, vec![s, a, t]);
}

#[test]
fn test_tie_break_prefers_fewer_hops() {
    let (mut graph, [s, _, _, t]) = diamond();
    graph.add_leg(s, t, leg(0.0, 10, 0));
    let found = Dijkstra.find_path(&graph, &mut SearchBudget::unlimited()).unwrap();
    assert_eq!(found.cost, 10);
    assert_eq!(found.vertices, vec![s, t]);
}

#[test]
fn test_astar_equals_dijkstra_on_geographic_graph() {
    let model = CostModel::default();
    let mut graph = RouteGraph::new(model);
    let seattle = graph.add_waypoint("wh-1", "Seattle", GeoPoint::new(47.6062, -122.3321));
    let boise = graph.add_waypoint("wh-7", "Boise", GeoPoint::new(43.6150, -116.2023));
    let slc = graph.add_waypoint("wh-8", "Salt Lake City", GeoPoint::new(40.7608, -111.8910));
    let denver = graph.add_waypoint("wh-6", "Denver", GeoPoint::new(39.7392, -104.9903));
    let omaha = graph.add_waypoint("wh-9", "Omaha", GeoPoint::new(41.2565, -95.9345));
    let chicago = graph.add_waypoint("dest:chicago", "Chicago", GeoPoint::new(41.8781, -87.6298));

    let busy = Some(ArrivalLoad {
        utilization: 90,
        active_orders: 120,
    });
    let quiet = Some(ArrivalLoad {
        utilization: 20,
        active_orders: 5,
    });
    graph.connect(seattle, boise, quiet);
    graph.connect(seattle, denver, busy);
    graph.connect(boise, slc, quiet);
    graph.connect(slc, denver, quiet);
    graph.connect(slc, omaha, busy);
    graph.connect(denver, omaha, quiet);
    graph.connect(denver, chicago, None);
    graph.connect(omaha, chicago, None);
    graph.set_endpoints(seattle, chicago);

    let exact = Dijkstra.find_path(&graph, &mut SearchBudget::unlimited()).unwrap();
    let mut guided_budget = SearchBudget::unlimited();
    let guided = AStar.find_path(&graph, &mut guided_budget).unwrap();
    assert_eq!(exact.cost, guided.cost);
    assert_eq!(exact.vertices, guided.vertices);

    let greedy = Greedy.find_path(&graph, &mut SearchBudget::unlimited()).unwrap();
    assert!(greedy.cost >= exact.cost);
    assert_eq!(greedy.vertices.last(), Some(&chicago));
}

#[test]
fn test_greedy_dead_end() {
    let model = CostModel::default();
    let mut graph = RouteGraph::new(model);
    let s = graph.add_waypoint("s", "S", GeoPoint::new(40.0, -100.0));
    let trap = graph.add_waypoint("a", "Trap", GeoPoint::new(40.0, -95.0));
    let via = graph.add_waypoint("b", "Via", GeoPoint::new(45.0, -100.0));
    let t = graph.add_waypoint("t", "T", GeoPoint::new(40.0, -90.0));
    graph.connect(s, trap, None);
    graph.connect(s, via, None);
    graph.connect(via, t, None);
    graph.set_endpoints(s, t);

    // The trap looks best locally but leads nowhere.
    let err = Greedy.find_path(&graph, &mut SearchBudget::unlimited()).unwrap_err();
    assert!(matches!(err, corelib::Error::NoPathFound(_)));
    assert!(Dijkstra.find_path(&graph, &mut SearchBudget::unlimited()).is_ok());
}

// ============================================================================
// Properties
// ============================================================================

/// Minimum weight over all simple paths, by exhaustive DFS.
fn brute_force(graph: &RouteGraph, at: NodeIndex, sink: NodeIndex, seen: &mut Vec<NodeIndex>) -> Option<u64> {
    if at == sink {
        return Some(0);
    }
    let mut best = None;
    for (next, weight) in graph.neighbours(at).collect::<Vec<_>>() {
        if seen.contains(&next) {
            continue;
        }
        seen.push(next);
        if let Some(rest) = brute_force(graph, next, sink, seen) {
            best = Some(best.map_or(weight + rest, |b: u64| b.min(weight + rest)));
        }
        seen.pop();
    }
    best
}

fn random_graph(points: &[(f64, f64, u8, u32)], edges: &[(usize, usize)]) -> RouteGraph {
    let mut graph = RouteGraph::new(CostModel::default());
    let idx: Vec<NodeIndex> = points
        .iter()
        .enumerate()
        .map(|(i, (lat, lng, _, _))| graph.add_waypoint(format!("n-{i:02}"), format!("N{i}"), GeoPoint::new(*lat, *lng)))
        .collect();
    for &(from, to) in edges {
        let (from, to) = (from % points.len(), to % points.len());
        if from != to {
            let (_, _, utilization, active_orders) = points[to];
            graph.connect(idx[from], idx[to], Some(ArrivalLoad { utilization, active_orders }));
        }
    }
    graph.set_endpoints(idx[0], idx[points.len() - 1]);
    graph
}

fn point() -> impl Strategy<Value = (f64, f64, u8, u32)> {
    (25.0f64..49.0, -124.0f64..-70.0, 0u8..=100, 0u32..200)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_exact_strategies_are_optimal(
        points in proptest::collection::vec(point(), 2..7),
        edges in proptest::collection::vec((0usize..7, 0usize..7), 0..20),
    ) {
        let graph = random_graph(&points, &edges);
        let (source, sink) = (graph.source().unwrap(), graph.sink().unwrap());
        let expected = brute_force(&graph, source, sink, &mut vec![source]);

        let exact = Dijkstra.find_path(&graph, &mut SearchBudget::unlimited());
        let guided = AStar.find_path(&graph, &mut SearchBudget::unlimited());
        match expected {
            Some(cost) => {
                prop_assert_eq!(exact.unwrap().cost, cost);
                prop_assert_eq!(guided.unwrap().cost, cost);
                if let Ok(greedy) = Greedy.find_path(&graph, &mut SearchBudget::unlimited()) {
                    prop_assert!(greedy.cost >= cost);
                }
            }
            None => {
                prop_assert!(exact.is_err());
                prop_assert!(guided.is_err());
            }
        }
    }

    #[test]
    fn prop_breakdown_reconciles(
        loads in proptest::collection::vec((0u32..=100, 0u32..300), 6),
        algorithm in prop_oneof![Just("dijkstra"), Just("astar"), Just("greedy")],
        city in prop_oneof![Just("Chicago"), Just("Dallas"), Just("Atlanta"), Just("Miami")],
    ) {
        let mut nodes = fleet();
        for (node, (utilization, orders)) in nodes.iter_mut().zip(loads) {
            let capacity = node.capacity;
            node.set_load(capacity / 100 * utilization.min(89));
            node.active_orders = orders;
        }
        if let Ok(plan) = optimize(RouteRequest::new("Seattle DC", city, algorithm), &nodes) {
            prop_assert!(plan.cost_breakdown.reconciles());
            prop_assert_eq!(plan.cost_breakdown.total, plan.total_cost);
            let legs: u64 = plan.legs.iter().map(|l| l.cost.0).sum();
            prop_assert_eq!(legs, plan.cost_breakdown.gross().0);
            prop_assert!(plan.total_cost > Cents(0));
        }
    }
}
