//! Tests for the warehouse hash ring.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: Empty ring, add/locate, remove
//! 2. **Multiple nodes**: Distribution, consistency
//! 3. **Placement**: Salted rehash on collision, `DuplicatePosition`
//! 4. **Rebalance**: Degraded nodes shed ranges, positions stay unique
//! 5. **Properties**: proptest over random rings and keys

use std::collections::HashSet;
use std::sync::Arc;

use corelib::node::{GeoPoint, Node, NodeId, NodeStatus};
use corelib::partitioner::{DegreePartitioner, Partitioner};
use corelib::ring::{HashRing, RebalanceTrigger, RingBuilder, TriggerReason};
use corelib::token::Token;
use corelib::topology::Topology;
use corelib::Error;
use proptest::prelude::*;

fn warehouse(id: &str) -> Node {
    Node::new(id, format!("{id} DC"), GeoPoint::new(40.0, -100.0), 10_000)
}

fn six_node_ring() -> HashRing {
    RingBuilder::new()
        .add_nodes((1..=6).map(|i| warehouse(&format!("wh-{i}"))))
        .build()
        .unwrap()
}

/// Every key hashes to the same token.
#[derive(Debug)]
struct ConstantPartitioner;

impl Partitioner for ConstantPartitioner {
    fn partition(&self, _key: &[u8]) -> Token {
        Token(7)
    }

    fn space(&self) -> u128 {
        360
    }

    fn name(&self) -> &'static str {
        "ConstantPartitioner"
    }
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_locate() {
    let ring = HashRing::new();
    assert!(matches!(ring.locate(b"key1"), Err(Error::NodeNotFound(_))));
    assert_eq!(ring.node_count(), 0);
    assert!(ring.snapshot().is_empty());
}

#[test]
fn test_add_node_and_locate() {
    let ring = HashRing::new();
    let position = ring.add_node(&warehouse("wh-1")).unwrap();

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.position_of(&NodeId::from("wh-1")), Some(position));
    assert_eq!(ring.locate(b"test-key").unwrap(), NodeId::from("wh-1"));
}

#[test]
fn test_remove_node() {
    let ring = HashRing::new();
    ring.add_node(&warehouse("wh-1")).unwrap();
    ring.add_node(&warehouse("wh-2")).unwrap();

    let removed = ring.remove_node(&NodeId::from("wh-1")).unwrap();
    assert_eq!(removed.node_id, NodeId::from("wh-1"));
    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.locate(b"some-key").unwrap(), NodeId::from("wh-2"));

    // Removing a missing node is an error, not a no-op
    assert_eq!(
        ring.remove_node(&NodeId::from("wh-999")).unwrap_err(),
        Error::NodeNotFound(NodeId::from("wh-999"))
    );
}

#[test]
fn test_add_same_node_twice_fails() {
    let ring = HashRing::new();
    ring.add_node(&warehouse("wh-1")).unwrap();
    assert!(matches!(
        ring.add_node(&warehouse("wh-1")),
        Err(Error::DuplicateNode(_))
    ));
    assert_eq!(ring.node_count(), 1);
}

#[test]
fn test_versions_advance_on_mutation() {
    let ring = HashRing::new();
    assert_eq!(ring.version(), 0);
    ring.add_node(&warehouse("wh-1")).unwrap();
    ring.add_node(&warehouse("wh-2")).unwrap();
    ring.remove_node(&NodeId::from("wh-1")).unwrap();
    assert_eq!(ring.version(), 3);
}

// ============================================================================
// Multiple Nodes Tests
// ============================================================================

#[test]
fn test_multiple_nodes() {
    let ring = six_node_ring();
    let ids: HashSet<NodeId> = (1..=6).map(|i| NodeId(format!("wh-{i}"))).collect();

    let mut owners = HashSet::new();
    for i in 0..500 {
        let owner = ring.locate(format!("ord-{i}").as_bytes()).unwrap();
        assert!(ids.contains(&owner), "key mapped to unknown node {owner}");
        owners.insert(owner);
    }
    // 500 keys over 6 nodes should touch more than one of them
    assert!(owners.len() > 1);
}

#[test]
fn test_consistent_locate() {
    let ring = six_node_ring();
    let first = ring.locate(b"consistent-key").unwrap();
    for _ in 0..10 {
        assert_eq!(ring.locate(b"consistent-key").unwrap(), first);
    }
}

#[test]
fn test_snapshot_is_sorted_by_position() {
    let ring = six_node_ring();
    let snapshot = ring.snapshot();
    assert!(snapshot.entries.windows(2).all(|w| w[0].position < w[1].position));
}

#[test]
fn test_snapshot_is_frozen() {
    let ring = six_node_ring();
    let before = ring.snapshot();
    ring.remove_node(&NodeId::from("wh-1")).unwrap();
    assert_eq!(before.len(), 6);
    assert_eq!(ring.snapshot().len(), 5);
}

// ============================================================================
// Placement Tests
// ============================================================================

#[test]
fn test_degree_ring_resolves_collisions() {
    let ring = HashRing::with_partitioner(Arc::new(DegreePartitioner));
    // 60 nodes on a 360-slot circle collide often; salting must place all.
    for i in 0..60 {
        ring.add_node(&warehouse(&format!("wh-{i}"))).unwrap();
    }
    let snapshot = ring.snapshot();
    let positions: HashSet<Token> = snapshot.entries.iter().map(|e| e.position).collect();
    assert_eq!(positions.len(), 60);
    assert!(snapshot.entries.iter().all(|e| e.position.0 < 360));
}

#[test]
fn test_exhausted_rehash_is_duplicate_position() {
    let ring = HashRing::with_partitioner(Arc::new(ConstantPartitioner));
    ring.add_node(&warehouse("wh-1")).unwrap();

    let err = ring.add_node(&warehouse("wh-2")).unwrap_err();
    assert!(matches!(err, Error::DuplicatePosition { ref node, .. } if node.as_str() == "wh-2"));
    // The failed node was not half-added
    assert_eq!(ring.node_count(), 1);
}

#[test]
fn test_partitioner_name() {
    let ring = HashRing::new();
    assert_eq!(ring.partitioner_name(), "SipHashPartitioner");
}

// ============================================================================
// Rebalance Tests
// ============================================================================

#[test]
fn test_critical_node_moves_and_does_not_collide() {
    let ring = six_node_ring();
    let wh3 = NodeId::from("wh-3");
    let before = ring.position_of(&wh3).unwrap();

    let trigger = RebalanceTrigger::new(TriggerReason::StatusChange)
        .with_status("wh-3", NodeStatus::Critical);
    let report = ring.rebalance(&trigger).unwrap();

    let after = ring.position_of(&wh3).unwrap();
    assert_ne!(before, after, "critical node must move");
    assert!(report.moved.iter().any(|m| m.node_id == wh3 && m.from == before && m.to == after));

    let snapshot = ring.snapshot();
    assert!(snapshot.entries.iter().filter(|e| e.position == after).count() == 1);
}

#[test]
fn test_critical_node_sheds_share() {
    let ring = six_node_ring();
    let wh3 = NodeId::from("wh-3");
    let trigger = RebalanceTrigger::new(TriggerReason::StatusChange)
        .with_status("wh-3", NodeStatus::Critical);
    let report = ring.rebalance(&trigger).unwrap();

    let share = |own: &[corelib::Ownership]| own.iter().find(|o| o.node_id == wh3).unwrap().share;
    assert!(share(&report.ownership_after) < share(&report.ownership_before));
}

#[test]
fn test_recovered_node_returns_home() {
    let ring = six_node_ring();
    let wh3 = NodeId::from("wh-3");
    let home = ring.position_of(&wh3).unwrap();

    ring.rebalance(&RebalanceTrigger::new(TriggerReason::Manual).with_status("wh-3", NodeStatus::Critical))
        .unwrap();
    ring.rebalance(&RebalanceTrigger::new(TriggerReason::Manual).with_status("wh-3", NodeStatus::Healthy))
        .unwrap();
    assert_eq!(ring.position_of(&wh3), Some(home));
}

#[test]
fn test_rebalance_isolates_unknown_nodes() {
    let ring = six_node_ring();
    let trigger = RebalanceTrigger::new(TriggerReason::Manual)
        .with_status("wh-404", NodeStatus::Critical)
        .with_status("wh-2", NodeStatus::Warning);
    let report = ring.rebalance(&trigger).unwrap();

    assert_eq!(report.errors, vec![Error::NodeNotFound(NodeId::from("wh-404"))]);
    assert!(report.moved.iter().any(|m| m.node_id.as_str() == "wh-2"));
}

#[test]
fn test_rebalance_changes_key_ownership() {
    let ring = six_node_ring();
    let snapshot = ring.snapshot();
    let wh3 = NodeId::from("wh-3");
    let owned_before: Vec<String> = (0..2_000)
        .map(|i| format!("sku-{i}"))
        .filter(|k| ring.locate(k.as_bytes()).unwrap() == wh3)
        .collect();

    ring.rebalance(&RebalanceTrigger::new(TriggerReason::StatusChange).with_status("wh-3", NodeStatus::Critical))
        .unwrap();

    // A shrunken range can only lose keys; the lost keys go to the successor.
    let idx = snapshot.index_of(&wh3).unwrap();
    let successor = snapshot.successor(idx).node_id.clone();
    let moved: Vec<&String> = owned_before
        .iter()
        .filter(|k| ring.locate(k.as_bytes()).unwrap() != wh3)
        .collect();
    assert!(!moved.is_empty());
    assert!(moved.iter().all(|k| ring.locate(k.as_bytes()).unwrap() == successor));
}

#[test]
fn test_topology_replicas_follow_ring_order() {
    let ring = six_node_ring();
    let snapshot = ring.snapshot();
    let replicas = Topology::new(&snapshot).replicas_for_key(b"ord-1", 3);
    let first = snapshot.index_of(&replicas[0]).unwrap();
    assert_eq!(replicas[1], snapshot.successor(first).node_id);
}

// ============================================================================
// Properties
// ============================================================================

fn status_strategy() -> impl Strategy<Value = NodeStatus> {
    prop_oneof![
        Just(NodeStatus::Healthy),
        Just(NodeStatus::Warning),
        Just(NodeStatus::Critical),
    ]
}

proptest! {
    #[test]
    fn prop_locate_is_deterministic_and_member(n in 1usize..20, key in ".{0,32}") {
        let ring = RingBuilder::new()
            .add_nodes((0..n).map(|i| warehouse(&format!("wh-{i}"))))
            .build()
            .unwrap();
        let owner = ring.locate(key.as_bytes()).unwrap();
        prop_assert_eq!(&owner, &ring.locate(key.as_bytes()).unwrap());
        prop_assert!(ring.snapshot().contains(&owner));
    }

    #[test]
    fn prop_rebalance_keeps_positions_unique(
        statuses in proptest::collection::vec(status_strategy(), 1..40),
    ) {
        let ring = RingBuilder::new()
            .with_partitioner(Arc::new(DegreePartitioner))
            .add_nodes((0..statuses.len()).map(|i| warehouse(&format!("wh-{i}"))))
            .build()
            .unwrap();
        let mut trigger = RebalanceTrigger::new(TriggerReason::Manual);
        for (i, status) in statuses.iter().enumerate() {
            trigger = trigger.with_status(format!("wh-{i}"), *status);
        }
        ring.rebalance(&trigger).unwrap();

        let snapshot = ring.snapshot();
        let unique: HashSet<Token> = snapshot.entries.iter().map(|e| e.position).collect();
        prop_assert_eq!(unique.len(), statuses.len());
    }
}
