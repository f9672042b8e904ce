//! Hash ring data structure.
//!
//! One position per warehouse. The ring state lives behind
//! `RwLock<Arc<RingSnapshot>>`: readers clone the `Arc` and work on a frozen
//! view, writers build the next snapshot and swap it in under the write lock.
//!
//! # Performance
//!
//! - **Lookup**: O(log n) binary search over positions
//! - **Add/remove/rebalance**: O(n log n), rebuilds the snapshot

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::node::{Node, NodeId, NodeStatus};
use crate::partitioner::{Partitioner, SipHashPartitioner};
use crate::ring::rebalance::{self, NodeMove, RebalancePolicy, RebalanceReport, RebalanceTrigger};
use crate::ring::snapshot::{RingEntry, RingSnapshot};
use crate::token::Token;
use crate::topology::Topology;

/// Salted placement attempts before giving up with `DuplicatePosition`.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 16;

/// Consistent hash ring of warehouse nodes.
pub struct HashRing {
    partitioner: Arc<dyn Partitioner>,
    policy: RebalancePolicy,
    state: RwLock<Arc<RingSnapshot>>,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl HashRing {
    /// Empty ring over the full 64-bit SipHash space.
    pub fn new() -> Self {
        Self::with_partitioner(Arc::new(SipHashPartitioner))
    }

    pub fn with_partitioner(partitioner: Arc<dyn Partitioner>) -> Self {
        Self::with_policy(partitioner, RebalancePolicy::default())
    }

    pub fn with_policy(partitioner: Arc<dyn Partitioner>, policy: RebalancePolicy) -> Self {
        let empty = RingSnapshot::new(0, Arc::clone(&partitioner), Vec::new());
        Self {
            partitioner,
            policy,
            state: RwLock::new(Arc::new(empty)),
        }
    }

    /// Consistent view of the ring; never observes a half-applied change.
    pub fn snapshot(&self) -> Arc<RingSnapshot> {
        Arc::clone(&self.state.read())
    }

    pub fn node_count(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    pub fn policy(&self) -> &RebalancePolicy {
        &self.policy
    }

    pub fn position_of(&self, id: &NodeId) -> Option<Token> {
        self.state.read().position_of(id)
    }

    /// Place a node on the ring.
    ///
    /// The home position is `hash(id)`; on collision the id is rehashed with a
    /// salt (`"wh-1#1"`, `"wh-1#2"`, ...). The node is never silently dropped:
    /// if every attempt collides the call fails with `DuplicatePosition`.
    pub fn add_node(&self, node: &Node) -> Result<Token> {
        let mut state = self.state.write();
        if state.contains(&node.id) {
            return Err(Error::DuplicateNode(node.id.clone()));
        }

        let mut candidate = Token::ZERO;
        let mut home = None;
        for salt in 0..MAX_PLACEMENT_ATTEMPTS {
            candidate = if salt == 0 {
                self.partitioner.partition(node.id.as_str().as_bytes())
            } else {
                self.partitioner.partition(format!("{}#{}", node.id, salt).as_bytes())
            };
            if state.entries.iter().all(|e| e.home != candidate) {
                home = Some(candidate);
                break;
            }
            debug!(node = %node.id, token = %candidate, salt, "ring position taken, rehashing");
        }
        let home = home.ok_or_else(|| Error::DuplicatePosition {
            node: node.id.clone(),
            position: candidate,
            attempts: MAX_PLACEMENT_ATTEMPTS,
        })?;

        let mut entries = state.entries.clone();
        entries.push(RingEntry {
            node_id: node.id.clone(),
            home,
            position: home,
            status: node.status,
            angle: 0.0,
        });
        let next = self.relayout(state.version + 1, entries)?;
        let position = next.position_of(&node.id).unwrap_or(home);
        *state = Arc::new(next);

        info!(node = %node.id, home = %home, position = %position, version = state.version, "node added to ring");
        Ok(position)
    }

    /// Remove a node; its key range falls through to its successor.
    pub fn remove_node(&self, id: &NodeId) -> Result<RingEntry> {
        let mut state = self.state.write();
        let idx = state
            .index_of(id)
            .ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        let mut entries = state.entries.clone();
        let removed = entries.remove(idx);
        *state = Arc::new(self.relayout(state.version + 1, entries)?);

        info!(node = %id, version = state.version, "node removed from ring");
        Ok(removed)
    }

    /// Resolve a key to its owning node: the first position clockwise from
    /// `hash(key)`, wrapping around. Deterministic for a given ring and key.
    pub fn locate(&self, key: &[u8]) -> Result<NodeId> {
        let state = self.snapshot();
        state
            .locate(key)
            .map(|e| e.node_id.clone())
            .ok_or_else(|| Error::NodeNotFound(NodeId::from(String::from_utf8_lossy(key).into_owned())))
    }

    /// Re-derive positions from the statuses in `trigger`.
    ///
    /// Entries for unknown nodes are reported as `NodeNotFound` without
    /// aborting the rest. The new layout is swapped in atomically.
    pub fn rebalance(&self, trigger: &RebalanceTrigger) -> Result<RebalanceReport> {
        let mut state = self.state.write();
        let mut errors = Vec::new();
        let mut entries = state.entries.clone();

        for (id, status) in &trigger.statuses {
            match entries.iter_mut().find(|e| &e.node_id == id) {
                Some(entry) => entry.status = *status,
                None => {
                    warn!(node = %id, "rebalance trigger names a node that is not on the ring");
                    errors.push(Error::NodeNotFound(id.clone()));
                }
            }
        }

        let next = self.relayout(state.version + 1, entries)?;
        let moved: Vec<NodeMove> = next
            .entries
            .iter()
            .filter_map(|after| {
                let before = state.entry(&after.node_id)?;
                (before.position != after.position).then(|| NodeMove {
                    node_id: after.node_id.clone(),
                    status: after.status,
                    from: before.position,
                    to: after.position,
                })
            })
            .collect();

        let report = RebalanceReport {
            version: next.version,
            reason: trigger.reason,
            moved,
            errors,
            ownership_before: Topology::new(&state).ownership(),
            ownership_after: Topology::new(&next).ownership(),
        };
        *state = Arc::new(next);

        info!(
            version = report.version,
            reason = ?report.reason,
            moved = report.moved.len(),
            failures = report.errors.len(),
            "ring rebalanced"
        );
        Ok(report)
    }

    /// Build the next snapshot, recomputing every current position.
    fn relayout(&self, version: u64, mut entries: Vec<RingEntry>) -> Result<RingSnapshot> {
        let space = self.partitioner.space();
        entries.sort_by(|a, b| (a.home, &a.node_id).cmp(&(b.home, &b.node_id)));
        let homes: Vec<(Token, NodeId, NodeStatus)> = entries
            .iter()
            .map(|e| (e.home, e.node_id.clone(), e.status))
            .collect();
        let positions = rebalance::layout(&homes, &self.policy, space);
        for (entry, position) in entries.iter_mut().zip(positions) {
            entry.position = position;
        }

        let next = RingSnapshot::new(version, Arc::clone(&self.partitioner), entries);
        if let Some(pair) = next.entries.windows(2).find(|w| w[0].position == w[1].position) {
            return Err(Error::DuplicatePosition {
                node: pair[1].node_id.clone(),
                position: pair[1].position,
                attempts: 0,
            });
        }
        Ok(next)
    }
}

impl std::fmt::Debug for HashRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashRing")
            .field("partitioner", &self.partitioner.name())
            .field("state", &*self.state.read())
            .finish()
    }
}

/// Builder for a ring populated up front.
///
/// # Example
///
/// ```rust
/// use corelib::node::{GeoPoint, Node};
/// use corelib::ring::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .add_node(Node::new("wh-1", "Seattle DC", GeoPoint::new(47.6, -122.3), 12_000))
///     .add_node(Node::new("wh-2", "Portland DC", GeoPoint::new(45.5, -122.7), 10_000))
///     .build()
///     .unwrap();
/// assert_eq!(ring.node_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct RingBuilder {
    partitioner: Option<Arc<dyn Partitioner>>,
    policy: RebalancePolicy,
    nodes: Vec<Node>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partitioner(mut self, partitioner: Arc<dyn Partitioner>) -> Self {
        self.partitioner = Some(partitioner);
        self
    }

    pub fn with_policy(mut self, policy: RebalancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn add_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn add_nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Place every node; the first failing node aborts the build.
    pub fn build(self) -> Result<HashRing> {
        let partitioner = self
            .partitioner
            .unwrap_or_else(|| Arc::new(SipHashPartitioner));
        let ring = HashRing::with_policy(partitioner, self.policy);
        for node in &self.nodes {
            ring.add_node(node)?;
        }
        Ok(ring)
    }
}
