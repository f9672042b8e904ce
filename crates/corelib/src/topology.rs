//! Ring topology views.
//!
//! High-level reads over a ring snapshot: which key range each node owns, and
//! the clockwise preference list for a key.

use std::collections::HashSet;

use serde::Serialize;

use crate::node::NodeId;
use crate::ring::RingSnapshot;
use crate::token::Token;

/// Key range `(start, end]` owned by one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ownership {
    pub node_id: NodeId,
    /// Exclusive start: the predecessor's position.
    pub start: Token,
    /// Inclusive end: the node's own position.
    pub end: Token,
    /// Fraction of the ring space, `0.0..=1.0`.
    pub share: f64,
}

/// Read-only topology view over one snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Topology<'a> {
    snapshot: &'a RingSnapshot,
}

impl<'a> Topology<'a> {
    pub fn new(snapshot: &'a RingSnapshot) -> Self {
        Self { snapshot }
    }

    /// Owned range of every node, in clockwise order.
    pub fn ownership(&self) -> Vec<Ownership> {
        let space = self.snapshot.space;
        (0..self.snapshot.len())
            .map(|idx| {
                let entry = &self.snapshot.entries[idx];
                let start = self.snapshot.predecessor(idx).position;
                let size = start.distance_to(&entry.position, space);
                Ownership {
                    node_id: entry.node_id.clone(),
                    start,
                    end: entry.position,
                    share: size as f64 / space as f64,
                }
            })
            .collect()
    }

    pub fn ownership_of(&self, id: &NodeId) -> Option<Ownership> {
        self.ownership().into_iter().find(|o| &o.node_id == id)
    }

    /// Owner of `key` followed by the next distinct nodes clockwise, up to `n`
    /// nodes. Used as the failover order when the owner is unavailable.
    pub fn replicas_for_key(&self, key: &[u8], n: usize) -> Vec<NodeId> {
        let entries = &self.snapshot.entries;
        let start = match self.snapshot.owner_index(self.snapshot.token_for(key)) {
            Some(idx) => idx,
            None => return Vec::new(),
        };

        let mut replicas = Vec::with_capacity(n.min(entries.len()));
        let mut seen = HashSet::new();
        for i in 0..entries.len() {
            if replicas.len() >= n {
                break;
            }
            let node_id = &entries[(start + i) % entries.len()].node_id;
            if seen.insert(node_id) {
                replicas.push(node_id.clone());
            }
        }
        replicas
    }

    /// `(predecessor, successor)` of a node in clockwise order.
    pub fn neighbours(&self, id: &NodeId) -> Option<(&'a NodeId, &'a NodeId)> {
        let snapshot: &'a RingSnapshot = self.snapshot;
        let idx = snapshot.index_of(id)?;
        Some((
            &snapshot.predecessor(idx).node_id,
            &snapshot.successor(idx).node_id,
        ))
    }
}
