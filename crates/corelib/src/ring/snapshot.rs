//! Immutable ring views.
//!
//! The ring never mutates a snapshot in place: every change builds a new one
//! and swaps it in, so a reader holding an `Arc<RingSnapshot>` always sees a
//! fully applied ring.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::node::{NodeId, NodeStatus};
use crate::partitioner::Partitioner;
use crate::token::Token;

/// One node's placement on the ring.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RingEntry {
    pub node_id: NodeId,
    /// Position derived from the node id alone (salted on collision).
    pub home: Token,
    /// Current position after rebalancing; equals `home` for healthy nodes.
    pub position: Token,
    /// Status the current position was derived from.
    pub status: NodeStatus,
    /// `position` as an angle in degrees, for drawing the ring.
    pub angle: f64,
}

/// Consistent, read-only view of the ring at one version.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RingSnapshot {
    pub version: u64,
    pub partitioner: &'static str,
    pub space: u128,
    /// Sorted by `position`.
    pub entries: Vec<RingEntry>,
    #[serde(skip)]
    hasher: Arc<dyn Partitioner>,
}

impl RingSnapshot {
    pub(crate) fn new(version: u64, hasher: Arc<dyn Partitioner>, mut entries: Vec<RingEntry>) -> Self {
        let space = hasher.space();
        entries.sort_by(|a, b| (a.position, &a.node_id).cmp(&(b.position, &b.node_id)));
        for entry in &mut entries {
            entry.angle = entry.position.degrees(space);
        }
        Self {
            version,
            partitioner: hasher.name(),
            space,
            entries,
            hasher,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Hash a key into this ring's space.
    pub fn token_for(&self, key: &[u8]) -> Token {
        self.hasher.partition(key)
    }

    /// Index of the entry owning `token`: the first position `>= token`,
    /// wrapping to the first entry.
    pub fn owner_index(&self, token: Token) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = self.entries.partition_point(|e| e.position < token);
        Some(if idx == self.entries.len() { 0 } else { idx })
    }

    /// Entry owning `key`.
    pub fn locate(&self, key: &[u8]) -> Option<&RingEntry> {
        self.owner_index(self.token_for(key)).map(|idx| &self.entries[idx])
    }

    pub fn entry(&self, id: &NodeId) -> Option<&RingEntry> {
        self.entries.iter().find(|e| &e.node_id == id)
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.entries.iter().position(|e| &e.node_id == id)
    }

    pub fn position_of(&self, id: &NodeId) -> Option<Token> {
        self.entry(id).map(|e| e.position)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.entry(id).is_some()
    }

    /// Node ids in clockwise order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.entries.iter().map(|e| &e.node_id)
    }

    /// Clockwise successor of the entry at `idx`.
    pub fn successor(&self, idx: usize) -> &RingEntry {
        &self.entries[(idx + 1) % self.entries.len()]
    }

    /// Counter-clockwise predecessor of the entry at `idx`.
    pub fn predecessor(&self, idx: usize) -> &RingEntry {
        let n = self.entries.len();
        &self.entries[(idx + n - 1) % n]
    }
}

impl fmt::Debug for RingSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingSnapshot")
            .field("version", &self.version)
            .field("partitioner", &self.partitioner)
            .field("entries", &self.entries)
            .finish()
    }
}
