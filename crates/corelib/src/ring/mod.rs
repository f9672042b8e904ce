//! Consistent hash ring implementation.
//!
//! The ring manages warehouse positions and provides efficient lookup
//! operations for finding the node responsible for a key.

pub mod rebalance;
pub mod ring;
pub mod snapshot;

pub use rebalance::{NodeMove, RebalancePolicy, RebalanceReport, RebalanceTrigger, TriggerReason};
pub use ring::{HashRing, RingBuilder, MAX_PLACEMENT_ATTEMPTS};
pub use snapshot::{RingEntry, RingSnapshot};
