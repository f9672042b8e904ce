//! Core library for the fulfillment routing backend.
//!
//! This crate provides the fundamental abstractions shared by the router and
//! the fleet monitor:
//! - Warehouse nodes and their health status
//! - Token types and partitioners
//! - The consistent hash ring with status-driven rebalancing
//! - Ring topology (ownership ranges, preference lists)

pub mod error;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod topology;

pub use error::{Error, Result};
pub use node::{GeoPoint, Node, NodeId, NodeStatus};
pub use partitioner::{Partitioner, PartitionerKind};
pub use ring::{HashRing, RebalancePolicy, RebalanceReport, RebalanceTrigger, RingBuilder, RingSnapshot, TriggerReason};
pub use token::Token;
pub use topology::{Ownership, Topology};
