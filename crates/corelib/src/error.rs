//! Error types shared by the ring, the router and the fleet monitor.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

use crate::node::NodeId;
use crate::token::Token;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the fulfillment core.
///
/// Every failure path maps to exactly one variant so callers can log and
/// branch on the kind without parsing messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The node is not on the ring (or not known to the monitor).
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Every salted placement attempt landed on an occupied position.
    #[error("duplicate ring position {position} for node {node} after {attempts} attempts")]
    DuplicatePosition {
        node: NodeId,
        position: Token,
        attempts: u32,
    },

    /// A node with this id already exists.
    #[error("node already exists: {0}")]
    DuplicateNode(NodeId),

    /// The node definition is unusable (zero capacity, empty id, ...).
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// Source and destination are not connected in the route graph.
    #[error("no path found: {0}")]
    NoPathFound(String),

    /// The algorithm selector is not one of dijkstra, astar or greedy.
    #[error("invalid algorithm: {0:?}")]
    InvalidAlgorithm(String),

    /// The search exceeded its deadline.
    #[error("route optimization timed out after {elapsed_ms} ms")]
    OptimizationTimeout { elapsed_ms: u64 },

    /// A metric sample fell outside its legal range.
    #[error("invalid {metric} value {value} for node {node}")]
    InvalidMetricRange {
        node: NodeId,
        metric: &'static str,
        value: f64,
    },

    /// Configuration error.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Short stable name of the error kind, used in API responses and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NodeNotFound(_) => "NodeNotFound",
            Error::DuplicatePosition { .. } => "DuplicatePosition",
            Error::DuplicateNode(_) => "DuplicateNode",
            Error::InvalidNode(_) => "InvalidNode",
            Error::NoPathFound(_) => "NoPathFound",
            Error::InvalidAlgorithm(_) => "InvalidAlgorithm",
            Error::OptimizationTimeout { .. } => "OptimizationTimeout",
            Error::InvalidMetricRange { .. } => "InvalidMetricRange",
            Error::Config(_) => "Config",
        }
    }

    /// A timeout is treated like a missing path: the caller may retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::NoPathFound(_) | Error::OptimizationTimeout { .. }
        )
    }
}

/// Errors travel inside reports and API responses as `{kind, message}`.
impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Error", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}
