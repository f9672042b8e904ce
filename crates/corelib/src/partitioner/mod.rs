//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners are responsible for converting keys into tokens
//! that can be placed on the hash ring.

pub mod degrees;
pub mod siphash;
pub mod traits;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use degrees::DegreePartitioner;
pub use siphash::SipHashPartitioner;
pub use traits::Partitioner;

/// Partitioner selector used by configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    #[default]
    Siphash,
    Degrees,
}

impl PartitionerKind {
    pub fn build(self) -> Arc<dyn Partitioner> {
        match self {
            PartitionerKind::Siphash => Arc::new(SipHashPartitioner),
            PartitionerKind::Degrees => Arc::new(DegreePartitioner),
        }
    }
}

impl std::str::FromStr for PartitionerKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "siphash" => Ok(PartitionerKind::Siphash),
            "degrees" | "degree" => Ok(PartitionerKind::Degrees),
            other => Err(crate::Error::Config(format!("unknown partitioner {other:?}"))),
        }
    }
}
