//! Warehouse node abstractions.
//!
//! Nodes represent warehouses participating in the ring. They are identified by
//! a stable string `NodeId` (`"wh-1"`); ids order lexicographically, and that
//! order is the tie-break everywhere in the crate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::token::Token;

/// Mean earth radius in statute miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Stable identifier of a warehouse node.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

/// A point on the earth's surface in decimal degrees.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in miles (haversine).
    pub fn distance_miles(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (other.lng - self.lng).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().min(1.0).asin()
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Health classification of a node, driven by utilization.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Healthy => "healthy",
            NodeStatus::Warning => "warning",
            NodeStatus::Critical => "critical",
        }
    }

    /// True for any status worse than healthy.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, NodeStatus::Healthy)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A warehouse participating in the ring.
///
/// Metric fields are owned by the fleet monitor and mutated in place on every
/// tick; `ring_position` is filled in from the ring when a snapshot is taken.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    /// Human-readable name ("Seattle DC").
    pub name: String,
    pub location: GeoPoint,
    /// Maximum units storable.
    pub capacity: u32,
    /// Units currently stored, `0..=capacity`.
    pub load: u32,
    /// `round(load / capacity * 100)`, recomputed on every mutation.
    pub utilization: u8,
    pub status: NodeStatus,
    pub cpu_load: f64,
    pub ram_load: f64,
    pub active_orders: u32,
    pub ring_position: Option<Token>,
}

impl Node {
    /// Construct an idle node with basic metadata.
    pub fn new(
        id: impl Into<NodeId>,
        name: impl Into<String>,
        location: GeoPoint,
        capacity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            capacity,
            load: 0,
            utilization: 0,
            status: NodeStatus::Healthy,
            cpu_load: 0.0,
            ram_load: 0.0,
            active_orders: 0,
            ring_position: None,
        }
    }

    /// Set the stored load and recompute utilization.
    pub fn with_load(mut self, load: u32) -> Self {
        self.set_load(load);
        self
    }

    pub fn with_resources(mut self, cpu_load: f64, ram_load: f64, active_orders: u32) -> Self {
        self.cpu_load = cpu_load;
        self.ram_load = ram_load;
        self.active_orders = active_orders;
        self
    }

    /// Set the stored load (clamped to capacity) and recompute utilization.
    pub fn set_load(&mut self, load: u32) {
        self.load = load.min(self.capacity);
        self.utilization = utilization_percent(self.load, self.capacity);
    }

    /// Check the invariants a node must satisfy before it joins the cluster.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(Error::InvalidNode("empty node id".into()));
        }
        if self.capacity == 0 {
            return Err(Error::InvalidNode(format!("{}: capacity must be positive", self.id)));
        }
        if !self.location.is_valid() {
            return Err(Error::InvalidNode(format!("{}: invalid location", self.id)));
        }
        if self.load > self.capacity {
            return Err(Error::InvalidNode(format!(
                "{}: load {} exceeds capacity {}",
                self.id, self.load, self.capacity
            )));
        }
        for (metric, value) in [("cpuLoad", self.cpu_load), ("ramLoad", self.ram_load)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(Error::InvalidMetricRange {
                    node: self.id.clone(),
                    metric,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// `round(load / capacity * 100)` in integer arithmetic, saturating at 100.
pub fn utilization_percent(load: u32, capacity: u32) -> u8 {
    if capacity == 0 {
        return 0;
    }
    let load = u64::from(load.min(capacity));
    let capacity = u64::from(capacity);
    ((load * 100 + capacity / 2) / capacity).min(100) as u8
}
