//! Fleet health monitoring.
//!
//! This crate keeps each warehouse's live metrics and status:
//! - Metric ingestion behind the `MetricsSource` trait
//! - Threshold-driven status transitions (healthy, warning, critical)
//! - Rebalance triggers handed to the ring

pub mod monitor;
pub mod report;
pub mod sample;
pub mod source;
pub mod thresholds;

pub use monitor::{FleetHealthMonitor, MonitorConfig};
pub use report::{RebalanceAck, StatusTransition, TickReport};
pub use sample::Sample;
pub use source::{MetricsSource, RandomWalkConfig, RandomWalkSource, ScriptedSource};
pub use thresholds::HealthThresholds;
