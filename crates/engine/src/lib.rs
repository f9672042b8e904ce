//! Fulfillment engine.
//!
//! This crate wires the core pieces into one owned process state:
//! - `Cluster`: ring, fleet monitor, route optimizer and current plan
//! - A JSON request/response API mirroring the dashboard endpoints
//! - A tokio scheduler driving monitor ticks and route refreshes

pub mod api;
pub mod cluster;
pub mod config;
pub mod scheduler;
pub mod seed;
pub mod telemetry;

pub use api::{handle, handle_json, ApiRequest, ApiResponse};
pub use cluster::{Cluster, TickOutcome};
pub use config::{EngineConfig, ScheduleConfig};
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerStats};
pub use seed::default_warehouses;
