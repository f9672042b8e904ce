//! Route optimization for the fulfillment network.
//!
//! This crate turns a ring snapshot plus live node load into route plans:
//! - A weighted route graph over the healthy warehouses and the destination
//! - Three search strategies behind one trait (dijkstra, astar, greedy)
//! - An integer cost model whose breakdown reconciles to the cent

pub mod algorithm;
pub mod cost;
pub mod destination;
pub mod graph;
pub mod money;
pub mod optimizer;
pub mod plan;
pub mod strategy;

pub use algorithm::Algorithm;
pub use cost::{CostBreakdown, CostModel};
pub use destination::{Destination, Gazetteer};
pub use graph::{GraphConfig, RouteGraph};
pub use money::Cents;
pub use optimizer::{RouteOptimizer, RoutingConfig};
pub use plan::{RouteLeg, RoutePlan, RouteRequest};
pub use strategy::{RouteStrategy, SearchBudget};
