//! `fleetctl`: command-line front end for the fulfillment engine.
//!
//! Provides commands for:
//! - Inspecting nodes, the ring and ownership ranges
//! - Locating keys and optimizing routes
//! - Forcing ticks and rebalances
//! - Running the periodic scheduler

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
