//! Metric names and recording helpers.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

use corelib::Node;
use metrics::{counter, gauge};

pub const FLEET_TICKS: &str = "fleet_ticks_total";
pub const METRIC_REJECTIONS: &str = "fleet_metric_rejections_total";
pub const RING_REBALANCES: &str = "ring_rebalances_total";
pub const ROUTE_OPTIMIZATIONS: &str = "route_optimizations_total";
pub const ROUTE_FAILURES: &str = "route_failures_total";
pub const NODE_UTILIZATION: &str = "node_utilization_percent";

pub(crate) fn record_tick(rejected: usize, nodes: &[Node]) {
    counter!(FLEET_TICKS).increment(1);
    if rejected > 0 {
        counter!(METRIC_REJECTIONS).increment(rejected as u64);
    }
    for node in nodes {
        gauge!(NODE_UTILIZATION, "node" => node.id.to_string()).set(f64::from(node.utilization));
    }
}

pub(crate) fn record_rebalance(reason: &'static str) {
    counter!(RING_REBALANCES, "reason" => reason).increment(1);
}

pub(crate) fn record_route(algorithm: &'static str, ok: bool) {
    if ok {
        counter!(ROUTE_OPTIMIZATIONS, "algorithm" => algorithm).increment(1);
    } else {
        counter!(ROUTE_FAILURES, "algorithm" => algorithm).increment(1);
    }
}
