//! Metric samples and how they are applied to a node.

use corelib::{Error, Node, Result};
use serde::{Deserialize, Serialize};

/// One measurement for one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Sample {
    /// Relative change; the result is clamped into range.
    #[serde(rename_all = "camelCase")]
    Delta {
        cpu_load: f64,
        ram_load: f64,
        active_orders: i64,
        load: i64,
    },
    /// Absolute reading; rejected when out of range.
    #[serde(rename_all = "camelCase")]
    Reading {
        cpu_load: f64,
        ram_load: f64,
        active_orders: u32,
        load: u32,
    },
}

impl Sample {
    /// Reading that puts the node at `utilization` percent, keeping the rest.
    pub fn utilization(node: &Node, utilization: u8) -> Self {
        let load = (u64::from(node.capacity) * u64::from(utilization.min(100))).div_ceil(100);
        Sample::Reading {
            cpu_load: node.cpu_load,
            ram_load: node.ram_load,
            active_orders: node.active_orders,
            load: load as u32,
        }
    }

    /// Apply to a copy of `node`. On error the node is left untouched.
    pub fn apply(&self, node: &Node) -> Result<Node> {
        let mut next = node.clone();
        match *self {
            Sample::Delta {
                cpu_load,
                ram_load,
                active_orders,
                load,
            } => {
                next.cpu_load = shift_percent(node, "cpuLoad", node.cpu_load, cpu_load)?;
                next.ram_load = shift_percent(node, "ramLoad", node.ram_load, ram_load)?;
                next.active_orders = (i64::from(node.active_orders) + active_orders).clamp(0, i64::from(u32::MAX)) as u32;
                let stored = (i64::from(node.load) + load).clamp(0, i64::from(node.capacity));
                next.set_load(stored as u32);
            }
            Sample::Reading {
                cpu_load,
                ram_load,
                active_orders,
                load,
            } => {
                next.cpu_load = check_percent(node, "cpuLoad", cpu_load)?;
                next.ram_load = check_percent(node, "ramLoad", ram_load)?;
                if load > node.capacity {
                    return Err(Error::InvalidMetricRange {
                        node: node.id.clone(),
                        metric: "load",
                        value: f64::from(load),
                    });
                }
                next.active_orders = active_orders;
                next.set_load(load);
            }
        }
        Ok(next)
    }
}

fn shift_percent(node: &Node, metric: &'static str, current: f64, delta: f64) -> Result<f64> {
    if !delta.is_finite() {
        return Err(Error::InvalidMetricRange {
            node: node.id.clone(),
            metric,
            value: delta,
        });
    }
    Ok((current + delta).clamp(0.0, 100.0))
}

fn check_percent(node: &Node, metric: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(Error::InvalidMetricRange {
            node: node.id.clone(),
            metric,
            value,
        });
    }
    Ok(value)
}
