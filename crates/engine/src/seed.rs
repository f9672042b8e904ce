//! The default West Coast fleet the dashboard starts with.

use corelib::{GeoPoint, Node};

const WAREHOUSES: [(&str, &str, f64, f64, u32, u32, f64, f64, u32); 6] = [
    ("wh-1", "Seattle DC", 47.6062, -122.3321, 12_000, 7_200, 48.0, 55.0, 64),
    ("wh-2", "Portland DC", 45.5152, -122.6784, 10_500, 5_880, 41.0, 47.0, 38),
    ("wh-3", "San Francisco DC", 37.7749, -122.4194, 14_000, 8_960, 62.0, 66.0, 97),
    ("wh-4", "Los Angeles DC", 34.0522, -118.2437, 13_500, 8_100, 57.0, 61.0, 85),
    ("wh-5", "Phoenix DC", 33.4484, -112.0740, 11_000, 5_830, 36.0, 44.0, 29),
    ("wh-6", "Denver DC", 39.7392, -104.9903, 12_500, 6_750, 44.0, 52.0, 51),
];

/// Six warehouses, all below the warning threshold.
pub fn default_warehouses() -> Vec<Node> {
    WAREHOUSES
        .iter()
        .map(|&(id, name, lat, lng, capacity, load, cpu, ram, orders)| {
            Node::new(id, name, GeoPoint::new(lat, lng), capacity)
                .with_load(load)
                .with_resources(cpu, ram, orders)
        })
        .collect()
}
