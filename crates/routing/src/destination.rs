//! Destination resolution.
//!
//! A route ends either at a warehouse node or at an external city label. City
//! coordinates come from a small gazetteer; the defaults are the delivery
//! cities the dashboard ships to.

use std::collections::BTreeMap;

use corelib::{GeoPoint, NodeId};
use serde::{Deserialize, Serialize};

/// Resolved route end.
#[derive(Clone, Debug, PartialEq)]
pub enum Destination {
    Node(NodeId),
    City { name: String, location: GeoPoint },
}

/// A named delivery city.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub location: GeoPoint,
}

/// Case-insensitive city lookup.
#[derive(Clone, Debug)]
pub struct Gazetteer {
    cities: BTreeMap<String, City>,
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::from_cities([
            ("New York", GeoPoint::new(40.7128, -74.0060)),
            ("Chicago", GeoPoint::new(41.8781, -87.6298)),
            ("Miami", GeoPoint::new(25.7617, -80.1918)),
            ("Boston", GeoPoint::new(42.3601, -71.0589)),
            ("Dallas", GeoPoint::new(32.7767, -96.7970)),
            ("Atlanta", GeoPoint::new(33.7490, -84.3880)),
        ])
    }
}

impl Gazetteer {
    pub fn empty() -> Self {
        Self { cities: BTreeMap::new() }
    }

    pub fn from_cities<'a>(cities: impl IntoIterator<Item = (&'a str, GeoPoint)>) -> Self {
        let mut gazetteer = Self::empty();
        for (name, location) in cities {
            gazetteer.insert(name, location);
        }
        gazetteer
    }

    pub fn insert(&mut self, name: &str, location: GeoPoint) {
        self.cities.insert(
            name.trim().to_lowercase(),
            City {
                name: name.trim().to_string(),
                location,
            },
        );
    }

    pub fn lookup(&self, name: &str) -> Option<&City> {
        self.cities.get(&name.trim().to_lowercase())
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }
}
