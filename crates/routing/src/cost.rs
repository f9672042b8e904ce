//! Leg cost model and route cost breakdown.
//!
//! Every leg `u -> v` is priced in integer cents:
//!
//! ```text
//! base      = ceil(miles * rate_cents_per_mile)
//! surcharge = base * utilization(v)% * load_surcharge_per_mille / 1000
//!           + active_orders(v) * congestion_cents_per_order
//! handling  = handling_cents_per_stop
//! weight    = base + surcharge + handling
//! ```
//!
//! Since `weight >= base >= miles * rate`, the straight-line lower bound
//! `floor(miles_to_sink * rate)` never overestimates the remaining cost.

use corelib::{Error, GeoPoint, Node, Result};
use serde::{Deserialize, Serialize};

use crate::money::Cents;

/// Pricing and timing parameters for a single leg.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostModel {
    pub rate_cents_per_mile: u64,
    /// Surcharge at 100% utilization of the arrival warehouse, per mille of base.
    pub load_surcharge_per_mille: u64,
    pub congestion_cents_per_order: u64,
    pub handling_cents_per_stop: u64,
    pub avg_speed_mph: f64,
    pub dwell_minutes_per_stop: u32,
    /// Extra dwell minute per this many active orders at the arrival warehouse.
    pub orders_per_dwell_minute: u32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            rate_cents_per_mile: 6,
            load_surcharge_per_mille: 300,
            congestion_cents_per_order: 4,
            handling_cents_per_stop: 450,
            avg_speed_mph: 52.0,
            dwell_minutes_per_stop: 15,
            orders_per_dwell_minute: 10,
        }
    }
}

/// Load seen at the arrival end of a leg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArrivalLoad {
    pub utilization: u8,
    pub active_orders: u32,
}

impl From<&Node> for ArrivalLoad {
    fn from(node: &Node) -> Self {
        Self {
            utilization: node.utilization,
            active_orders: node.active_orders,
        }
    }
}

/// Price of one leg, split into components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegCost {
    pub base: Cents,
    pub surcharge: Cents,
    pub handling: Cents,
}

impl LegCost {
    /// Edge weight used by the search.
    pub fn weight(&self) -> u64 {
        self.base.0 + self.surcharge.0 + self.handling.0
    }
}

/// A priced edge of the route graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub miles: f64,
    pub cost: LegCost,
    pub minutes: u32,
}

impl CostModel {
    pub fn validate(&self) -> Result<()> {
        if self.rate_cents_per_mile == 0 {
            return Err(Error::Config("rate_cents_per_mile must be positive".into()));
        }
        if self.handling_cents_per_stop == 0 {
            return Err(Error::Config("handling_cents_per_stop must be positive".into()));
        }
        if !(self.avg_speed_mph.is_finite() && self.avg_speed_mph > 0.0) {
            return Err(Error::Config("avg_speed_mph must be positive".into()));
        }
        if self.orders_per_dwell_minute == 0 {
            return Err(Error::Config("orders_per_dwell_minute must be positive".into()));
        }
        Ok(())
    }

    /// Price and time a leg between two points.
    ///
    /// `arrival` is `None` for legs into an external destination, which carry
    /// no warehouse load.
    pub fn leg(&self, from: &GeoPoint, to: &GeoPoint, arrival: Option<ArrivalLoad>) -> Leg {
        let miles = from.distance_miles(to);
        let base = (miles * self.rate_cents_per_mile as f64).ceil() as u64;
        let load = arrival.unwrap_or_default();

        let load_surcharge = u128::from(base)
            * u128::from(load.utilization.min(100))
            * u128::from(self.load_surcharge_per_mille)
            / 100_000;
        let congestion = u64::from(load.active_orders) * self.congestion_cents_per_order;

        let drive = (miles / self.avg_speed_mph * 60.0).ceil() as u32;
        let dwell = self.dwell_minutes_per_stop + load.active_orders / self.orders_per_dwell_minute;

        Leg {
            miles,
            cost: LegCost {
                base: Cents(base),
                surcharge: Cents(load_surcharge as u64 + congestion),
                handling: Cents(self.handling_cents_per_stop),
            },
            minutes: drive + dwell,
        }
    }

    /// Lower bound on the cost of covering `miles` in straight line.
    pub fn lower_bound(&self, miles: f64) -> u64 {
        (miles * self.rate_cents_per_mile as f64).floor().max(0.0) as u64
    }
}

/// Named components of a route's total cost.
///
/// Invariant: `base_cost + surcharge + handling - savings == total`, exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub base_cost: Cents,
    pub surcharge: Cents,
    pub handling: Cents,
    pub savings: Cents,
    pub total: Cents,
}

impl CostBreakdown {
    /// Sum leg components and deduct `savings_per_mille` of the gross.
    pub fn from_legs<'a>(legs: impl IntoIterator<Item = &'a LegCost>, savings_per_mille: u64) -> Self {
        let (mut base_cost, mut surcharge, mut handling) = (Cents::ZERO, Cents::ZERO, Cents::ZERO);
        for leg in legs {
            base_cost += leg.base;
            surcharge += leg.surcharge;
            handling += leg.handling;
        }
        let gross = base_cost + surcharge + handling;
        let savings = gross.per_mille(savings_per_mille.min(1000));
        Self {
            base_cost,
            surcharge,
            handling,
            savings,
            total: Cents(gross.0 - savings.0),
        }
    }

    pub fn gross(&self) -> Cents {
        self.base_cost + self.surcharge + self.handling
    }

    pub fn reconciles(&self) -> bool {
        self.gross().checked_sub(self.savings) == Some(self.total)
    }
}
