//! Algorithm selector.

use std::fmt;
use std::str::FromStr;

use corelib::Error;
use serde::{Deserialize, Serialize};

use crate::strategy::{AStar, Dijkstra, Greedy, RouteStrategy};

/// Closed set of route search algorithms.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum Algorithm {
    /// Minimum-cost search over a priority frontier.
    #[default]
    #[serde(rename = "dijkstra")]
    ShortestCost,
    /// Minimum-cost search guided by an admissible straight-line estimate.
    #[serde(rename = "astar")]
    Heuristic,
    /// Locally cheapest next hop, no backtracking, no optimality guarantee.
    #[serde(rename = "greedy")]
    Greedy,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::ShortestCost, Algorithm::Heuristic, Algorithm::Greedy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::ShortestCost => "dijkstra",
            Algorithm::Heuristic => "astar",
            Algorithm::Greedy => "greedy",
        }
    }

    /// The strategy implementing this algorithm.
    pub fn strategy(&self) -> &'static dyn RouteStrategy {
        match self {
            Algorithm::ShortestCost => &Dijkstra,
            Algorithm::Heuristic => &AStar,
            Algorithm::Greedy => &Greedy,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Case-insensitive; accepts the wire names and the descriptive aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "dijkstra" | "shortest-cost" => Ok(Algorithm::ShortestCost),
            "astar" | "a*" | "a-star" | "heuristic" => Ok(Algorithm::Heuristic),
            "greedy" => Ok(Algorithm::Greedy),
            _ => Err(Error::InvalidAlgorithm(s.to_string())),
        }
    }
}
