//! Ring tokens.
//!
//! A token is a position on the ring. Every partitioner maps keys into a ring
//! space `0..space`; tokens are plain `u64`s inside that space so they are
//! cheap to copy, compare and hash.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position on the hash ring.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub u64);

impl Token {
    pub const ZERO: Token = Token(0);

    /// Clockwise distance from `self` to `other` in a ring of `space` slots.
    ///
    /// The distance from a token to itself is the full circle, which is what a
    /// lone node owns.
    pub fn distance_to(&self, other: &Self, space: u128) -> u128 {
        let (from, to) = (u128::from(self.0), u128::from(other.0));
        if to > from {
            to - from
        } else {
            space - from + to
        }
    }

    /// Move `steps` slots clockwise, wrapping inside `space`.
    pub fn advance(&self, steps: u128, space: u128) -> Token {
        Token(((u128::from(self.0) + steps) % space) as u64)
    }

    /// Angle of this token on the ring, in degrees `[0, 360)`.
    pub fn degrees(&self, space: u128) -> f64 {
        (self.0 as f64 / space as f64) * 360.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
