//! Degree partitioner: a 360-slot ring, one slot per degree.
//!
//! This is the ring the dashboard draws. Collisions are common with a space
//! this small, which exercises the ring's salted re-placement.

use crate::partitioner::traits::Partitioner;
use crate::token::Token;
use xxhash_rust::xxh3::xxh3_64;

pub const DEGREES: u64 = 360;

#[derive(Clone, Copy, Debug, Default)]
pub struct DegreePartitioner;

impl Partitioner for DegreePartitioner {
    fn partition(&self, key: &[u8]) -> Token {
        Token(xxh3_64(key) % DEGREES)
    }

    fn space(&self) -> u128 {
        u128::from(DEGREES)
    }

    fn name(&self) -> &'static str {
        "DegreePartitioner"
    }
}
