//! Core partitioner trait definitions.

use crate::token::Token;

/// A partitioner converts keys into tokens for placement on the hash ring.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// token generation without synchronization overhead.
pub trait Partitioner: Send + Sync + std::fmt::Debug + 'static {
    /// Converts a key into a token.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to partition
    ///
    /// # Returns
    ///
    /// A token in `0..self.space()`
    fn partition(&self, key: &[u8]) -> Token;

    /// Number of distinct positions on the ring.
    fn space(&self) -> u128;

    /// Returns the minimum token value for this partitioner.
    fn min_token(&self) -> Token {
        Token::ZERO
    }

    /// Returns the maximum token value for this partitioner.
    fn max_token(&self) -> Token {
        Token((self.space() - 1) as u64)
    }

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
