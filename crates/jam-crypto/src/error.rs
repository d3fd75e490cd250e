//! Error types for the `jam-crypto` crate.

use thiserror::Error;

/// Errors a hashing or Merkleization operation can raise.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A digest did not have the expected length for its algorithm.
    #[error("invalid hash length: expected {expected}, got {got}")]
    InvalidHashLength {
        /// The digest length the algorithm requires.
        expected: usize,
        /// The digest length actually produced.
        got: usize,
    },
    /// No candidate service id was available within the full id space.
    #[error("candidate service id space exhausted")]
    CandidateSpaceExhausted,
}
