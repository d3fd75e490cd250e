//! # Accumulation Engine Crypto
//!
//! Hashing primitives consumed by the engine (§4.5, §4.9): Blake2b-256 for
//! candidate service-id generation, and a Keccak-256 binary Merkle root for
//! the `AccumulateRoot` commitment.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

pub mod algorithms;
pub mod candidate;
pub mod error;
pub mod merkle;

pub use algorithms::hash::{blake2b_256, keccak_256};
pub use candidate::{first_candidate_service_id, next_candidate_service_id};
pub use merkle::binary_merkle_root;
