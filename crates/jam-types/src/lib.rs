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

//! # Accumulation Engine Types
//!
//! Foundational data structures for the JAM-protocol accumulation engine: service
//! accounts, work reports, the per-service accumulation operand, privileges, and
//! the deferred-transfer and accumulation-output records that flow out of a block's
//! accumulation.
//!
//! As the base crate, `jam-types` has minimal dependencies and is a dependency of
//! every other crate in the workspace. This prevents circular dependencies and
//! gives every component a single, canonical definition of the data model in §3.

/// The epoch length parameter, in slots. Governs the length of the `Xi` history ring.
pub const DEFAULT_EPOCH_LENGTH: usize = 600;
/// The preimage expungement period `D`, in slots.
pub const DEFAULT_PREIMAGE_EXPUNGEMENT_PERIOD: u32 = 19_200;

/// A top-level, crate-wide `Result` alias with a default error type.
pub type Result<T, E = crate::error::CoreError> = std::result::Result<T, E>;

/// Core accumulation data structures: `WorkReport`, `ServiceAccount`, `Delta`, `Chi`, ...
pub mod accumulation;
/// The canonical, deterministic binary codec used for all consensus-critical encodings.
pub mod codec;
/// A unified set of error types used across the engine.
pub mod error;
/// Constants and helpers for constructing the 31-byte structured storage/preimage keys.
pub mod keys;
/// A small prelude of commonly used extension traits.
pub mod prelude;

pub use accumulation::*;
