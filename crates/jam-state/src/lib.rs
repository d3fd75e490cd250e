//! # Accumulation Engine State
//!
//! Clone-on-write snapshots over the four state dimensions an accumulation
//! context exposes to services (§3 `AccumulationContext`, §4.3): service
//! accounts (`delta`), validator keys (`iota`), the core-authorizer queue
//! (`phi`), and privileges (`chi`).
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

/// The generic clone-on-write snapshot and its specialization over `Delta`.
pub mod state;

pub use state::{AccumulationContext, DeltaSnapshot, Snapshot};
