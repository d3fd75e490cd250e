//! # Accumulation Engine Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]
//! # Accumulation Engine
//!
//! Implements the per-block accumulation step: resolving report
//! dependencies, running the gas-bounded outer batching loop with parallel
//! per-service invocation, dispatching deferred transfers, and writing back
//! the posterior history, pending-report queue, and accumulation-root
//! commitment.

pub mod chi_merge;
pub mod commitment;
pub mod dependency;
pub mod engine;
pub mod host_calls;
pub mod outer;
pub mod parallel;
pub mod single_service;
pub mod transfer_dispatch;

pub use engine::{run_block_accumulation, AccumulationInput, AccumulationOutcome};
