//! # Virtual Machine Invocation Boundary
//!
//! The engine treats the service virtual machine as an external black box
//! (§1, §6): it neither decodes bytecode nor manages memory or registers
//! itself. This crate defines the invocation contract the engine depends on
//! — [`VmInvoker`], the host-call dispatch table, and the exit-status
//! taxonomy — plus [`mock::MockVm`], a deterministic test double that stands
//! in for a real engine in unit and integration tests.
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

/// The host-call dispatch table and the execution-context trait host calls run against.
pub mod host;
/// The VM invocation contract: `invoke`, [`ExitStatus`], [`InvocationResult`].
pub mod invoke;
/// A deterministic, scriptable stand-in for a real VM engine.
pub mod mock;

pub use host::{HostCallId, HostCallTable, VmExecutionContext};
pub use invoke::{EntryIndex, ExitStatus, InvocationResult, VmInvoker, ENTRY_ACCUMULATE, ENTRY_ON_TRANSFER};
pub use mock::MockVm;
