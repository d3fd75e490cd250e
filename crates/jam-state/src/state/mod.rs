//! Clone-on-write state snapshots (§3 `DeltaSnapshot`, `AccumulationContext`).

mod context;
mod delta;
mod snapshot;

pub use context::AccumulationContext;
pub use delta::DeltaSnapshot;
pub use snapshot::Snapshot;
