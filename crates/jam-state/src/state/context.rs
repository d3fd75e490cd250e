//! `AccumulationContext`: the full snapshot tuple a service accumulates
//! against (§3, §4.3).

use super::{DeltaSnapshot, Snapshot};
use jam_types::{AuthorizerQueue, Chi, Hash, Slot, ValidatorSet};

/// The snapshot tuple `(delta, iota, phi, chi)` plus the ambient `time_slot`
/// and `entropy` a service's accumulation step runs against.
///
/// Each dimension commits independently: a service may mutate `chi` without
/// touching `delta`, and the outer accumulation loop applies each dimension's
/// commit separately (the Chi Merger, §4.6, runs only over the `chi`
/// dimension's before/after values). [`AccumulationContext::deep_clone`]
/// produces a fully isolated context for a parallel per-service worker.
#[derive(Debug, Clone)]
pub struct AccumulationContext {
    /// Service accounts.
    pub delta: DeltaSnapshot,
    /// Validator keys.
    pub iota: Snapshot<ValidatorSet>,
    /// The per-core authorizer queue.
    pub phi: Snapshot<AuthorizerQueue>,
    /// Privileged-service configuration.
    pub chi: Snapshot<Chi>,
    /// The in-epoch time slot this block is being produced at.
    pub time_slot: Slot,
    /// The block's entropy, used by candidate service-id generation.
    pub entropy: Hash,
}

impl AccumulationContext {
    /// Builds a context from its four state dimensions and ambient values.
    pub fn new(
        delta: DeltaSnapshot,
        iota: ValidatorSet,
        phi: AuthorizerQueue,
        chi: Chi,
        time_slot: Slot,
        entropy: Hash,
    ) -> Self {
        Self {
            delta,
            iota: Snapshot::new(iota),
            phi: Snapshot::new(phi),
            chi: Snapshot::new(chi),
            time_slot,
            entropy,
        }
    }

    /// Produces an isolated context over deep clones of every dimension,
    /// suitable for handing to a parallel per-service worker (§4.3).
    pub fn deep_clone(&self) -> Self {
        Self {
            delta: self.delta.fork(),
            iota: self.iota.fork(),
            phi: self.phi.fork(),
            chi: self.chi.fork(),
            time_slot: self.time_slot,
            entropy: self.entropy,
        }
    }
}
