//! The host-call dispatch table and the execution-context surface a host
//! call runs against (§4.5, §6).

use crate::invoke::ExitStatus;
use jam_types::Gas;
use std::collections::BTreeMap;

/// A 32-bit host-call identifier, frozen by §4.5 and the JAM specification
/// it implements.
pub type HostCallId = u32;

/// The gas deducted for an unrecognized host-call id, per the observed
/// reference behavior this spec preserves (§10 open question 5): the call
/// returns WHAT rather than trapping.
pub const UNKNOWN_CALL_GAS_PENALTY: Gas = 10;

/// The surface a dispatched host call sees into the running VM invocation:
/// its registers, its addressable memory, and its remaining gas. A real VM
/// implements this over its own memory and register file; [`crate::mock::MockVm`]
/// implements it directly over a `Vec<u8>` and a register array.
pub trait VmExecutionContext {
    /// Reads `len` bytes starting at `offset` from the VM's addressable memory.
    fn read_memory(&self, offset: u32, len: u32) -> Result<Vec<u8>, ExitStatus>;

    /// Writes `data` starting at `offset` into the VM's addressable memory.
    fn write_memory(&mut self, offset: u32, data: &[u8]) -> Result<(), ExitStatus>;

    /// Reads register `index` (0..13).
    fn register(&self, index: usize) -> u64;

    /// Sets register `index` (0..13).
    fn set_register(&mut self, index: usize, value: u64);

    /// The gas remaining in the current invocation.
    fn gas_remaining(&self) -> Gas;

    /// Deducts `amount` gas, returning [`ExitStatus::OutOfGas`] if the
    /// invocation's budget is exhausted.
    fn deduct_gas(&mut self, amount: Gas) -> Result<(), ExitStatus>;
}

/// A host call's implementation: given the running invocation's execution
/// context and an opaque, caller-supplied host context `C` (the engine's
/// per-service accumulation context wrapper), mutate state and set R7.
pub type HostCallFn<C> = fn(&mut dyn VmExecutionContext, &mut C) -> Result<(), ExitStatus>;

/// The mapping from host-call id to implementation (§6 "Host-call dispatch table").
pub struct HostCallTable<C> {
    calls: BTreeMap<HostCallId, HostCallFn<C>>,
}

impl<C> Default for HostCallTable<C> {
    fn default() -> Self {
        Self {
            calls: BTreeMap::new(),
        }
    }
}

impl<C> HostCallTable<C> {
    /// An empty dispatch table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `implementation` under `id`, replacing any prior registration.
    pub fn register(&mut self, id: HostCallId, implementation: HostCallFn<C>) {
        self.calls.insert(id, implementation);
    }

    /// Looks up the implementation registered for `id`.
    pub fn get(&self, id: HostCallId) -> Option<HostCallFn<C>> {
        self.calls.get(&id).copied()
    }

    /// Dispatches `id` against `ctx`/`host_ctx`. An unrecognized id deducts
    /// [`UNKNOWN_CALL_GAS_PENALTY`] gas and continues rather than trapping.
    pub fn dispatch(
        &self,
        id: HostCallId,
        ctx: &mut dyn VmExecutionContext,
        host_ctx: &mut C,
    ) -> Result<(), ExitStatus> {
        match self.get(id) {
            Some(implementation) => implementation(ctx, host_ctx),
            None => ctx.deduct_gas(UNKNOWN_CALL_GAS_PENALTY),
        }
    }
}
