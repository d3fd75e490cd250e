//! The frozen `invoke` contract the engine depends on (§6).

use crate::host::HostCallTable;
use jam_types::Gas;

/// The entry point index for a service's `accumulate` function.
pub const ENTRY_ACCUMULATE: EntryIndex = 5;
/// The entry point index for a service's `on_transfer` function.
pub const ENTRY_ON_TRANSFER: EntryIndex = 10;

/// A VM entry-point index. The engine invokes only [`ENTRY_ACCUMULATE`] and
/// [`ENTRY_ON_TRANSFER`]; it never depends on any other VM surface (§6).
pub type EntryIndex = u32;

/// How a single VM invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The program ran to completion within its gas limit.
    Halt,
    /// The invocation exhausted its gas limit; the full limit is consumed.
    OutOfGas,
    /// The program panicked: an invalid opcode or a memory fault.
    Panic,
}

/// The result of one VM invocation (§6): the final register file, the exit
/// condition, gas actually consumed, and an optional memory snapshot for
/// invocations that modify addressable memory the caller needs back (most
/// accumulation invocations only need the returned registers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// How the invocation ended.
    pub exit_status: ExitStatus,
    /// Gas actually consumed. Equals the gas limit exactly on [`ExitStatus::OutOfGas`].
    pub gas_used: Gas,
    /// The general-purpose register file after the invocation halted or trapped.
    pub registers: [u64; 13],
    /// The VM's addressable memory after the invocation, if the caller requested it.
    pub memory_snapshot: Option<Vec<u8>>,
}

/// The frozen invocation contract a VM engine must satisfy (§6):
/// `invoke(code_bytes, entry_index, gas_limit, args_buffer, host_calls, host_ctx)`.
///
/// Implementations are black boxes to the engine: it supplies code, an entry
/// point, a gas budget, an argument buffer, and a host-call dispatch table,
/// and receives back an [`InvocationResult`]. The engine never inspects the
/// implementation's internal bytecode format, memory layout, or register
/// convention beyond what this contract exposes.
pub trait VmInvoker<C> {
    /// Invokes `entry_index` in the program `code_bytes`, with `args_buffer`
    /// placed at a VM-defined location in memory, a budget of `gas_limit`,
    /// and `host_calls` available for the program to call into `host_ctx`.
    fn invoke(
        &self,
        code_bytes: &[u8],
        entry_index: EntryIndex,
        gas_limit: Gas,
        args_buffer: &[u8],
        host_calls: &HostCallTable<C>,
        host_ctx: &mut C,
    ) -> InvocationResult;
}
