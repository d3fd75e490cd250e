//! A deterministic, scriptable VM test double.
//!
//! The real VM is an external black box (§1): this crate never parses or
//! interprets actual service bytecode. [`MockVm`] instead interprets
//! `code_bytes` as an encoded [`MockProgram`] script, letting engine tests
//! construct exact, reproducible VM behavior (a fixed output, an out-of-gas
//! trap, a panic, or one host-call dispatch followed by a halt) without a
//! real WebAssembly-like interpreter.

use crate::host::{HostCallId, HostCallTable, VmExecutionContext};
use crate::invoke::{EntryIndex, ExitStatus, InvocationResult, VmInvoker};
use jam_types::Gas;
use parity_scale_codec::{Decode, Encode};

/// A scripted VM invocation outcome, encoded into `code_bytes` for [`MockVm`].
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum MockProgram {
    /// Consume `gas_cost` and halt, leaving `output` as the result buffer.
    Halt {
        /// Gas consumed before halting.
        gas_cost: Gas,
        /// The bytes the invocation produces.
        output: Vec<u8>,
    },
    /// Consume the entire gas limit and report out-of-gas.
    OutOfGas,
    /// Trap immediately.
    Panic,
    /// Dispatch `call_id` once against the supplied host-call table, then
    /// consume `gas_cost` and halt with `output`.
    InvokeHostThenHalt {
        /// The host call to dispatch before halting.
        call_id: HostCallId,
        /// Gas consumed by the host call plus the halt.
        gas_cost: Gas,
        /// The bytes the invocation produces after the host call runs.
        output: Vec<u8>,
    },
}

/// The in-memory execution context [`MockVm`] runs a [`MockProgram`] against:
/// a flat byte buffer standing in for VM memory, and a 13-register file.
struct MockExecutionContext {
    memory: Vec<u8>,
    registers: [u64; 13],
    gas_remaining: Gas,
}

impl VmExecutionContext for MockExecutionContext {
    fn read_memory(&self, offset: u32, len: u32) -> Result<Vec<u8>, ExitStatus> {
        let start = offset as usize;
        let end = start.saturating_add(len as usize);
        self.memory.get(start..end).map(<[u8]>::to_vec).ok_or(ExitStatus::Panic)
    }

    fn write_memory(&mut self, offset: u32, data: &[u8]) -> Result<(), ExitStatus> {
        let start = offset as usize;
        let end = start.saturating_add(data.len());
        if end > self.memory.len() {
            self.memory.resize(end, 0);
        }
        match self.memory.get_mut(start..end) {
            Some(slice) => {
                slice.copy_from_slice(data);
                Ok(())
            }
            None => Err(ExitStatus::Panic),
        }
    }

    fn register(&self, index: usize) -> u64 {
        self.registers.get(index).copied().unwrap_or(0)
    }

    fn set_register(&mut self, index: usize, value: u64) {
        if let Some(slot) = self.registers.get_mut(index) {
            *slot = value;
        }
    }

    fn gas_remaining(&self) -> Gas {
        self.gas_remaining
    }

    fn deduct_gas(&mut self, amount: Gas) -> Result<(), ExitStatus> {
        if amount > self.gas_remaining {
            self.gas_remaining = 0;
            return Err(ExitStatus::OutOfGas);
        }
        self.gas_remaining -= amount;
        Ok(())
    }
}

/// A deterministic VM engine that interprets `code_bytes` as an encoded
/// [`MockProgram`] rather than running real bytecode.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockVm;

impl<C> VmInvoker<C> for MockVm {
    fn invoke(
        &self,
        code_bytes: &[u8],
        _entry_index: EntryIndex,
        gas_limit: Gas,
        args_buffer: &[u8],
        host_calls: &HostCallTable<C>,
        host_ctx: &mut C,
    ) -> InvocationResult {
        let program = match MockProgram::decode(&mut &code_bytes[..]) {
            Ok(program) => program,
            Err(_) => {
                return InvocationResult {
                    exit_status: ExitStatus::Panic,
                    gas_used: gas_limit,
                    registers: [0; 13],
                    memory_snapshot: None,
                }
            }
        };

        let mut ctx = MockExecutionContext {
            memory: args_buffer.to_vec(),
            registers: [0; 13],
            gas_remaining: gas_limit,
        };

        let outcome = match program {
            MockProgram::Halt { gas_cost, output } => ctx.deduct_gas(gas_cost).map(|()| output),
            MockProgram::OutOfGas => Err(ExitStatus::OutOfGas),
            MockProgram::Panic => Err(ExitStatus::Panic),
            MockProgram::InvokeHostThenHalt {
                call_id,
                gas_cost,
                output,
            } => host_calls
                .dispatch(call_id, &mut ctx, host_ctx)
                .and_then(|()| ctx.deduct_gas(gas_cost))
                .map(|()| output),
        };

        match outcome {
            Ok(output) => {
                let gas_used = gas_limit.saturating_sub(ctx.gas_remaining());
                if ctx.write_memory(0, &output).is_err() {
                    return InvocationResult {
                        exit_status: ExitStatus::Panic,
                        gas_used,
                        registers: ctx.registers,
                        memory_snapshot: None,
                    };
                }
                ctx.set_register(0, 0);
                ctx.set_register(1, output.len() as u64);
                InvocationResult {
                    exit_status: ExitStatus::Halt,
                    gas_used,
                    registers: ctx.registers,
                    memory_snapshot: Some(ctx.memory),
                }
            }
            Err(ExitStatus::OutOfGas) => InvocationResult {
                exit_status: ExitStatus::OutOfGas,
                gas_used: gas_limit,
                registers: [0; 13],
                memory_snapshot: None,
            },
            Err(_) => InvocationResult {
                exit_status: ExitStatus::Panic,
                gas_used: gas_limit.saturating_sub(ctx.gas_remaining()),
                registers: [0; 13],
                memory_snapshot: None,
            },
        }
    }
}
