//! Single-service accumulation (§4.4): gas-limit selection, argument-buffer
//! assembly, and the transactional VM invocation wrapper every batch member
//! and every deferred-transfer destination runs through.

use jam_state::AccumulationContext;
use jam_types::{AccumulationOperand, AccumulateOutput, Chi, DeferredTransfer, Gas, OperandOutput, ServiceId, Slot};
use jam_vm::{ExitStatus, VmInvoker, ENTRY_ACCUMULATE, ENTRY_ON_TRANSFER};

use crate::host_calls::{build_host_call_table, ServiceHostContext};

/// Resolves the gas limit a service's `accumulate` invocation runs with
/// (§4.4). `None` means the service is not invoked at all this batch: it is
/// neither privileged nor addressed by any operand, or its resolved limit is
/// zero.
pub fn resolve_gas_limit(chi: &Chi, service_id: ServiceId, operand_gas_sum: Gas) -> Option<Gas> {
    let limit = if let Some(privileged_gas) = chi.always_accumulate.get(service_id) {
        privileged_gas
    } else if operand_gas_sum > 0 {
        operand_gas_sum
    } else {
        return None;
    };
    (limit > 0).then_some(limit)
}

/// Serializes the `accumulate` argument buffer (§4.4): the time slot, the
/// target service id, the operand count, then each operand in turn —
/// `work_package_hash ‖ payload_hash ‖ len(auth_out) ‖ auth_out ‖ tag ‖ body`,
/// where `body` is present only for a success tag.
pub fn build_argument_buffer(time_slot: Slot, service_id: ServiceId, operands: &[AccumulationOperand]) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&time_slot.to_le_bytes());
    buffer.extend_from_slice(&service_id.0.to_le_bytes());
    buffer.extend_from_slice(&(operands.len() as u32).to_le_bytes());
    for operand in operands {
        buffer.extend_from_slice(operand.work_package_hash.as_ref());
        buffer.extend_from_slice(operand.payload_hash.as_ref());
        buffer.extend_from_slice(&(operand.authorization_output.len() as u32).to_le_bytes());
        buffer.extend_from_slice(&operand.authorization_output);
        buffer.push(operand.output.wire_tag());
        if let OperandOutput::Success(bytes) = &operand.output {
            buffer.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            buffer.extend_from_slice(bytes);
        }
    }
    buffer
}

/// Serializes the `on_transfer` argument buffer (§4.8, §6): the time slot,
/// the destination service id, the transfer count, then each transfer as
/// `sender ‖ destination ‖ amount ‖ memo[128] ‖ gas_limit`, all little-endian.
pub fn build_transfer_argument_buffer(time_slot: Slot, destination: ServiceId, transfers: &[DeferredTransfer]) -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&time_slot.to_le_bytes());
    buffer.extend_from_slice(&destination.0.to_le_bytes());
    buffer.extend_from_slice(&(transfers.len() as u32).to_le_bytes());
    for transfer in transfers {
        buffer.extend_from_slice(&transfer.sender.0.to_le_bytes());
        buffer.extend_from_slice(&transfer.destination.0.to_le_bytes());
        buffer.extend_from_slice(&transfer.amount.to_le_bytes());
        buffer.extend_from_slice(&transfer.memo);
        buffer.extend_from_slice(&transfer.gas_limit.to_le_bytes());
    }
    buffer
}

/// The result of running one entry-point invocation in isolation: its
/// committed context, any transfers it queued, the digest it yielded (if
/// any), and the gas it actually consumed.
pub struct SingleServiceOutcome {
    /// The context to fold back into the block, post-invocation.
    pub context: AccumulationContext,
    /// Transfers queued during the invocation, empty unless it halted (or a
    /// checkpoint survived a later failure).
    pub transfers: Vec<DeferredTransfer>,
    /// The digest the invocation yielded, if any.
    pub output: Option<AccumulateOutput>,
    /// Gas actually consumed, charged regardless of whether the invocation's
    /// state effects were ultimately kept or discarded.
    pub gas_used: Gas,
}

/// Runs one entry-point invocation to completion against an isolated clone
/// of `context` (§4.3 `deepClone`, §5 transactionality).
///
/// On [`ExitStatus::Halt`], every mutation the clone made is kept. On
/// [`ExitStatus::OutOfGas`] or [`ExitStatus::Panic`], a prior `checkpoint`
/// call's snapshot is kept instead, if one was taken; absent a checkpoint,
/// the clone's effects — including any queued transfers and any yielded
/// output — are discarded entirely, matching "its clone is discarded" (§5).
pub fn accumulate_entry_point<V>(
    vm: &V,
    code_bytes: &[u8],
    entry_index: jam_vm::EntryIndex,
    gas_limit: Gas,
    args_buffer: &[u8],
    service_id: ServiceId,
    context: AccumulationContext,
) -> SingleServiceOutcome
where
    V: for<'a> VmInvoker<ServiceHostContext<'a>>,
{
    let original = context.clone();
    let mut working = context;
    let mut transfers_out = Vec::new();
    let mut accumulation_output = None;
    let mut checkpoint: Option<AccumulationContext> = None;

    let table = build_host_call_table();
    let result = {
        let mut host_ctx = ServiceHostContext {
            context: &mut working,
            service_id,
            transfers_out: &mut transfers_out,
            accumulation_output: &mut accumulation_output,
            checkpoint: &mut checkpoint,
        };
        vm.invoke(code_bytes, entry_index, gas_limit, args_buffer, &table, &mut host_ctx)
    };

    let (final_context, transfers, output) = match result.exit_status {
        ExitStatus::Halt => (working, transfers_out, accumulation_output),
        ExitStatus::OutOfGas | ExitStatus::Panic => match checkpoint {
            Some(checkpointed) => (checkpointed, transfers_out, accumulation_output),
            None => (original, Vec::new(), None),
        },
    };

    SingleServiceOutcome {
        context: final_context,
        transfers,
        output,
        gas_used: result.gas_used,
    }
}

/// Convenience wrapper fixing the entry point to `accumulate` (§4.4).
pub fn accumulate_single_service<V>(
    vm: &V,
    code_bytes: &[u8],
    gas_limit: Gas,
    args_buffer: &[u8],
    service_id: ServiceId,
    context: AccumulationContext,
) -> SingleServiceOutcome
where
    V: for<'a> VmInvoker<ServiceHostContext<'a>>,
{
    accumulate_entry_point(vm, code_bytes, ENTRY_ACCUMULATE, gas_limit, args_buffer, service_id, context)
}

/// Convenience wrapper fixing the entry point to `on_transfer` (§4.8).
pub fn accumulate_on_transfer<V>(
    vm: &V,
    code_bytes: &[u8],
    gas_limit: Gas,
    args_buffer: &[u8],
    service_id: ServiceId,
    context: AccumulationContext,
) -> SingleServiceOutcome
where
    V: for<'a> VmInvoker<ServiceHostContext<'a>>,
{
    accumulate_entry_point(vm, code_bytes, ENTRY_ON_TRANSFER, gas_limit, args_buffer, service_id, context)
}
