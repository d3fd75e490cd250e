//! The accumulation engine's top-level entry point: wires dependency
//! resolution (§4.1), the gas-bounded outer loop (§4.2/§4.3), deferred
//! transfer dispatch (§4.8), and the history/root/queue write-back (§4.9)
//! into one per-block call.

use jam_state::AccumulationContext;
use jam_types::error::CoreError;
use jam_types::{BlockAccumulationStats, Gas, Hash, ServiceId, Theta, WorkReport, Xi};
use jam_vm::VmInvoker;
use tracing::{debug, info, instrument};

use crate::commitment::{compute_accumulate_root, record_history, write_back_pending_queue};
use crate::dependency::resolve_dependencies;
use crate::host_calls::ServiceHostContext;
use crate::outer::run_outer_accumulation;
use crate::transfer_dispatch::dispatch_transfers;

/// Everything one block's accumulation step needs beyond the reports
/// themselves.
pub struct AccumulationInput {
    /// Work reports becoming available for accumulation this block.
    pub reports: Vec<WorkReport>,
    /// The pre-block state tuple.
    pub context: AccumulationContext,
    /// The recently-accumulated-package history.
    pub xi: Xi,
    /// The queue of reports still waiting on prerequisites.
    pub theta: Theta,
    /// The in-epoch slot this block occupies, used for `Theta` bookkeeping.
    pub current_slot: usize,
    /// The epoch length, used to compute the write-back slot for residual
    /// reports (§4.9).
    pub epoch_length: usize,
    /// The total gas the outer loop may spend across all its batches (§4.2).
    pub gas_budget_per_block: Gas,
}

/// Everything one block's accumulation step produces.
pub struct AccumulationOutcome {
    /// The posterior state tuple.
    pub context: AccumulationContext,
    /// The posterior history.
    pub xi: Xi,
    /// The posterior pending-report queue.
    pub theta: Theta,
    /// The block's `AccumulateRoot` (§4.9).
    pub accumulate_root: Hash,
    /// Per-service and per-destination statistics (§4.9).
    pub stats: BlockAccumulationStats,
}

/// Runs one block's full accumulation step.
///
/// `code_resolver` looks up a service's current code preimage against a
/// given context snapshot; it returns `None` when the preimage is
/// unavailable, in which case the affected service (or transfer
/// destination) is simply not invoked this block.
#[instrument(skip_all, fields(reports = reports_len(&input), slot = input.current_slot))]
pub fn run_block_accumulation<V>(
    vm: &V,
    code_resolver: &(dyn Fn(ServiceId, &AccumulationContext) -> Option<Vec<u8>> + Sync),
    input: AccumulationInput,
) -> Result<AccumulationOutcome, CoreError>
where
    V: for<'a> VmInvoker<ServiceHostContext<'a>> + Sync,
{
    let AccumulationInput {
        reports,
        context,
        mut xi,
        mut theta,
        current_slot,
        epoch_length,
        gas_budget_per_block,
    } = input;

    let resolved = resolve_dependencies(reports, &xi, &mut theta, current_slot);
    debug!(
        ready = resolved.ready.len(),
        still_pending = resolved.still_pending.len(),
        "dependency resolution complete"
    );

    let outer_result = run_outer_accumulation(
        vm,
        code_resolver,
        &resolved.ready,
        context,
        gas_budget_per_block,
    );
    debug!(
        services = outer_result.stats.service_stats.len(),
        transfers = outer_result.transfers.len(),
        "outer accumulation complete"
    );

    let accumulated_hashes = outer_result.accumulated_report_hashes;
    let mut stats = outer_result.stats;
    let context = dispatch_transfers(vm, code_resolver, outer_result.transfers, outer_result.context, &mut stats);

    let accumulate_root = compute_accumulate_root(&outer_result.outputs).map_err(|e| CoreError::Crypto(e.to_string()))?;

    record_history(&mut xi, &accumulated_hashes);

    let next_slot = (current_slot + 1) % epoch_length.max(1);
    write_back_pending_queue(&mut theta, resolved.still_pending, next_slot);

    info!(
        accumulated = accumulated_hashes.len(),
        root = %hex_prefix(&accumulate_root),
        "block accumulation complete"
    );

    Ok(AccumulationOutcome {
        context,
        xi,
        theta,
        accumulate_root,
        stats,
    })
}

fn reports_len(input: &AccumulationInput) -> usize {
    input.reports.len()
}

fn hex_prefix(hash: &Hash) -> String {
    hash.as_ref()[..4].iter().map(|b| format!("{b:02x}")).collect()
}
