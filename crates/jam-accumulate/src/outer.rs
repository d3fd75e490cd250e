//! The outer, gas-bounded accumulation batching loop (§4.2): admits whole
//! reports into each batch in order, groups a batch's own operands by
//! destination service, then processes batches in strictly sequential order
//! so each observes the previous batch's committed state, while every
//! service within one batch runs in parallel isolation (§4.3).

use jam_state::AccumulationContext;
use jam_types::{AccumulateOutput, BlockAccumulationStats, DeferredTransfer, Gas, Hash, ServiceId, WorkReport};
use jam_vm::VmInvoker;
use std::collections::BTreeMap;

use crate::host_calls::ServiceHostContext;
use crate::parallel::{accumulate_batch, group_operands_by_service};
use crate::single_service::resolve_gas_limit;

/// Everything the outer loop produces for one block.
pub struct OuterAccumulationResult {
    /// The context folded with every batch's merged commits.
    pub context: AccumulationContext,
    /// Every transfer queued by any service this block, for the deferred
    /// dispatch pass (§4.8).
    pub transfers: Vec<DeferredTransfer>,
    /// The digest each service yielded, keyed by service id.
    pub outputs: BTreeMap<ServiceId, AccumulateOutput>,
    /// Per-service accumulation statistics.
    pub stats: BlockAccumulationStats,
    /// Package hashes of every report that actually ran this block, in a
    /// batch that executed — as opposed to every report the dependency
    /// resolver merely judged ready, some of which may never have fit a
    /// batch's gas budget (§4.9's history update must only ever see the
    /// former).
    pub accumulated_report_hashes: Vec<Hash>,
}

/// Runs the gas-bounded batching loop over `ready` reports (§4.2).
///
/// Reports are the atomic unit of batch admission: walking `ready` in order,
/// a whole report joins the current batch only if the sum of its own
/// results' `accumulate_gas` still fits the batch's remaining share of
/// `gas_budget_per_block`; the first report that does not fit stops that
/// batch (and, if the batch is otherwise empty, the whole loop) rather than
/// being admitted anyway or splitting its results across batches. Only the
/// very first batch additionally and unconditionally includes every
/// privileged always-accumulate service, whether or not it has a queued
/// operand this block. A service whose resolved gas limit is zero (no
/// privilege, no operands, or an explicit zero) is skipped without
/// consuming a batch slot.
pub fn run_outer_accumulation<V>(
    vm: &V,
    code_resolver: &(dyn Fn(ServiceId, &AccumulationContext) -> Option<Vec<u8>> + Sync),
    ready: &[WorkReport],
    mut context: AccumulationContext,
    gas_budget_per_block: Gas,
) -> OuterAccumulationResult
where
    V: for<'a> VmInvoker<ServiceHostContext<'a>> + Sync,
{
    let mut transfers = Vec::new();
    let mut outputs = BTreeMap::new();
    let mut stats = BlockAccumulationStats::new();
    let mut accumulated_report_hashes = Vec::new();
    let mut remaining_budget = gas_budget_per_block;
    let mut cursor = 0;
    let mut first_batch = true;

    loop {
        if remaining_budget == 0 || (cursor >= ready.len() && !first_batch) {
            break;
        }

        // Admit whole reports, in order, while their combined accumulate
        // gas still fits what's left of the block's budget.
        let batch_start = cursor;
        let mut batch_report_gas: Gas = 0;
        while cursor < ready.len() {
            let report_gas: Gas = ready[cursor].results.iter().map(|r| r.accumulate_gas).sum();
            if batch_report_gas.saturating_add(report_gas) > remaining_budget {
                break;
            }
            batch_report_gas = batch_report_gas.saturating_add(report_gas);
            cursor += 1;
        }
        let batch_reports = &ready[batch_start..cursor];

        let grouped = group_operands_by_service(batch_reports);
        let operand_index: BTreeMap<ServiceId, (Vec<_>, Gas)> = grouped
            .iter()
            .map(|(id, operands, gas)| (*id, (operands.clone(), *gas)))
            .collect();

        let mut batch_candidates: Vec<ServiceId> = Vec::new();
        if first_batch {
            for (id, _) in context.chi.read().always_accumulate.iter() {
                if !batch_candidates.contains(&id) {
                    batch_candidates.push(id);
                }
            }
        }
        for (id, _, _) in &grouped {
            if !batch_candidates.contains(id) {
                batch_candidates.push(*id);
            }
        }
        first_batch = false;

        let mut batch: Vec<ServiceId> = Vec::new();
        let mut batch_gas: Gas = 0;
        for service_id in batch_candidates {
            let operand_gas_sum = operand_index.get(&service_id).map(|(_, gas)| *gas).unwrap_or(0);
            if let Some(limit) = resolve_gas_limit(context.chi.read(), service_id, operand_gas_sum) {
                batch.push(service_id);
                batch_gas = batch_gas.saturating_add(limit);
            }
        }

        if batch.is_empty() {
            break;
        }

        accumulated_report_hashes.extend(batch_reports.iter().map(|r| r.package_spec.hash));

        let (merged_context, outcomes) = accumulate_batch(vm, code_resolver, &batch, &operand_index, &context);
        context = merged_context;
        remaining_budget = remaining_budget.saturating_sub(batch_gas.min(remaining_budget));

        for member in outcomes {
            let service_id = member.service_id;
            transfers.extend(member.outcome.transfers);
            if let Some(output) = member.outcome.output {
                outputs.insert(service_id, output);
            }
            let occurrences = member.operand_count.max(1);
            for i in 0..occurrences {
                let gas = if i == 0 { member.outcome.gas_used } else { 0 };
                stats.record_accumulation(service_id, gas);
            }
        }
    }

    OuterAccumulationResult {
        context,
        transfers,
        outputs,
        stats,
        accumulated_report_hashes,
    }
}
