//! Parallelised per-service accumulation (§4.3): grouping a batch's operands
//! by destination service, running each service against an isolated deep
//! clone of the batch's starting context, and merging the results back.

use jam_state::AccumulationContext;
use jam_types::{AccumulationOperand, Gas, OperandOutput, ServiceId, WorkOutput, WorkReport};
use jam_vm::VmInvoker;
use rayon::prelude::*;
use std::collections::BTreeMap;

use crate::host_calls::ServiceHostContext;
use crate::single_service::{accumulate_single_service, build_argument_buffer, SingleServiceOutcome};

/// Groups every `WorkResult` across `reports` by destination service, in the
/// order each service's first operand was observed (§4.3), carrying the
/// summed `accumulate_gas` each service's operands contribute (§4.4).
pub fn group_operands_by_service(
    reports: &[WorkReport],
) -> Vec<(ServiceId, Vec<AccumulationOperand>, Gas)> {
    let mut order: Vec<ServiceId> = Vec::new();
    let mut grouped: BTreeMap<ServiceId, (Vec<AccumulationOperand>, Gas)> = BTreeMap::new();

    for report in reports {
        for result in &report.results {
            let operand = AccumulationOperand {
                work_package_hash: report.package_spec.hash,
                payload_hash: result.payload_hash,
                authorization_output: report.auth_output.clone(),
                output: match &result.output {
                    WorkOutput::Success(bytes) => OperandOutput::Success(bytes.clone()),
                    WorkOutput::Error(error) => OperandOutput::Error(*error),
                },
            };
            if !grouped.contains_key(&result.service_id) {
                order.push(result.service_id);
            }
            let entry = grouped.entry(result.service_id).or_insert_with(|| (Vec::new(), 0));
            entry.1 = entry.1.saturating_add(result.accumulate_gas);
            entry.0.push(operand);
        }
    }

    order
        .into_iter()
        .map(|service_id| {
            let (operands, gas) = grouped.remove(&service_id).expect("every ordered id was inserted");
            (service_id, operands, gas)
        })
        .collect()
}

/// One service's outcome from a batch, paired with the operand count it was
/// invoked with (for statistics, §4.9).
pub struct BatchMemberOutcome {
    /// The service that ran.
    pub service_id: ServiceId,
    /// Its isolated, post-invocation outcome.
    pub outcome: SingleServiceOutcome,
    /// The number of operands it was invoked with (0 for a privileged
    /// service invoked with no queued operand this block).
    pub operand_count: usize,
}

/// Runs every service in `batch` against its own deep clone of `context`
/// (§4.3), invoking the VM in parallel via `rayon`, then merges each
/// service's mutations back into a single post-batch context.
///
/// Merging relies on an engine invariant the host-call surface maintains: a
/// service's accumulation step only ever mutates its own account plus, when
/// it calls `new`, a freshly minted child id no other service in the batch
/// can also claim (candidate ids are derived from the creator's own id).
/// Under that invariant, a batch's merged `delta` is exactly each service's
/// own final account, plus the union of any new accounts it created — no
/// cross-service write ever needs arbitration here, so the genuinely
/// contested case (the privileged `chi` fields) is left to the Chi Merger
/// (§4.6) rather than handled by taking "the last committed clone".
pub fn accumulate_batch<V>(
    vm: &V,
    code_resolver: &(dyn Fn(ServiceId, &AccumulationContext) -> Option<Vec<u8>> + Sync),
    batch: &[ServiceId],
    operand_index: &BTreeMap<ServiceId, (Vec<AccumulationOperand>, Gas)>,
    context: &AccumulationContext,
) -> (AccumulationContext, Vec<BatchMemberOutcome>)
where
    V: for<'a> VmInvoker<ServiceHostContext<'a>> + Sync,
{
    let pre_batch_ids: std::collections::BTreeSet<ServiceId> =
        context.delta.read().keys().copied().collect();

    let results: Vec<(ServiceId, SingleServiceOutcome, usize)> = batch
        .par_iter()
        .map(|service_id| {
            let (operands, gas_sum) = operand_index
                .get(service_id)
                .cloned()
                .unwrap_or((Vec::new(), 0));
            let clone = context.deep_clone();
            let args = build_argument_buffer(context.time_slot, *service_id, &operands);
            let limit = crate::single_service::resolve_gas_limit(clone.chi.read(), *service_id, gas_sum)
                .unwrap_or(0);
            let code = code_resolver(*service_id, &clone);
            let outcome = match code {
                Some(bytes) => accumulate_single_service(vm, &bytes, limit, &args, *service_id, clone),
                None => SingleServiceOutcome {
                    context: clone,
                    transfers: Vec::new(),
                    output: None,
                    gas_used: 0,
                },
            };
            (*service_id, outcome, operands.len())
        })
        .collect();

    let mut merged = context.clone();
    let mut chi_candidates = Vec::with_capacity(results.len());
    let mut outcomes = Vec::with_capacity(results.len());

    for (service_id, outcome, operand_count) in results {
        {
            let source = outcome.context.delta.read();
            let own_account = source.get(&service_id).cloned();
            let new_ids: Vec<ServiceId> = source
                .keys()
                .filter(|id| !pre_batch_ids.contains(id))
                .copied()
                .collect();
            let new_accounts: Vec<_> = new_ids
                .iter()
                .map(|id| (*id, source.get(id).cloned()))
                .collect();
            drop(source);

            let target = merged.delta.mutate();
            if let Some(account) = own_account {
                target.insert(service_id, account);
            }
            for (id, account) in new_accounts {
                if let Some(account) = account {
                    target.insert(id, account);
                }
            }
        }
        chi_candidates.push(outcome.context.chi.read().clone());
        outcomes.push(BatchMemberOutcome {
            service_id,
            outcome,
            operand_count,
        });
    }

    let merged_chi = crate::chi_merge::merge_chi(context.chi.read(), &chi_candidates);
    *merged.chi.mutate() = merged_chi;

    (merged, outcomes)
}
