//! Deferred-transfer dispatch (§4.8): the second pass, run once every
//! service in a block has accumulated, that credits and invokes each
//! transfer's destination.

use jam_state::AccumulationContext;
use jam_types::{BlockAccumulationStats, DeferredTransfer, Gas, ServiceId};
use jam_vm::VmInvoker;
use std::collections::BTreeMap;

use crate::host_calls::ServiceHostContext;
use crate::single_service::{accumulate_on_transfer, build_transfer_argument_buffer};

/// Groups `transfers` by destination and invokes each destination's
/// `on_transfer` entry point once, in ascending destination order, with the
/// combined gas limit of every transfer addressed to it (§4.8). The
/// destination's balance is credited up front regardless of whether the
/// invocation runs, matching the transfer's "delivery" semantics; if its
/// code preimage cannot be resolved, the invocation is skipped but the
/// credit stands.
pub fn dispatch_transfers<V>(
    vm: &V,
    code_resolver: &(dyn Fn(ServiceId, &AccumulationContext) -> Option<Vec<u8>> + Sync),
    transfers: Vec<DeferredTransfer>,
    mut context: AccumulationContext,
    stats: &mut BlockAccumulationStats,
) -> AccumulationContext
where
    V: for<'a> VmInvoker<ServiceHostContext<'a>>,
{
    let mut by_destination: BTreeMap<ServiceId, Vec<DeferredTransfer>> = BTreeMap::new();
    for transfer in transfers {
        by_destination.entry(transfer.destination).or_default().push(transfer);
    }

    for (destination, group) in by_destination {
        let credited: Gas = group.iter().map(|t| t.amount).sum();
        let destination_exists = {
            let delta = context.delta.mutate();
            match delta.get_mut(&destination) {
                Some(account) => {
                    account.balance = account.balance.saturating_add(credited);
                    true
                }
                None => false,
            }
        };
        if !destination_exists {
            continue;
        }

        let code_bytes = code_resolver(destination, &context);
        let combined_gas: Gas = group.iter().map(|t| t.gas_limit).sum();
        let transfer_count = group.len() as u32;

        let code_bytes = match code_bytes {
            Some(bytes) => bytes,
            None => {
                stats.record_transfer(destination, transfer_count, 0);
                continue;
            }
        };

        let args = build_transfer_argument_buffer(context.time_slot, destination, &group);
        let outcome = accumulate_on_transfer(vm, &code_bytes, combined_gas, &args, destination, context);
        context = outcome.context;
        stats.record_transfer(destination, transfer_count, outcome.gas_used);
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_state::DeltaSnapshot;
    use jam_types::{AuthorizerQueue, Chi, Delta, Hash, ServiceAccount, ValidatorSet};
    use jam_vm::mock::MockVm;
    use std::collections::BTreeMap as Map;

    fn account(balance: u64) -> ServiceAccount {
        ServiceAccount {
            storage: Map::new(),
            preimages: Map::new(),
            preimage_lookups: Map::new(),
            code_hash: Hash::ZERO,
            balance,
            min_gas_accumulate: 0,
            min_gas_on_transfer: 0,
            creation_slot: 0,
            last_accumulation_slot: 0,
            parent_service: None,
            storage_offset: 0,
        }
    }

    fn empty_context() -> AccumulationContext {
        let mut delta = Delta::new();
        delta.insert(ServiceId(1), account(500));
        AccumulationContext::new(
            DeltaSnapshot::new(delta),
            ValidatorSet::new(),
            AuthorizerQueue::new(),
            Chi {
                manager: ServiceId(0),
                always_accumulate: Default::default(),
                assign: Vec::new(),
                designate: ServiceId(0),
                registrar: ServiceId(0),
            },
            1,
            Hash::ZERO,
        )
    }

    #[test]
    fn missing_code_still_credits_balance_but_skips_invocation() {
        let transfer = DeferredTransfer {
            sender: ServiceId(2),
            destination: ServiceId(1),
            amount: 50,
            memo: [0u8; jam_types::TRANSFER_MEMO_LEN],
            gas_limit: 10,
        };
        let mut stats = BlockAccumulationStats::new();
        let vm = MockVm;
        let resolved = dispatch_transfers(&vm, &|_, _| None, vec![transfer], empty_context(), &mut stats);

        assert_eq!(resolved.delta.read().get(&ServiceId(1)).unwrap().balance, 550);
        assert_eq!(stats.transfer_stats.get(&ServiceId(1)).unwrap().transfer_count, 1);
        assert_eq!(stats.transfer_stats.get(&ServiceId(1)).unwrap().gas_used, 0);
    }

    #[test]
    fn transfer_to_unknown_destination_is_dropped() {
        let transfer = DeferredTransfer {
            sender: ServiceId(2),
            destination: ServiceId(99),
            amount: 50,
            memo: [0u8; jam_types::TRANSFER_MEMO_LEN],
            gas_limit: 10,
        };
        let mut stats = BlockAccumulationStats::new();
        let vm = MockVm;
        let resolved = dispatch_transfers(&vm, &|_, _| None, vec![transfer], empty_context(), &mut stats);

        assert!(resolved.delta.read().get(&ServiceId(99)).is_none());
        assert!(stats.transfer_stats.is_empty());
    }
}
