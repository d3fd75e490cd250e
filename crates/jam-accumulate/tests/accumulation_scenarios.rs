//! End-to-end scenarios exercising `run_block_accumulation`'s full wire-up:
//! dependency resolution, the gas-bounded outer loop, and the history/root
//! write-back, without reaching into any single module's internals.

use jam_accumulate::{run_block_accumulation, AccumulationInput};
use jam_state::{AccumulationContext, DeltaSnapshot};
use jam_types::{
    AlwaysAccumulate, AuthorizerQueue, Chi, Delta, Gas, Hash, PackageSpec, ServiceAccount, ServiceId,
    Theta, ValidatorSet, WorkContext, WorkOutput, WorkReport, WorkResult, Xi,
};
use jam_vm::mock::{MockProgram, MockVm};
use parity_scale_codec::Encode;

fn account(balance: u64) -> ServiceAccount {
    ServiceAccount {
        storage: Default::default(),
        preimages: Default::default(),
        preimage_lookups: Default::default(),
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

fn context_with(accounts: Vec<(ServiceId, u64)>, chi: Chi) -> AccumulationContext {
    let mut delta = Delta::new();
    for (id, balance) in accounts {
        delta.insert(id, account(balance));
    }
    AccumulationContext::new(
        DeltaSnapshot::new(delta),
        ValidatorSet::new(),
        AuthorizerQueue::new(),
        chi,
        0,
        Hash::ZERO,
    )
}

fn default_chi() -> Chi {
    Chi {
        manager: ServiceId(0),
        always_accumulate: AlwaysAccumulate::new(),
        assign: Vec::new(),
        designate: ServiceId(0),
        registrar: ServiceId(0),
    }
}

fn report(hash_byte: u8, prerequisites: Vec<Hash>, service_id: ServiceId, accumulate_gas: Gas) -> WorkReport {
    WorkReport {
        package_spec: PackageSpec {
            hash: Hash([hash_byte; 32]),
            length: 0,
            erasure_root: Hash::ZERO,
            exports_root: Hash::ZERO,
            exports_count: 0,
        },
        context: WorkContext {
            prerequisites,
            ..Default::default()
        },
        core_index: 0,
        authorizer_hash: Hash::ZERO,
        auth_output: Vec::new(),
        segment_root_lookup: Vec::new(),
        results: vec![WorkResult {
            service_id,
            accumulate_gas,
            payload_hash: Hash::ZERO,
            output: WorkOutput::Success(Vec::new()),
        }],
    }
}

fn halt_code(gas_cost: Gas) -> Vec<u8> {
    MockProgram::Halt { gas_cost, output: Vec::new() }.encode()
}

fn input(reports: Vec<WorkReport>, context: AccumulationContext, gas_budget: Gas) -> AccumulationInput {
    AccumulationInput {
        reports,
        context,
        xi: Xi::new(8),
        theta: Theta::new(12),
        current_slot: 0,
        epoch_length: 12,
        gas_budget_per_block: gas_budget,
    }
}

/// S1: an empty block leaves every queue untouched and commits to the
/// canonical empty-sequence root.
#[test]
fn empty_block_commits_the_canonical_empty_root() {
    let vm = MockVm;
    let context = context_with(vec![(ServiceId(1), 1_000)], default_chi());
    let outcome = run_block_accumulation(&vm, &|_, _| None, input(Vec::new(), context, 10_000)).expect("succeeds");

    assert_eq!(outcome.accumulate_root.0, jam_crypto::keccak_256(&[]));
    assert!(outcome.xi.contains_work_package(&Hash::ZERO) == false);
    assert!(outcome.theta.is_empty());
    assert!(outcome.stats.service_stats.is_empty());
}

/// S2: a single ready report addressed to one service accumulates
/// immediately and is recorded in both the per-service stats and history.
#[test]
fn single_report_accumulates_immediately_and_enters_history() {
    let vm = MockVm;
    let context = context_with(vec![(ServiceId(7), 1_000)], default_chi());
    let reports = vec![report(1, Vec::new(), ServiceId(7), 500)];
    let code_resolver = |_: ServiceId, _: &AccumulationContext| Some(halt_code(20));

    let outcome = run_block_accumulation(&vm, &code_resolver, input(reports, context, 10_000)).expect("succeeds");

    let stats = outcome.stats.service_stats.get(&ServiceId(7)).expect("service ran");
    assert_eq!(stats.accumulated_count, 1);
    assert_eq!(stats.gas_used, 20);
    assert!(outcome.xi.contains_work_package(&Hash([1u8; 32])));
}

/// S3: a report whose only prerequisite is another report landing in the
/// very same block is promoted and accumulates in the same pass, rather
/// than being written back to the pending queue.
#[test]
fn dependent_report_is_promoted_within_the_same_block() {
    let vm = MockVm;
    let context = context_with(vec![(ServiceId(1), 1_000), (ServiceId(2), 1_000)], default_chi());
    let base = report(1, Vec::new(), ServiceId(1), 200);
    let dependent = report(2, vec![Hash([1u8; 32])], ServiceId(2), 200);
    let code_resolver = |_: ServiceId, _: &AccumulationContext| Some(halt_code(10));

    let outcome =
        run_block_accumulation(&vm, &code_resolver, input(vec![base, dependent], context, 10_000)).expect("succeeds");

    assert!(outcome.theta.is_empty(), "nothing should remain queued");
    assert!(outcome.stats.service_stats.contains_key(&ServiceId(1)));
    assert!(outcome.stats.service_stats.contains_key(&ServiceId(2)));
    assert!(outcome.xi.contains_work_package(&Hash([1u8; 32])));
    assert!(outcome.xi.contains_work_package(&Hash([2u8; 32])));
}

/// Mirrors the unsatisfied-prerequisite case at the engine level: a report
/// whose dependency never shows up this block is written back to `Theta`
/// instead of accumulating.
#[test]
fn report_with_an_unmet_prerequisite_is_queued_not_accumulated() {
    let vm = MockVm;
    let context = context_with(vec![(ServiceId(1), 1_000)], default_chi());
    let stuck = report(2, vec![Hash([9u8; 32])], ServiceId(1), 200);
    let code_resolver = |_: ServiceId, _: &AccumulationContext| Some(halt_code(10));

    let outcome = run_block_accumulation(&vm, &code_resolver, input(vec![stuck], context, 10_000)).expect("succeeds");

    assert!(outcome.stats.service_stats.is_empty());
    assert!(!outcome.theta.is_empty());
    assert!(!outcome.xi.contains_work_package(&Hash([2u8; 32])));
}

/// S4: when the per-block gas budget can't cover every candidate's
/// resolved limit in one pass, the outer loop still processes every
/// candidate, just split across sequential batches — and a strict enough
/// budget confines it to exactly the services that fit the first batch.
#[test]
fn gas_budget_bounds_how_many_services_accumulate_this_block() {
    let vm = MockVm;
    let context = context_with(vec![(ServiceId(1), 1_000), (ServiceId(2), 1_000)], default_chi());
    let reports = vec![report(1, Vec::new(), ServiceId(1), 600), report(2, Vec::new(), ServiceId(2), 600)];
    let code_resolver = |_: ServiceId, _: &AccumulationContext| Some(halt_code(10));

    let outcome = run_block_accumulation(&vm, &code_resolver, input(reports, context, 800)).expect("succeeds");

    assert_eq!(outcome.stats.service_stats.len(), 1);
}

/// S6: of two candidates in the same batch, only the one whose call is
/// actually authorized moves a privileged `chi` field; the merged result
/// reflects that single divergence and leaves everything else untouched.
#[test]
fn chi_merge_keeps_the_one_authorized_divergence() {
    let mut always_accumulate = AlwaysAccumulate::new();
    always_accumulate.insert(ServiceId(1), 300);
    always_accumulate.insert(ServiceId(2), 300);
    let chi = Chi {
        manager: ServiceId(1),
        always_accumulate,
        assign: Vec::new(),
        designate: ServiceId(0),
        registrar: ServiceId(0),
    };
    let context = context_with(vec![(ServiceId(1), 1_000), (ServiceId(2), 1_000)], chi);

    let bless_code = MockProgram::InvokeHostThenHalt {
        call_id: jam_accumulate::host_calls::call_id::BLESS,
        gas_cost: 5,
        output: Vec::new(),
    }
    .encode();
    let halt_code = halt_code(5);

    let code_resolver = move |id: ServiceId, _: &AccumulationContext| {
        if id == ServiceId(1) {
            Some(bless_code.clone())
        } else {
            Some(halt_code.clone())
        }
    };

    let vm = MockVm;
    let outcome = run_block_accumulation(&vm, &code_resolver, input(Vec::new(), context, 10_000)).expect("succeeds");

    // `bless` with an all-zero register file asks to hand the manager role
    // to service 0; service 1 (the current manager) is authorized, service
    // 2 is not and never touches `chi`, so the merged manager is 0.
    assert_eq!(outcome.context.chi.read().manager, ServiceId(0));
    assert_eq!(outcome.context.chi.read().designate, ServiceId(0));
}
