//! The Chi Merger (§4.6): folds every service's candidate `Chi` clone back
//! into one post-batch value, field by field, using the rule
//! `R(o, a, b) = b when a == o, else a`.

use jam_types::{Chi, ServiceId};

/// Folds `candidates` — one `Chi` per service that ran this batch, in
/// processing order — against `original`, the value every clone started
/// from. For each field, the running result starts at `original`; the first
/// candidate whose own value for that field differs from `original` wins,
/// and every later candidate's differing value for that field is dropped.
/// A service that never touches a privileged field always agrees with
/// `original` there, so it never displaces an earlier winner.
pub fn merge_chi(original: &Chi, candidates: &[Chi]) -> Chi {
    let manager = fold_field(original.manager, candidates.iter().map(|c| c.manager));
    let designate = fold_field(original.designate, candidates.iter().map(|c| c.designate));
    let registrar = fold_field(original.registrar, candidates.iter().map(|c| c.registrar));

    let always_accumulate = candidates
        .iter()
        .find(|c| c.always_accumulate != original.always_accumulate)
        .map(|c| c.always_accumulate.clone())
        .unwrap_or_else(|| original.always_accumulate.clone());

    let core_count = candidates
        .iter()
        .map(|c| c.assign.len())
        .max()
        .unwrap_or(original.assign.len());
    let mut assign = Vec::with_capacity(core_count);
    for core in 0..core_count {
        let original_value = original.assign.get(core).copied().unwrap_or(ServiceId(0));
        let values = candidates.iter().filter_map(|c| c.assign.get(core).copied());
        assign.push(fold_field(original_value, values));
    }

    Chi {
        manager,
        always_accumulate,
        assign,
        designate,
        registrar,
    }
}

/// `R(o, a, b) = b when a == o, else a`, folded left-to-right with the
/// running accumulator seeded at `original`.
fn fold_field<T: Copy + PartialEq>(original: T, candidates: impl Iterator<Item = T>) -> T {
    let mut running = original;
    for candidate in candidates {
        if running == original {
            running = candidate;
        }
    }
    running
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::AlwaysAccumulate;
    use proptest::prelude::*;

    fn base_chi() -> Chi {
        Chi {
            manager: ServiceId(1),
            always_accumulate: AlwaysAccumulate::new(),
            assign: vec![ServiceId(10), ServiceId(11)],
            designate: ServiceId(2),
            registrar: ServiceId(3),
        }
    }

    #[test]
    fn untouched_field_keeps_original_value() {
        let original = base_chi();
        let merged = merge_chi(&original, &[base_chi(), base_chi()]);
        assert_eq!(merged.manager, original.manager);
    }

    #[test]
    fn first_diverging_candidate_wins_a_field() {
        let original = base_chi();
        let mut first_change = base_chi();
        first_change.manager = ServiceId(99);
        let mut second_change = base_chi();
        second_change.manager = ServiceId(42);

        let merged = merge_chi(&original, &[first_change, second_change]);
        assert_eq!(merged.manager, ServiceId(99));
    }

    #[test]
    fn distinct_fields_merge_independently() {
        let original = base_chi();
        let mut bless_call = base_chi();
        bless_call.manager = ServiceId(7);
        let mut designate_call = base_chi();
        designate_call.designate = ServiceId(8);

        let merged = merge_chi(&original, &[bless_call, designate_call]);
        assert_eq!(merged.manager, ServiceId(7));
        assert_eq!(merged.designate, ServiceId(8));
        assert_eq!(merged.registrar, original.registrar);
    }

    #[test]
    fn per_core_assign_merges_independently() {
        let original = base_chi();
        let mut assign_core_0 = base_chi();
        assign_core_0.assign[0] = ServiceId(100);
        let mut assign_core_1 = base_chi();
        assign_core_1.assign[1] = ServiceId(200);

        let merged = merge_chi(&original, &[assign_core_0, assign_core_1]);
        assert_eq!(merged.assign, vec![ServiceId(100), ServiceId(200)]);
    }

    proptest! {
        /// `manager` always lands on either the original value or the first
        /// candidate that diverges from it, for any candidate sequence.
        #[test]
        fn manager_follows_first_divergence_for_any_candidate_sequence(
            original in 0u32..8,
            candidates in proptest::collection::vec(0u32..8, 0..10),
        ) {
            let original_chi = Chi { manager: ServiceId(original), ..base_chi() };
            let candidate_chis: Vec<Chi> = candidates
                .iter()
                .map(|&m| Chi { manager: ServiceId(m), ..base_chi() })
                .collect();

            let mut expected = original;
            for &c in &candidates {
                if expected == original {
                    expected = c;
                }
            }

            let merged = merge_chi(&original_chi, &candidate_chis);
            prop_assert_eq!(merged.manager, ServiceId(expected));
        }

        /// The merged value for a field is always either the original or one
        /// of the candidates' values — the fold never invents a value.
        #[test]
        fn merge_never_produces_a_value_absent_from_input(
            original in 0u32..8,
            candidates in proptest::collection::vec(0u32..8, 0..10),
        ) {
            let original_chi = Chi { designate: ServiceId(original), ..base_chi() };
            let candidate_chis: Vec<Chi> = candidates
                .iter()
                .map(|&d| Chi { designate: ServiceId(d), ..base_chi() })
                .collect();

            let merged = merge_chi(&original_chi, &candidate_chis);
            let allowed = merged.designate == ServiceId(original)
                || candidates.iter().any(|&c| ServiceId(c) == merged.designate);
            prop_assert!(allowed);
        }
    }
}
