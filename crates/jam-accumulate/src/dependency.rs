//! Dependency resolution over a block's work reports (§4.1).

use jam_types::{Hash, Theta, WorkReport, WorkReportAndDeps, Xi};

/// The outcome of resolving one block's reports against pending
/// dependencies (§4.1): reports ready to accumulate this block, in
/// first-seen order (immediately-ready reports first, then any newly
/// promoted queued report in the order it became ready), plus the residual
/// queue of reports still waiting on at least one prerequisite.
pub struct ResolvedDependencies {
    /// Reports to hand to the outer accumulation loop this block.
    pub ready: Vec<WorkReport>,
    /// Reports still waiting on a prerequisite, to be written back into
    /// `Theta` by the caller.
    pub still_pending: Vec<WorkReportAndDeps>,
}

/// Partitions `reports` into immediately-accumulatable and queued (§4.1: a
/// report with no prerequisites and no segment-root lookup is immediate;
/// anything else is queued), drops any report whose package hash already
/// appears in `xi` (already accumulated within the retained history
/// window), folds in whatever was already queued at `current_slot`, and then
/// iteratively promotes queued reports whose prerequisites are satisfied by
/// hashes accumulated earlier in this same pass.
pub fn resolve_dependencies(
    reports: Vec<WorkReport>,
    xi: &Xi,
    theta: &mut Theta,
    current_slot: usize,
) -> ResolvedDependencies {
    let carried_over = theta.take_slot(current_slot);

    let mut pending: Vec<WorkReportAndDeps> = Vec::new();
    let mut ready: Vec<WorkReport> = Vec::new();

    for report in reports {
        if xi.contains_work_package(&report.package_spec.hash) {
            continue;
        }
        if report.is_immediately_accumulatable() {
            ready.push(report);
        } else {
            pending.push(WorkReportAndDeps::new(report));
        }
    }
    pending.extend(carried_over);

    let seed_hashes: Vec<Hash> = ready.iter().map(|r| r.package_spec.hash).collect();
    promote_ready(&mut pending, &mut ready, seed_hashes);

    ResolvedDependencies {
        ready,
        still_pending: pending,
    }
}

/// Repeatedly satisfies `pending` entries against hashes accumulated so far
/// this pass, starting from `frontier`, moving any entry that becomes fully
/// satisfied into `ready` and seeding the next round with its hash.
fn promote_ready(pending: &mut Vec<WorkReportAndDeps>, ready: &mut Vec<WorkReport>, mut frontier: Vec<Hash>) {
    while !frontier.is_empty() {
        let mut newly_ready = Vec::new();
        let mut i = 0;
        while i < pending.len() {
            let became_ready = frontier.iter().any(|hash| pending[i].satisfy(hash));
            if became_ready {
                newly_ready.push(pending.remove(i).report);
            } else {
                i += 1;
            }
        }
        frontier = newly_ready.iter().map(|r| r.package_spec.hash).collect();
        ready.extend(newly_ready);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jam_types::{PackageSpec, WorkContext};
    use proptest::prelude::*;

    fn report(hash: u8, prerequisites: Vec<Hash>) -> WorkReport {
        WorkReport {
            package_spec: PackageSpec {
                hash: Hash([hash; 32]),
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
            results: Vec::new(),
        }
    }

    #[test]
    fn report_with_no_prerequisites_is_immediately_ready() {
        let mut theta = Theta::new(4);
        let xi = Xi::new(2);
        let resolved = resolve_dependencies(vec![report(1, Vec::new())], &xi, &mut theta, 0);
        assert_eq!(resolved.ready.len(), 1);
        assert!(resolved.still_pending.is_empty());
    }

    #[test]
    fn report_depending_on_a_sibling_in_the_same_batch_is_promoted() {
        let mut theta = Theta::new(4);
        let xi = Xi::new(2);
        let dependent = report(2, vec![Hash([1u8; 32])]);
        let resolved = resolve_dependencies(vec![report(1, Vec::new()), dependent], &xi, &mut theta, 0);
        assert_eq!(resolved.ready.len(), 2);
        assert!(resolved.still_pending.is_empty());
    }

    #[test]
    fn report_already_in_xi_history_is_dropped() {
        let mut theta = Theta::new(4);
        let mut xi = Xi::new(2);
        xi.add_work_package(Hash([1u8; 32]));
        let resolved = resolve_dependencies(vec![report(1, Vec::new())], &xi, &mut theta, 0);
        assert!(resolved.ready.is_empty());
        assert!(resolved.still_pending.is_empty());
    }

    #[test]
    fn unsatisfied_report_remains_pending() {
        let mut theta = Theta::new(4);
        let xi = Xi::new(2);
        let resolved = resolve_dependencies(
            vec![report(2, vec![Hash([9u8; 32])])],
            &xi,
            &mut theta,
            0,
        );
        assert!(resolved.ready.is_empty());
        assert_eq!(resolved.still_pending.len(), 1);
    }

    proptest! {
        /// A two-report dependency pair fully resolves in prerequisite-then-
        /// dependent order no matter which order the block presents them in —
        /// the promotion loop, not the input list, decides the output order.
        #[test]
        fn dependency_pair_resolves_in_order_regardless_of_input_order(
            a in 1u8..250,
            offset in 1u8..5,
            dependent_first in any::<bool>(),
        ) {
            let b = a.wrapping_add(offset);
            prop_assume!(a != b);

            let base = report(a, Vec::new());
            let dependent = report(b, vec![Hash([a; 32])]);
            let reports = if dependent_first {
                vec![dependent, base]
            } else {
                vec![base, dependent]
            };

            let mut theta = Theta::new(4);
            let xi = Xi::new(2);
            let resolved = resolve_dependencies(reports, &xi, &mut theta, 0);

            prop_assert_eq!(resolved.ready.len(), 2);
            prop_assert!(resolved.still_pending.is_empty());
            prop_assert_eq!(resolved.ready[0].package_spec.hash, Hash([a; 32]));
            prop_assert_eq!(resolved.ready[1].package_spec.hash, Hash([b; 32]));
        }

        /// A report whose prerequisite never appears in the block stays
        /// pending for any prerequisite hash distinct from the report itself.
        #[test]
        fn report_with_a_never_satisfied_prerequisite_always_stays_pending(
            own_hash in 1u8..250,
            missing_prereq in 1u8..250,
        ) {
            prop_assume!(own_hash != missing_prereq);

            let mut theta = Theta::new(4);
            let xi = Xi::new(2);
            let stuck = report(own_hash, vec![Hash([missing_prereq; 32])]);
            let resolved = resolve_dependencies(vec![stuck], &xi, &mut theta, 0);

            prop_assert!(resolved.ready.is_empty());
            prop_assert_eq!(resolved.still_pending.len(), 1);
        }
    }
}
