//! History tracking, the accumulation-root commitment, and pending-queue
//! write-back (§4.9).

use jam_crypto::binary_merkle_root;
use jam_types::{AccumulateOutput, Hash, ServiceAccumulationOutput, ServiceId, Theta, WorkReportAndDeps, Xi};
use std::collections::BTreeMap;

/// Builds the block's `AccumulateRoot` (§4.9): one leaf per service that
/// `yield`ed a digest this block, sorted by `(service_id asc, output asc)`,
/// each leaf encoded as `le32(service_id) ‖ output_bytes`, combined with the
/// same binary Merkle construction used throughout (§4.9, [`jam_crypto::binary_merkle_root`]).
pub fn compute_accumulate_root(outputs: &BTreeMap<ServiceId, AccumulateOutput>) -> Result<Hash, jam_crypto::error::CryptoError> {
    let mut entries: Vec<ServiceAccumulationOutput> = outputs
        .iter()
        .map(|(service_id, output)| ServiceAccumulationOutput {
            service_id: *service_id,
            output: *output,
        })
        .collect();
    entries.sort_by(|a, b| (a.service_id, a.output).cmp(&(b.service_id, b.output)));

    let blobs: Vec<Vec<u8>> = entries
        .iter()
        .map(|entry| {
            let mut blob = Vec::with_capacity(4 + 32);
            blob.extend_from_slice(&entry.service_id.0.to_le_bytes());
            blob.extend_from_slice(entry.output.as_ref());
            blob
        })
        .collect();

    binary_merkle_root(&blobs).map(Hash)
}

/// Advances `xi` by one slot and records every report hash actually
/// accumulated this block (§4.9). Must run exactly once per block, after
/// the outer accumulation loop has finished and before the next block's
/// dependency resolution observes `xi`.
pub fn record_history(xi: &mut Xi, accumulated_report_hashes: &[Hash]) {
    xi.shift_down();
    for hash in accumulated_report_hashes {
        xi.add_work_package(*hash);
    }
}

/// Writes the dependency resolver's residual queue back into `theta`, at the
/// slot one past `current_slot` (mod the epoch length), so the next block
/// to reach that slot re-attempts these reports (§4.1, §4.9 queue
/// write-back).
pub fn write_back_pending_queue(theta: &mut Theta, still_pending: Vec<WorkReportAndDeps>, next_slot: usize) {
    for entry in still_pending {
        theta.push(next_slot, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty_hash_when_no_service_yielded() {
        let root = compute_accumulate_root(&BTreeMap::new()).expect("root");
        let empty = jam_crypto::keccak_256(&[]);
        assert_eq!(root.0, empty);
    }

    #[test]
    fn root_changes_when_an_output_changes() {
        let mut a = BTreeMap::new();
        a.insert(ServiceId(1), Hash([1u8; 32]));
        let mut b = BTreeMap::new();
        b.insert(ServiceId(1), Hash([2u8; 32]));

        let root_a = compute_accumulate_root(&a).expect("root");
        let root_b = compute_accumulate_root(&b).expect("root");
        assert_ne!(root_a, root_b);
    }

    #[test]
    fn history_records_every_accumulated_hash_in_the_newest_slot() {
        let mut xi = Xi::new(2);
        let hash = Hash([7u8; 32]);
        record_history(&mut xi, &[hash]);
        assert!(xi.contains_work_package(&hash));
    }
}
