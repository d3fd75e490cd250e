//! `Xi`, the recently-accumulated-package history, and `Theta`, the queue of
//! reports still waiting on prerequisites (§3, §4.1, §4.9).

use super::ids::Hash;
use super::work_report::WorkReport;
use std::collections::BTreeSet;

/// A work report paired with the subset of its declared prerequisites that
/// have not yet been seen accumulated. Shrinks as the dependency resolver
/// (§4.1) observes prerequisite hashes enter `Xi`; a report is eligible for
/// accumulation once this set is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkReportAndDeps {
    /// The report itself.
    pub report: WorkReport,
    /// Declared prerequisites not yet satisfied.
    pub remaining_prerequisites: BTreeSet<Hash>,
}

impl WorkReportAndDeps {
    /// Builds the initial dependency set from the report's own context.
    pub fn new(report: WorkReport) -> Self {
        let remaining_prerequisites = report.context.prerequisites.iter().copied().collect();
        Self {
            report,
            remaining_prerequisites,
        }
    }

    /// `true` once every declared prerequisite has been satisfied.
    pub fn is_ready(&self) -> bool {
        self.remaining_prerequisites.is_empty()
    }

    /// Removes `hash` from the remaining set, if present. Returns whether
    /// this report became ready as a result.
    pub fn satisfy(&mut self, hash: &Hash) -> bool {
        self.remaining_prerequisites.remove(hash);
        self.is_ready()
    }
}

/// One epoch-slot's worth of reports still waiting on prerequisites (§3, §4.1).
pub type ThetaSlot = Vec<WorkReportAndDeps>;

/// The per-core, per-slot queue of not-yet-accumulated reports, indexed by
/// slots-since-epoch-start. Entries age out and are cleared as the block
/// production slot advances past them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Theta {
    slots: Vec<ThetaSlot>,
}

impl Theta {
    /// Builds an empty queue with `epoch_length` slots, all initially empty.
    pub fn new(epoch_length: usize) -> Self {
        Self {
            slots: vec![Vec::new(); epoch_length],
        }
    }

    /// The queued reports for `slot`, if the index is in range.
    pub fn slot(&self, slot: usize) -> Option<&ThetaSlot> {
        self.slots.get(slot)
    }

    /// A mutable view of the queued reports for `slot`.
    pub fn slot_mut(&mut self, slot: usize) -> Option<&mut ThetaSlot> {
        self.slots.get_mut(slot)
    }

    /// Enqueues `entry` at `slot`, if the index is in range.
    pub fn push(&mut self, slot: usize, entry: WorkReportAndDeps) {
        if let Some(bucket) = self.slots.get_mut(slot) {
            bucket.push(entry);
        }
    }

    /// Clears the queue at `slot`, returning what was there (§4.9 Theta
    /// write-back replaces a slot wholesale once its reports are drained).
    pub fn take_slot(&mut self, slot: usize) -> ThetaSlot {
        self.slots
            .get_mut(slot)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Iterates every queued report across all slots, most-recent-slot-first
    /// is not implied; callers needing slot order should use [`Theta::slot`].
    pub fn iter_all(&self) -> impl Iterator<Item = &WorkReportAndDeps> {
        self.slots.iter().flat_map(|bucket| bucket.iter())
    }

    /// The total number of still-pending reports across all slots.
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    /// `true` iff no slot holds any pending report.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }
}

/// A fixed-depth ring of recently-accumulated work-package hash sets (§3, §4.1,
/// §4.9). Used to reject a report that repeats a package already accumulated,
/// and to satisfy prerequisites declared by reports still in `Theta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xi {
    /// One set per historical slot, oldest first at index 0 after a
    /// `shift_down`; `rings[rings.len() - 1]` is always the most recent.
    rings: Vec<BTreeSet<Hash>>,
}

impl Xi {
    /// Builds an empty history of `depth` slots.
    pub fn new(depth: usize) -> Self {
        Self {
            rings: vec![BTreeSet::new(); depth.max(1)],
        }
    }

    /// `true` iff `hash` was accumulated within the retained history window.
    pub fn contains_work_package(&self, hash: &Hash) -> bool {
        self.rings.iter().any(|set| set.contains(hash))
    }

    /// Records `hash` as accumulated in the most recent slot.
    pub fn add_work_package(&mut self, hash: Hash) {
        if let Some(newest) = self.rings.last_mut() {
            newest.insert(hash);
        }
    }

    /// Advances the ring by one slot: the oldest set is dropped and a fresh
    /// empty set becomes the new "most recent" bucket. Called once per block
    /// before that block's newly accumulated packages are recorded.
    pub fn shift_down(&mut self) {
        if self.rings.is_empty() {
            return;
        }
        self.rings.remove(0);
        self.rings.push(BTreeSet::new());
    }
}
