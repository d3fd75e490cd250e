//! A generic clone-on-write snapshot (§3: `DeltaSnapshot`'s `commit()`/
//! `deepClone()` pattern, generalized to any cloneable state component).

/// A clone-on-write view over a value of type `T`.
///
/// Reads before the first mutation are served from `base` without cloning.
/// The first call to [`Snapshot::mutate`] clones `base` into a local overlay;
/// every subsequent read and write goes through that overlay. [`Snapshot::commit`]
/// folds the overlay (or a clone of the untouched base) back to the caller,
/// and [`Snapshot::fork`] produces an independent snapshot over a deep clone
/// of the current value, for isolated parallel per-service execution (§4.3).
#[derive(Debug, Clone)]
pub struct Snapshot<T: Clone> {
    base: T,
    overlay: Option<T>,
}

impl<T: Clone> Snapshot<T> {
    /// Wraps `value` in a fresh, unmutated snapshot.
    pub fn new(value: T) -> Self {
        Self {
            base: value,
            overlay: None,
        }
    }

    /// Reads the current value: the overlay if mutated, else the base.
    pub fn read(&self) -> &T {
        self.overlay.as_ref().unwrap_or(&self.base)
    }

    /// Returns a mutable reference to the value, cloning `base` into the
    /// overlay on first use.
    pub fn mutate(&mut self) -> &mut T {
        self.overlay.get_or_insert_with(|| self.base.clone())
    }

    /// `true` iff [`Snapshot::mutate`] has been called at least once.
    pub fn is_dirty(&self) -> bool {
        self.overlay.is_some()
    }

    /// Consumes the snapshot, returning its final value.
    pub fn commit(self) -> T {
        self.overlay.unwrap_or(self.base)
    }

    /// Produces an independent snapshot over a deep clone of the current
    /// value, suitable for handing to a parallel worker (§4.3 `deepClone`).
    pub fn fork(&self) -> Snapshot<T> {
        Snapshot::new(self.read().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_before_mutate_serves_base_without_cloning_flag() {
        let snap = Snapshot::new(vec![1, 2, 3]);
        assert_eq!(snap.read(), &vec![1, 2, 3]);
        assert!(!snap.is_dirty());
    }

    #[test]
    fn mutate_then_commit_returns_the_overlay() {
        let mut snap = Snapshot::new(vec![1]);
        snap.mutate().push(2);
        assert!(snap.is_dirty());
        assert_eq!(snap.commit(), vec![1, 2]);
    }

    #[test]
    fn commit_without_mutation_returns_the_base_unchanged() {
        let snap = Snapshot::new(vec![7, 8]);
        assert_eq!(snap.commit(), vec![7, 8]);
    }

    #[test]
    fn fork_is_isolated_from_further_mutation_of_the_original() {
        let mut original = Snapshot::new(vec![1, 2]);
        let forked = original.fork();
        original.mutate().push(3);

        assert_eq!(forked.read(), &vec![1, 2]);
        assert_eq!(original.read(), &vec![1, 2, 3]);
    }
}
