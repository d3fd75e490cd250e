//! `DeltaSnapshot`: a [`Snapshot`] specialized over the service-account map,
//! enforcing the threshold-balance invariant on every write (§3, §4.5).

use super::Snapshot;
use jam_types::error::StateError;
use jam_types::{Delta, ServiceId};

/// A clone-on-write view over [`Delta`] that rejects any write which would
/// leave a service insolvent, leaving that service's state byte-for-byte
/// unchanged on rejection (§3 invariant, §4.5 `write`/`solicit`/`new`
/// transactionality).
#[derive(Debug, Clone)]
pub struct DeltaSnapshot {
    inner: Snapshot<Delta>,
}

impl DeltaSnapshot {
    /// Wraps `delta` in a fresh snapshot.
    pub fn new(delta: Delta) -> Self {
        Self {
            inner: Snapshot::new(delta),
        }
    }

    /// Reads the current service-account map.
    pub fn read(&self) -> &Delta {
        self.inner.read()
    }

    /// Consumes the snapshot, returning the final service-account map.
    pub fn commit(self) -> Delta {
        self.inner.commit()
    }

    /// Produces an isolated snapshot over a deep clone of the current state,
    /// for a parallel per-service worker (§4.3).
    pub fn fork(&self) -> DeltaSnapshot {
        DeltaSnapshot {
            inner: self.inner.fork(),
        }
    }

    /// A raw mutable view over the service-account map, for host calls
    /// (`new`, `transfer`, `upgrade`, `eject`, `solicit`, `forget`) whose
    /// solvency check is not a simple single-key write/rollback and is
    /// instead enforced by the caller before committing the mutation.
    pub fn mutate(&mut self) -> &mut Delta {
        self.inner.mutate()
    }

    /// Writes `key` to `value` in `service_id`'s storage (or removes it, if
    /// `value` is `None`), rejecting the write and leaving the account
    /// unchanged if the post-write threshold balance would exceed its
    /// current balance.
    ///
    /// Returns the prior value, matching the `write` host call's R7
    /// convention of reporting the previous length (or `NONE`).
    pub fn try_write_storage(
        &mut self,
        service_id: ServiceId,
        key: [u8; 31],
        value: Option<Vec<u8>>,
    ) -> Result<Option<Vec<u8>>, StateError> {
        let delta = self.inner.mutate();
        let account = delta
            .get_mut(&service_id)
            .ok_or(StateError::ServiceNotFound(service_id.0))?;

        let prior = match value {
            Some(bytes) => account.storage.insert(key, bytes),
            None => account.storage.remove(&key),
        };

        if account.is_solvent() {
            return Ok(prior);
        }

        // Roll back: the write must have no effect on state.
        match &prior {
            Some(bytes) => {
                account.storage.insert(key, bytes.clone());
            }
            None => {
                account.storage.remove(&key);
            }
        }
        Err(StateError::ThresholdExceeded {
            required: account.threshold_balance(),
            available: account.balance,
        })
    }

    /// Installs `bytes` as the preimage stored at `key`, applying the same
    /// solvency check and rollback discipline as [`DeltaSnapshot::try_write_storage`].
    pub fn try_install_preimage(
        &mut self,
        service_id: ServiceId,
        key: [u8; 31],
        bytes: Vec<u8>,
    ) -> Result<(), StateError> {
        let delta = self.inner.mutate();
        let account = delta
            .get_mut(&service_id)
            .ok_or(StateError::ServiceNotFound(service_id.0))?;

        let prior = account.preimages.insert(key, bytes);
        if account.is_solvent() {
            return Ok(());
        }

        match prior {
            Some(bytes) => {
                account.preimages.insert(key, bytes);
            }
            None => {
                account.preimages.remove(&key);
            }
        }
        Err(StateError::ThresholdExceeded {
            required: account.threshold_balance(),
            available: account.balance,
        })
    }
}
