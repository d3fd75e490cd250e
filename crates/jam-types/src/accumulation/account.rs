//! `ServiceAccount` and the preimage-availability state machine (§3, §4.5).

use super::ids::{Balance, Gas, Hash, ServiceId, Slot};
use std::collections::BTreeMap;

/// The minimum balance a service must hold regardless of storage footprint.
pub const BALANCE_SERVICE_BASE: Balance = 100;
/// The per-stored-item contribution to the threshold balance `a_t`.
pub const BALANCE_PER_ITEM: Balance = 10;
/// The per-octet contribution to the threshold balance `a_t`.
pub const BALANCE_PER_OCTET: Balance = 1;

/// The preimage-lookup availability state machine (§4.5). Modeled as a tagged
/// variant rather than a fixed-length array of trailing-null timeslots, per
/// the §9 design note: this makes illegal states (e.g. a fourth timestamp)
/// unrepresentable instead of merely unobserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreimageStatus {
    /// `solicit`ed but never supplied.
    Requested,
    /// Available since `t0`, still available.
    Available {
        /// The slot the preimage became available.
        since: Slot,
    },
    /// Was available during `[t0, t1)`, now unavailable.
    Unavailable {
        /// The slot the preimage became available.
        since: Slot,
        /// The slot it was forgotten.
        until: Slot,
    },
    /// Re-solicited after a prior unavailability window; available again
    /// since `since`, with the earlier window preserved for audit.
    Reinstated {
        /// The start of the prior availability window.
        prior_since: Slot,
        /// The end of the prior availability window.
        prior_until: Slot,
        /// The slot the preimage became available again.
        since: Slot,
    },
}

/// A fixed-layout summary of a service account, serialized little-endian by
/// the `info` host call (§4.5, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// The hash of the service's code preimage.
    pub code_hash: Hash,
    /// The service's current balance.
    pub balance: Balance,
    /// The threshold balance `a_t` the account must not exceed.
    pub threshold_balance: Balance,
    /// The minimum gas limit required to invoke this service's `accumulate`.
    pub min_gas_accumulate: Gas,
    /// The minimum gas limit required to invoke this service's `on_transfer`.
    pub min_gas_on_transfer: Gas,
    /// The number of items stored across `storage` and `preimage_lookups`.
    pub item_count: u32,
    /// The total octet footprint of `storage` and `preimages`.
    pub octet_footprint: u64,
    /// The slot this service was created at.
    pub creation_slot: Slot,
    /// The slot this service last ran accumulation.
    pub last_accumulation_slot: Slot,
    /// The service that created this one, if any.
    pub parent_service: Option<ServiceId>,
}

/// A service's durable state, mutated only through the host-call surface
/// (§4.5) during accumulation or transfer dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccount {
    /// Structured-key -> opaque value storage.
    pub storage: BTreeMap<[u8; 31], Vec<u8>>,
    /// Preimage-key -> preimage bytes.
    pub preimages: BTreeMap<[u8; 31], Vec<u8>>,
    /// Lookup-key -> availability state machine.
    pub preimage_lookups: BTreeMap<[u8; 31], PreimageStatus>,
    /// The hash of this service's code preimage.
    pub code_hash: Hash,
    /// The service's current balance.
    pub balance: Balance,
    /// The minimum gas limit this service requires for `accumulate`.
    pub min_gas_accumulate: Gas,
    /// The minimum gas limit this service requires for `on_transfer`.
    pub min_gas_on_transfer: Gas,
    /// The slot this service was created at.
    pub creation_slot: Slot,
    /// The slot this service last ran accumulation.
    pub last_accumulation_slot: Slot,
    /// The service that created this one, if any.
    pub parent_service: Option<ServiceId>,
    /// An opaque offset used by the trie layer to address this service's
    /// storage sub-tree; carried through but never interpreted here (§1).
    pub storage_offset: u64,
}

impl ServiceAccount {
    /// The number of billable items: one per stored key plus one per
    /// preimage-lookup entry (§3 `a_i`).
    pub fn item_count(&self) -> u64 {
        (self.storage.len() + self.preimage_lookups.len()) as u64
    }

    /// The total octet footprint of stored values and preimages (§3 `a_o`).
    pub fn octet_footprint(&self) -> u64 {
        let storage_bytes: u64 = self.storage.values().map(|v| v.len() as u64).sum();
        let preimage_bytes: u64 = self.preimages.values().map(|v| v.len() as u64).sum();
        storage_bytes + preimage_bytes
    }

    /// The threshold balance `a_t = B_S + B_I * a_i + B_L * a_o` (§3).
    pub fn threshold_balance(&self) -> Balance {
        BALANCE_SERVICE_BASE
            .saturating_add(BALANCE_PER_ITEM.saturating_mul(self.item_count()))
            .saturating_add(BALANCE_PER_OCTET.saturating_mul(self.octet_footprint()))
    }

    /// `true` iff the account currently satisfies its own solvency invariant.
    pub fn is_solvent(&self) -> bool {
        self.threshold_balance() <= self.balance
    }

    /// Builds the fixed-layout [`ServiceInfo`] record for the `info` host call.
    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            code_hash: self.code_hash,
            balance: self.balance,
            threshold_balance: self.threshold_balance(),
            min_gas_accumulate: self.min_gas_accumulate,
            min_gas_on_transfer: self.min_gas_on_transfer,
            item_count: self.item_count() as u32,
            octet_footprint: self.octet_footprint(),
            creation_slot: self.creation_slot,
            last_accumulation_slot: self.last_accumulation_slot,
            parent_service: self.parent_service,
        }
    }
}

/// The full set of service accounts known to the chain, keyed by id.
pub type Delta = BTreeMap<ServiceId, ServiceAccount>;

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_account(balance: Balance) -> ServiceAccount {
        ServiceAccount {
            storage: BTreeMap::new(),
            preimages: BTreeMap::new(),
            preimage_lookups: BTreeMap::new(),
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

    #[test]
    fn threshold_balance_grows_with_items_and_octets() {
        let mut account = empty_account(1_000);
        assert_eq!(account.threshold_balance(), BALANCE_SERVICE_BASE);

        account.storage.insert([1u8; 31], vec![0u8; 40]);
        let expected = BALANCE_SERVICE_BASE + BALANCE_PER_ITEM + BALANCE_PER_OCTET * 40;
        assert_eq!(account.threshold_balance(), expected);
        assert!(account.is_solvent());
    }

    #[test]
    fn insolvent_account_is_reported() {
        let mut account = empty_account(BALANCE_SERVICE_BASE);
        account.storage.insert([2u8; 31], vec![0u8; 1]);
        assert!(!account.is_solvent());
    }

    #[test]
    fn info_reflects_current_footprint() {
        let mut account = empty_account(500);
        account.storage.insert([3u8; 31], vec![9u8; 10]);
        account
            .preimage_lookups
            .insert([4u8; 31], PreimageStatus::Requested);

        let info = account.info();
        assert_eq!(info.item_count, 2);
        assert_eq!(info.octet_footprint, 10);
        assert_eq!(info.balance, 500);
    }
}
