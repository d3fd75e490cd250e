//! `Chi`: the privileged-service configuration table (§3, §4.6).

use super::ids::{Gas, ServiceId};

/// An insertion-order-preserving map from service id to its privileged
/// always-accumulate gas allowance.
///
/// §4.3 requires iterating these keys "in insertion order" when seeding the
/// first batch's service set, which a sorted map cannot provide; a small
/// `Vec` is simplest and these tables hold at most a handful of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlwaysAccumulate(Vec<(ServiceId, Gas)>);

impl AlwaysAccumulate {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the gas allowance for `service_id`, if privileged.
    pub fn get(&self, service_id: ServiceId) -> Option<Gas> {
        self.0
            .iter()
            .find(|(id, _)| *id == service_id)
            .map(|(_, gas)| *gas)
    }

    /// `true` iff `service_id` is in the table.
    pub fn contains(&self, service_id: ServiceId) -> bool {
        self.0.iter().any(|(id, _)| *id == service_id)
    }

    /// Inserts or updates the gas allowance for `service_id`, preserving the
    /// position of an existing entry (so re-assertion does not reorder it).
    pub fn insert(&mut self, service_id: ServiceId, gas: Gas) {
        if let Some(entry) = self.0.iter_mut().find(|(id, _)| *id == service_id) {
            entry.1 = gas;
        } else {
            self.0.push((service_id, gas));
        }
    }

    /// Iterates `(service_id, gas)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ServiceId, Gas)> + '_ {
        self.0.iter().copied()
    }
}

/// The table of privileged services and their special powers (§3, §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chi {
    /// The service permitted to mutate `manager` and `always_accumulate`
    /// itself, and whose writes to the `R`-resolved fields take precedence
    /// over the corresponding privileged service's own writes when it
    /// disagrees with the pre-block value (§4.6).
    pub manager: ServiceId,
    /// Services that accumulate unconditionally in the first batch of every
    /// block, each with its dedicated gas allowance.
    pub always_accumulate: AlwaysAccumulate,
    /// The current assigner service for each core, indexed by core index.
    pub assign: Vec<ServiceId>,
    /// The current delegator service for validator-key designation.
    pub designate: ServiceId,
    /// The current registrar service.
    pub registrar: ServiceId,
}

impl Chi {
    /// Returns the assigner for `core`, if the core index is in range.
    pub fn assigner(&self, core: usize) -> Option<ServiceId> {
        self.assign.get(core).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_accumulate_preserves_insertion_order_across_updates() {
        let mut table = AlwaysAccumulate::new();
        table.insert(ServiceId(3), 10);
        table.insert(ServiceId(1), 20);
        table.insert(ServiceId(3), 99);

        let order: Vec<ServiceId> = table.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![ServiceId(3), ServiceId(1)]);
        assert_eq!(table.get(ServiceId(3)), Some(99));
        assert!(!table.contains(ServiceId(7)));
    }

    #[test]
    fn assigner_returns_none_for_out_of_range_core() {
        let chi = Chi {
            manager: ServiceId(1),
            always_accumulate: AlwaysAccumulate::new(),
            assign: vec![ServiceId(2)],
            designate: ServiceId(3),
            registrar: ServiceId(4),
        };
        assert_eq!(chi.assigner(0), Some(ServiceId(2)));
        assert_eq!(chi.assigner(1), None);
    }
}
