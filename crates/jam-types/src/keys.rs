//! Constants and helpers for constructing the 31-byte structured keys used by
//! the storage and preimage-lookup host calls (§4.5, §6).
//!
//! Building the on-disk trie key from a service id and a 32-byte digest is a
//! Merklization concern and is explicitly out of scope for this engine (§1):
//! the real key-construction function is supplied by the trie layer. This
//! module implements the documented contract the engine expects from that
//! function so the rest of the crate has a concrete type to call against.

use crate::accumulation::{Hash, ServiceId};

/// Discriminates the three families of structured key the engine constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyKind {
    /// A key into `ServiceAccount::storage`.
    Storage = 0,
    /// A key into `ServiceAccount::preimages`.
    Preimage = 1,
    /// A key into `ServiceAccount::preimage_lookups`.
    Lookup = 2,
}

/// Builds the 31-byte structured key for `service_id`, discriminated by `kind`,
/// over the 32-byte digest `hash`.
///
/// Layout: byte 0 is the `KeyKind` discriminant, bytes `1..5` are the
/// little-endian service id, and the remaining 26 bytes are the leading bytes
/// of `hash`. This keeps keys from different services and different key
/// families from colliding while remaining a pure function of its inputs.
pub fn structured_key(kind: KeyKind, service_id: ServiceId, hash: &Hash) -> [u8; 31] {
    let mut out = [0u8; 31];
    out[0] = kind as u8;
    out[1..5].copy_from_slice(&service_id.0.to_le_bytes());
    out[5..31].copy_from_slice(&hash.0[..26]);
    out
}

/// The state key prefix used to index a service's metadata within a shared store.
pub fn service_account_prefix(service_id: ServiceId) -> [u8; 5] {
    let mut out = [0u8; 5];
    out[0] = 0xAC;
    out[1..5].copy_from_slice(&service_id.0.to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_kinds_do_not_collide_for_the_same_hash() {
        let h = Hash([7u8; 32]);
        let a = structured_key(KeyKind::Storage, ServiceId(42), &h);
        let b = structured_key(KeyKind::Preimage, ServiceId(42), &h);
        let c = structured_key(KeyKind::Lookup, ServiceId(42), &h);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn distinct_services_do_not_collide() {
        let h = Hash([1u8; 32]);
        let a = structured_key(KeyKind::Storage, ServiceId(1), &h);
        let b = structured_key(KeyKind::Storage, ServiceId(2), &h);
        assert_ne!(a, b);
    }
}
