//! Candidate service-id generation for the `new` host call (§4.5).

use crate::algorithms::hash::blake2b_256;
use crate::error::CryptoError;
use jam_types::{Hash, ServiceId, Slot};

/// The size of the dynamic service-id space: `2^32 - 2^9`.
const DYNAMIC_ID_SPACE: u64 = (1u64 << 32) - (1u64 << 9);

/// Derives the first candidate id for a new service created by `creator_id`
/// at `timeslot` with block `entropy`, per §4.5: hash
/// `le32(creator_id) ‖ entropy(32) ‖ le32(timeslot)` with Blake2b-256, take
/// the first 4 bytes as a little-endian `u32` `v`, and map into the dynamic
/// id space starting at [`ServiceId::FIRST_DYNAMIC`].
pub fn first_candidate_service_id(
    creator_id: ServiceId,
    entropy: &Hash,
    timeslot: Slot,
) -> Result<ServiceId, CryptoError> {
    let mut preimage = Vec::with_capacity(4 + 32 + 4);
    preimage.extend_from_slice(&creator_id.0.to_le_bytes());
    preimage.extend_from_slice(entropy.as_ref());
    preimage.extend_from_slice(&timeslot.to_le_bytes());

    let digest = blake2b_256(&preimage)?;
    let v = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    Ok(offset_to_service_id(v as u64))
}

/// Advances a rejected `candidate` to the next id in the dynamic space,
/// wrapping back to [`ServiceId::FIRST_DYNAMIC`] at the top of the range, per
/// the linear-probe retry rule of §4.5.
pub fn next_candidate_service_id(candidate: ServiceId) -> ServiceId {
    let offset = candidate.0.wrapping_sub(ServiceId::FIRST_DYNAMIC) as u64;
    offset_to_service_id((offset + 1) % DYNAMIC_ID_SPACE)
}

fn offset_to_service_id(offset: u64) -> ServiceId {
    let wrapped = offset % DYNAMIC_ID_SPACE;
    #[allow(clippy::cast_possible_truncation)]
    ServiceId(ServiceId::FIRST_DYNAMIC.wrapping_add(wrapped as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_candidate_is_deterministic() {
        let entropy = Hash([7u8; 32]);
        let a = first_candidate_service_id(ServiceId(5), &entropy, 100).expect("candidate");
        let b = first_candidate_service_id(ServiceId(5), &entropy, 100).expect("candidate");
        assert_eq!(a, b);
        assert!(a.0 >= ServiceId::FIRST_DYNAMIC);
    }

    #[test]
    fn different_creators_usually_diverge() {
        let entropy = Hash([1u8; 32]);
        let a = first_candidate_service_id(ServiceId(1), &entropy, 1).expect("candidate");
        let b = first_candidate_service_id(ServiceId(2), &entropy, 1).expect("candidate");
        assert_ne!(a, b);
    }

    #[test]
    fn retry_advances_by_one_within_the_dynamic_space() {
        let candidate = ServiceId(ServiceId::FIRST_DYNAMIC);
        let next = next_candidate_service_id(candidate);
        assert_eq!(next.0, ServiceId::FIRST_DYNAMIC + 1);
    }

    #[test]
    fn retry_wraps_at_the_top_of_the_dynamic_space() {
        let last = ServiceId(ServiceId::FIRST_DYNAMIC.wrapping_add((DYNAMIC_ID_SPACE - 1) as u32));
        let wrapped = next_candidate_service_id(last);
        assert_eq!(wrapped.0, ServiceId::FIRST_DYNAMIC);
    }
}
