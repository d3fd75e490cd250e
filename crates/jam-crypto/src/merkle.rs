//! The binary Merkle root used for the `AccumulateRoot` commitment (§4.9).

use crate::algorithms::hash::keccak_256;
use crate::error::CryptoError;

/// Computes the binary Merkle root over `blobs` using Keccak-256 at every
/// level: each blob is hashed to a leaf, then leaves are combined pairwise
/// (concatenate left ‖ right, hash) bottom-up. An odd node at any level is
/// promoted unchanged rather than duplicated, since the accumulation root's
/// blob count is not adversarially chosen and duplication would invite
/// second-preimage ambiguity between a repeated leaf and an odd carry.
///
/// An empty `blobs` yields the Merkle root of the empty sequence: the
/// Keccak-256 digest of zero bytes.
pub fn binary_merkle_root(blobs: &[Vec<u8>]) -> Result<[u8; 32], CryptoError> {
    if blobs.is_empty() {
        return keccak_256([]);
    }

    let mut level: Vec<[u8; 32]> = blobs
        .iter()
        .map(|blob| keccak_256(blob))
        .collect::<Result<_, _>>()?;

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut iter = level.chunks(2);
        while let Some(pair) = iter.next() {
            match pair {
                [left, right] => {
                    let mut buf = Vec::with_capacity(64);
                    buf.extend_from_slice(left);
                    buf.extend_from_slice(right);
                    next.push(keccak_256(&buf)?);
                }
                [only] => next.push(*only),
                _ => unreachable!("chunks(2) never yields more than two elements"),
            }
        }
        level = next;
    }

    #[allow(clippy::indexing_slicing)]
    Ok(level[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_yields_hash_of_empty_input() {
        let root = binary_merkle_root(&[]).expect("root");
        let expected = keccak_256([]).expect("hash");
        assert_eq!(root, expected);
    }

    #[test]
    fn single_blob_root_is_its_leaf_hash() {
        let blob = b"service-output".to_vec();
        let root = binary_merkle_root(&[blob.clone()]).expect("root");
        let expected = keccak_256(&blob).expect("hash");
        assert_eq!(root, expected);
    }

    #[test]
    fn root_is_order_sensitive() {
        let a = vec![1u8, 2, 3];
        let b = vec![4u8, 5, 6];
        let forward = binary_merkle_root(&[a.clone(), b.clone()]).expect("root");
        let backward = binary_merkle_root(&[b, a]).expect("root");
        assert_ne!(forward, backward);
    }

    #[test]
    fn odd_blob_count_still_produces_a_root() {
        let blobs = vec![vec![1], vec![2], vec![3]];
        let root = binary_merkle_root(&blobs);
        assert!(root.is_ok());
    }
}
