//! Cryptographic hash functions used by the engine: Blake2b-256 for candidate
//! service-id generation, Keccak-256 for the accumulation-root Merkle tree.

use crate::error::CryptoError;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as Blake2Digest};
use sha3::{Digest as Sha3Digest, Keccak256};

/// A keyed-size Blake2b variant producing a 32-byte digest.
type Blake2b256 = Blake2b<U32>;

/// A hash function producing a fixed-size digest from arbitrary input.
pub trait HashFunction {
    /// Hashes `message`, returning its digest.
    fn hash(&self, message: &[u8]) -> Vec<u8>;

    /// The digest size in bytes.
    fn digest_size(&self) -> usize;

    /// The algorithm's name, for diagnostics.
    fn name(&self) -> &str;
}

/// Blake2b, truncated to a 256-bit digest.
#[derive(Default, Clone, Copy)]
pub struct Blake2b256Hash;

impl HashFunction for Blake2b256Hash {
    fn hash(&self, message: &[u8]) -> Vec<u8> {
        let mut hasher = Blake2b256::new();
        hasher.update(message);
        hasher.finalize().to_vec()
    }

    fn digest_size(&self) -> usize {
        32
    }

    fn name(&self) -> &str {
        "BLAKE2b-256"
    }
}

/// Keccak-256, as used by the binary Merkle root (§4.9).
#[derive(Default, Clone, Copy)]
pub struct Keccak256Hash;

impl HashFunction for Keccak256Hash {
    fn hash(&self, message: &[u8]) -> Vec<u8> {
        let mut hasher = Keccak256::new();
        hasher.update(message);
        hasher.finalize().to_vec()
    }

    fn digest_size(&self) -> usize {
        32
    }

    fn name(&self) -> &str {
        "Keccak-256"
    }
}

/// A generic hasher wrapping any [`HashFunction`] implementation.
pub struct GenericHasher<H: HashFunction> {
    hash_function: H,
}

impl<H: HashFunction> GenericHasher<H> {
    /// Wraps `hash_function` in a generic hasher.
    pub fn new(hash_function: H) -> Self {
        Self { hash_function }
    }

    /// Hashes `message`.
    pub fn hash(&self, message: &[u8]) -> Vec<u8> {
        self.hash_function.hash(message)
    }

    /// The digest size in bytes.
    pub fn digest_size(&self) -> usize {
        self.hash_function.digest_size()
    }

    /// The algorithm's name.
    pub fn name(&self) -> &str {
        self.hash_function.name()
    }
}

/// Hashes `data` with Blake2b-256, returning a fixed-size 32-byte digest.
pub fn blake2b_256<T: AsRef<[u8]>>(data: T) -> Result<[u8; 32], CryptoError> {
    let digest = Blake2b256Hash.hash(data.as_ref());
    digest
        .try_into()
        .map_err(|bytes: Vec<u8>| CryptoError::InvalidHashLength {
            expected: 32,
            got: bytes.len(),
        })
}

/// Hashes `data` with Keccak-256, returning a fixed-size 32-byte digest.
pub fn keccak_256<T: AsRef<[u8]>>(data: T) -> Result<[u8; 32], CryptoError> {
    let digest = Keccak256Hash.hash(data.as_ref());
    digest
        .try_into()
        .map_err(|bytes: Vec<u8>| CryptoError::InvalidHashLength {
            expected: 32,
            got: bytes.len(),
        })
}
