//! Primitive identifiers and scalars shared across the data model (§3).

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-bit service identifier. Dense but sparse in use: callers should not
/// assume ids are contiguous or assigned in any particular order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct ServiceId(pub u32);

impl ServiceId {
    /// The first service id handed out by [`candidate id generation`](crate) for
    /// newly created services; ids below this value are reserved.
    pub const FIRST_DYNAMIC: u32 = 0x100;
}

impl From<u32> for ServiceId {
    fn from(v: u32) -> Self {
        ServiceId(v)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-byte cryptographic digest: work-package hashes, work-report hashes,
/// code hashes, preimage hashes, and the accumulation output hash all share
/// this representation.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The all-zero digest, used as a sentinel in a few constructions.
    pub const ZERO: Hash = Hash([0u8; 32]);
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(0x")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Hash {
    fn from(v: [u8; 32]) -> Self {
        Hash(v)
    }
}

/// A 64-bit gas counter. Monotonic within a single invocation: gas is only
/// ever deducted, never refunded mid-invocation.
pub type Gas = u64;

/// A 64-bit balance, denominated in the chain's base unit.
pub type Balance = u64;

/// An in-epoch or absolute time slot index.
pub type Slot = u32;
