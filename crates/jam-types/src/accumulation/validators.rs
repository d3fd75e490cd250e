//! Validator keys (`iota`) and the per-core authorizer queue (`phi`) — the
//! two state dimensions besides `delta` and `chi` that an accumulation
//! context snapshots (§3 `AccumulationContext`).
//!
//! Their own lifecycle (safrole, ticket ordering, rotation) is out of scope
//! here (§1); the engine only needs to read and, via the `designate`/`bless`/
//! `assign` host calls, replace them wholesale.

use super::ids::Hash;
use std::collections::VecDeque;

/// A validator's key material, opaque to the accumulation engine beyond its
/// fixed 32-byte encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorKey(pub [u8; 32]);

/// The active validator set, indexed by validator index.
pub type ValidatorSet = Vec<ValidatorKey>;

/// The per-core queue of pending authorizer hashes, indexed by core index.
/// Each core's queue is consumed front-to-back as authorizations are used.
pub type AuthorizerQueue = Vec<VecDeque<Hash>>;
