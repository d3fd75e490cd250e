//! Error taxonomy for the accumulation engine (§7).
//!
//! Three tiers, matching §7.1:
//! - [`HostResultCode`] — the protocol-level codes returned in register R7 by a
//!   host call. These never propagate as Rust errors; they are data.
//! - [`WorkExecutionError`] — the five VM-terminal exit kinds that end a single
//!   service's accumulation run early. Recorded in operand outputs, never raised.
//! - [`EngineError`] — allocation failure or invariant violation. These are the
//!   only errors that actually abort a block's accumulation.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// Protocol-level result codes returned in R7 by a host call (§4.5, §7.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostResultCode {
    /// The call completed normally.
    Ok,
    /// The requested item (preimage, storage key, lookup entry) does not exist.
    None,
    /// An unrecognized host-call id or malformed arguments.
    What,
    /// An offset/length argument pair falls outside the addressed buffer.
    Oob,
    /// The referenced service does not exist.
    Who,
    /// The write would push the service over its threshold balance.
    Full,
    /// The referenced core index is invalid.
    Core,
    /// The caller's balance is insufficient to cover a transfer.
    Cash,
    /// The destination's minimum on-transfer gas requirement was not met.
    Low,
    /// The requested state transition for a preimage-lookup entry is not legal.
    Huh,
}

impl HostResultCode {
    /// The raw register value written to R7 for this code.
    pub const fn as_register(self) -> u64 {
        match self {
            HostResultCode::Ok => 0,
            HostResultCode::None => u64::MAX,
            HostResultCode::What => u64::MAX - 1,
            HostResultCode::Oob => u64::MAX - 2,
            HostResultCode::Who => u64::MAX - 3,
            HostResultCode::Full => u64::MAX - 4,
            HostResultCode::Core => u64::MAX - 5,
            HostResultCode::Cash => u64::MAX - 6,
            HostResultCode::Low => u64::MAX - 7,
            HostResultCode::Huh => u64::MAX - 8,
        }
    }
}

/// The five VM-terminal exit kinds a work result may carry (§3 `WorkReport`).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WorkExecutionError {
    /// The invocation exhausted its gas limit before completing.
    #[error("out of gas")]
    OutOfGas,
    /// The invocation panicked (invalid opcode, memory fault).
    #[error("panic")]
    Panic,
    /// The work package declared an export count inconsistent with its results.
    #[error("invalid export count")]
    InvalidExportCount,
    /// The service's code preimage could not be resolved by `code_hash`.
    #[error("code unavailable")]
    CodeUnavailable,
    /// The service's code preimage exceeds the maximum permitted size.
    #[error("code too large")]
    CodeTooLarge,
}

impl ErrorCode for WorkExecutionError {
    fn code(&self) -> &'static str {
        match self {
            Self::OutOfGas => "WORK_OUT_OF_GAS",
            Self::Panic => "WORK_PANIC",
            Self::InvalidExportCount => "WORK_INVALID_EXPORT_COUNT",
            Self::CodeUnavailable => "WORK_CODE_UNAVAILABLE",
            Self::CodeTooLarge => "WORK_CODE_TOO_LARGE",
        }
    }
}

/// Errors that abort a block's accumulation outright (§7.1 tier 3, §7.3).
///
/// Engine-level errors are never the fault of a single service; they indicate
/// a programmer error or resource exhaustion in the host itself. Propagation
/// policy: the caller must drop all tentative posterior state.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An invariant the engine relies on did not hold (e.g. a duplicate
    /// insertion into one `Xi` slot, or a service id missing from a map that
    /// was supposed to have been populated for every operand).
    #[error("accumulation invariant violated: {0}")]
    InvariantViolation(String),
    /// The host ran out of memory constructing a transient collection.
    #[error("allocation failed: {0}")]
    AllocationFailed(String),
    /// The virtual machine reported a catastrophic failure not caught by the
    /// preimage-availability check (malformed code that passed its hash check).
    #[error("virtual machine failure: {0}")]
    VmFailure(String),
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvariantViolation(_) => "ENGINE_INVARIANT_VIOLATION",
            Self::AllocationFailed(_) => "ENGINE_ALLOCATION_FAILED",
            Self::VmFailure(_) => "ENGINE_VM_FAILURE",
        }
    }
}

/// Errors from the state/snapshot layer, re-exported here so `jam-types`
/// remains the single place downstream crates import errors from.
#[derive(Error, Debug)]
pub enum StateError {
    /// A write would push the service's threshold balance over its `balance`.
    #[error("threshold balance exceeded: required {required}, available {available}")]
    ThresholdExceeded {
        /// The threshold balance `a_t` the write would produce.
        required: u64,
        /// The account's current `balance`.
        available: u64,
    },
    /// The referenced service does not exist in `delta`.
    #[error("service {0} not found")]
    ServiceNotFound(u32),
    /// A decode of a previously-encoded value failed.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::ThresholdExceeded { .. } => "STATE_THRESHOLD_EXCEEDED",
            Self::ServiceNotFound(_) => "STATE_SERVICE_NOT_FOUND",
            Self::Decode(_) => "STATE_DECODE_ERROR",
        }
    }
}

/// The crate-wide error type for operations that can fail at the engine level.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Wraps an [`EngineError`].
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Wraps a [`StateError`].
    #[error(transparent)]
    State(#[from] StateError),
    /// A hashing or Merkleization failure surfaced from `jam-crypto`.
    #[error("crypto error: {0}")]
    Crypto(String),
}
