//! `WorkReport` and its nested structures (§3).

use super::ids::{Gas, Hash, ServiceId, Slot};
use crate::error::WorkExecutionError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Identifies the work package a report was produced from, plus the shape of
/// its erasure-coded export bundle.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct PackageSpec {
    /// The work package's hash.
    pub hash: Hash,
    /// The length in bytes of the encoded work package.
    pub length: u32,
    /// The root of the package's erasure-coded segments.
    pub erasure_root: Hash,
    /// The root of the package's exported segments.
    pub exports_root: Hash,
    /// The number of segments the package exports.
    pub exports_count: u16,
}

/// The refinement context a work report was produced against.
#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode, Serialize, Deserialize)]
pub struct WorkContext {
    /// The anchor block hash the report's state views are relative to.
    pub anchor: Hash,
    /// The state root at the anchor block.
    pub anchor_state_root: Hash,
    /// The hash of the block used to resolve lookups at refinement time.
    pub lookup_anchor: Hash,
    /// The slot of `lookup_anchor`.
    pub lookup_anchor_slot: Slot,
    /// The set of work-package hashes this report depends on, in the order
    /// they were declared. Order matters only for display; membership is
    /// what the dependency resolver (§4.1) consumes.
    pub prerequisites: Vec<Hash>,
}

/// A hash pair used to resolve a segment root during refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct SegmentRootLookupEntry {
    /// The work-package hash the segment root is being resolved for.
    pub work_package_hash: Hash,
    /// The resolved segment root.
    pub segment_root: Hash,
}

/// The output of a single service's refinement within this report: either the
/// success payload the service produced, or one of the five terminal errors.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum WorkOutput {
    /// Refinement completed and produced this payload.
    Success(Vec<u8>),
    /// Refinement ended in one of the five terminal error kinds.
    Error(WorkExecutionError),
}

impl Encode for WorkExecutionError {
    fn encode_to<T: parity_scale_codec::Output + ?Sized>(&self, dest: &mut T) {
        let tag: u8 = match self {
            WorkExecutionError::OutOfGas => 0,
            WorkExecutionError::Panic => 1,
            WorkExecutionError::InvalidExportCount => 2,
            WorkExecutionError::CodeUnavailable => 3,
            WorkExecutionError::CodeTooLarge => 4,
        };
        tag.encode_to(dest);
    }
}

impl Decode for WorkExecutionError {
    fn decode<I: parity_scale_codec::Input>(
        input: &mut I,
    ) -> Result<Self, parity_scale_codec::Error> {
        match u8::decode(input)? {
            0 => Ok(WorkExecutionError::OutOfGas),
            1 => Ok(WorkExecutionError::Panic),
            2 => Ok(WorkExecutionError::InvalidExportCount),
            3 => Ok(WorkExecutionError::CodeUnavailable),
            4 => Ok(WorkExecutionError::CodeTooLarge),
            _ => Err("invalid WorkExecutionError tag".into()),
        }
    }
}

/// The per-service result of refining one work package.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct WorkResult {
    /// The service this result targets.
    pub service_id: ServiceId,
    /// The gas budget this service's accumulation step may draw from this
    /// result. Summed with the other results for the same service to get the
    /// per-report contribution to that service's gas limit (§4.4).
    pub accumulate_gas: Gas,
    /// The hash of the payload given to refinement (not the output payload).
    pub payload_hash: Hash,
    /// The refinement output: success bytes, or a terminal error kind.
    pub output: WorkOutput,
}

/// An immutable, validated per-block input: the output of refining one work
/// package, addressed to zero or more services.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct WorkReport {
    /// Identifies the work package and its export shape.
    pub package_spec: PackageSpec,
    /// The refinement context, including prerequisites.
    pub context: WorkContext,
    /// The core this report was produced on.
    pub core_index: u16,
    /// The hash of the authorizer that admitted this report.
    pub authorizer_hash: Hash,
    /// Opaque output produced by the authorizer.
    pub auth_output: Vec<u8>,
    /// Resolved segment roots needed to interpret cross-package exports.
    pub segment_root_lookup: Vec<SegmentRootLookupEntry>,
    /// The ordered per-service refinement results.
    pub results: Vec<WorkResult>,
}

impl WorkReport {
    /// `true` iff this report has no unresolved prerequisites and does not
    /// require a segment-root lookup — the partition rule of §4.1.
    pub fn is_immediately_accumulatable(&self) -> bool {
        self.context.prerequisites.is_empty() && self.segment_root_lookup.is_empty()
    }

    /// The sum of `accumulate_gas` over every result in this report (§4.2).
    pub fn total_accumulate_gas(&self) -> Gas {
        self.results.iter().map(|r| r.accumulate_gas).sum()
    }
}
