//! The core data model: service accounts, work reports, operands, pending
//! queues, privileges, transfers, and statistics (spec §3).

mod account;
mod history;
mod ids;
mod operand;
mod privileges;
mod stats;
mod transfer;
mod validators;
mod work_report;

pub use account::{
    Delta, PreimageStatus, ServiceAccount, ServiceInfo, BALANCE_PER_ITEM, BALANCE_PER_OCTET,
    BALANCE_SERVICE_BASE,
};
pub use history::{Theta, ThetaSlot, WorkReportAndDeps, Xi};
pub use ids::{Balance, Gas, Hash, ServiceId, Slot};
pub use operand::{AccumulationOperand, OperandOutput};
pub use privileges::{AlwaysAccumulate, Chi};
pub use stats::{AccumulationServiceStats, BlockAccumulationStats, TransferStats};
pub use transfer::{
    AccumulateOutput, DeferredTransfer, ServiceAccumulationOutput, TRANSFER_MEMO_LEN,
};
pub use validators::{AuthorizerQueue, ValidatorKey, ValidatorSet};
pub use work_report::{
    PackageSpec, SegmentRootLookupEntry, WorkContext, WorkOutput, WorkReport, WorkResult,
};
