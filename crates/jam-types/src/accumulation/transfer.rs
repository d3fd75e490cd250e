//! Deferred transfers and accumulation outputs (§3, §4.5, §4.8, §4.9).

use super::ids::{Balance, Gas, Hash, ServiceId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The length in bytes of a transfer's opaque memo field.
pub const TRANSFER_MEMO_LEN: usize = 128;

/// A balance transfer queued by the `transfer` host call during a service's
/// accumulation step, to be dispatched to its destination's `on_transfer`
/// entry point in the deferred second pass (§4.8).
#[derive(Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct DeferredTransfer {
    /// The service that queued this transfer.
    pub sender: ServiceId,
    /// The service the transfer is addressed to.
    pub destination: ServiceId,
    /// The amount moved from `sender` to `destination`.
    pub amount: Balance,
    /// Opaque, sender-supplied bytes passed through to `on_transfer` verbatim.
    #[serde(with = "serde_memo")]
    pub memo: [u8; TRANSFER_MEMO_LEN],
    /// The gas limit `destination`'s `on_transfer` invocation may spend.
    pub gas_limit: Gas,
}

impl std::fmt::Debug for DeferredTransfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredTransfer")
            .field("sender", &self.sender)
            .field("destination", &self.destination)
            .field("amount", &self.amount)
            .field("memo_len", &self.memo.len())
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}

mod serde_memo {
    use super::TRANSFER_MEMO_LEN;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(memo: &[u8; TRANSFER_MEMO_LEN], s: S) -> Result<S::Ok, S::Error> {
        memo.as_slice().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<[u8; TRANSFER_MEMO_LEN], D::Error> {
        let bytes = Vec::<u8>::deserialize(d)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("memo must be exactly 128 bytes"))
    }
}

/// The 32-byte digest a service's accumulation step may `yield` to be folded
/// into the block's `AccumulateRoot` (§4.9).
pub type AccumulateOutput = Hash;

/// One service's contribution to the accumulation-root Merkle commitment: the
/// service that yielded a digest, paired with that digest. Collected per
/// block; the engine must reject a second entry for the same `service_id`
/// within one block (§4.9 uniqueness invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct ServiceAccumulationOutput {
    /// The yielding service.
    pub service_id: ServiceId,
    /// The digest it yielded.
    pub output: AccumulateOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_round_trips_through_scale() {
        use parity_scale_codec::{Decode, Encode};

        let mut memo = [0u8; TRANSFER_MEMO_LEN];
        memo[0] = 0xAB;
        memo[127] = 0xCD;
        let transfer = DeferredTransfer {
            sender: ServiceId(1),
            destination: ServiceId(2),
            amount: 500,
            memo,
            gas_limit: 1_000,
        };
        let encoded = transfer.encode();
        let decoded = DeferredTransfer::decode(&mut &encoded[..]).expect("decode");
        assert_eq!(decoded.memo, memo);
        assert_eq!(decoded.amount, 500);
    }
}
