//! The host-call surface (§4.5): every operation service code can invoke
//! during `accumulate`, dispatched through a [`jam_vm::HostCallTable`].
//!
//! Register convention: call arguments/returns are named `R7..R12`; the
//! VM's actual general-purpose register numbering is external to this engine
//! (§1), so this module maps that naming onto [`jam_vm::InvocationResult`]'s
//! register slots `0..5` and gives them these names for readability.

use jam_crypto::{first_candidate_service_id, next_candidate_service_id};
use jam_state::AccumulationContext;
use jam_types::error::HostResultCode;
use jam_types::{
    keys::{structured_key, KeyKind},
    AccumulateOutput, Balance, DeferredTransfer, PreimageStatus, ServiceAccount, ServiceId,
    TRANSFER_MEMO_LEN,
};
use jam_vm::{ExitStatus, HostCallTable, VmExecutionContext};

/// Register index holding the call's primary argument or return value.
pub const R7: usize = 0;
/// Register index holding the call's second argument.
pub const R8: usize = 1;
/// Register index holding the call's third argument.
pub const R9: usize = 2;
/// Register index holding the call's fourth argument.
pub const R10: usize = 3;
/// Register index holding the call's fifth argument.
pub const R11: usize = 4;
/// Register index holding the call's sixth argument.
pub const R12: usize = 5;

/// The flat per-call gas charge applied before any call's effect (§4.5).
pub const HOST_CALL_BASE_GAS: u64 = 10;

/// Host-call ids, frozen by the JAM specification this engine implements.
/// Values are chosen to be stable and non-overlapping; their exact numeric
/// assignment is an external protocol detail this engine only needs to agree
/// with itself on.
pub mod call_id {
    use jam_vm::HostCallId;

    /// `gas`
    pub const GAS: HostCallId = 0;
    /// `lookup`
    pub const LOOKUP: HostCallId = 1;
    /// `read`
    pub const READ: HostCallId = 2;
    /// `write`
    pub const WRITE: HostCallId = 3;
    /// `info`
    pub const INFO: HostCallId = 4;
    /// `new`
    pub const NEW: HostCallId = 5;
    /// `transfer`
    pub const TRANSFER: HostCallId = 6;
    /// `bless`
    pub const BLESS: HostCallId = 7;
    /// `assign`
    pub const ASSIGN: HostCallId = 8;
    /// `designate`
    pub const DESIGNATE: HostCallId = 9;
    /// `upgrade`
    pub const UPGRADE: HostCallId = 10;
    /// `eject`
    pub const EJECT: HostCallId = 11;
    /// `query`
    pub const QUERY: HostCallId = 12;
    /// `solicit`
    pub const SOLICIT: HostCallId = 13;
    /// `forget`
    pub const FORGET: HostCallId = 14;
    /// `yield`
    pub const YIELD: HostCallId = 15;
    /// `checkpoint`
    pub const CHECKPOINT: HostCallId = 16;
}

/// The opaque host context every dispatched call runs against: the service
/// currently accumulating, its context clone, and the side channels a call
/// may populate (queued transfers, the single accumulation output, and a
/// restore point for `checkpoint`).
pub struct ServiceHostContext<'a> {
    /// The current service's isolated context clone (§4.3).
    pub context: &'a mut AccumulationContext,
    /// The service currently executing.
    pub service_id: ServiceId,
    /// Transfers queued by `transfer`, dispatched in the second pass (§4.8).
    pub transfers_out: &'a mut Vec<DeferredTransfer>,
    /// The digest `yield` recorded, if any (§4.9).
    pub accumulation_output: &'a mut Option<AccumulateOutput>,
    /// A restore point taken by `checkpoint`. If present when the invocation
    /// ends abnormally, the engine commits this instead of discarding the
    /// clone outright (§5 transactionality; see `single_service` module doc).
    pub checkpoint: &'a mut Option<AccumulationContext>,
}

impl ServiceHostContext<'_> {
    fn current_account(&self) -> Option<&ServiceAccount> {
        self.context.delta.read().get(&self.service_id)
    }
}

fn charge_base_gas(ctx: &mut dyn VmExecutionContext) -> Result<(), ExitStatus> {
    ctx.deduct_gas(HOST_CALL_BASE_GAS)
}

fn read_fixed<const N: usize>(
    ctx: &dyn VmExecutionContext,
    ptr_register: u64,
) -> Result<[u8; N], ExitStatus> {
    let bytes = ctx.read_memory(ptr_register as u32, N as u32)?;
    bytes.try_into().map_err(|_| ExitStatus::Panic)
}

fn write_partial(
    ctx: &mut dyn VmExecutionContext,
    out_ptr: u64,
    off: u64,
    lim: u64,
    data: &[u8],
) -> Result<(), ExitStatus> {
    let off = off as usize;
    if off > data.len() {
        return Ok(());
    }
    let end = (off + lim as usize).min(data.len());
    ctx.write_memory(out_ptr as u32, &data[off..end])
}

/// `gas`: R7 ← remaining gas after the flat deduction.
pub fn gas(ctx: &mut dyn VmExecutionContext, _host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    ctx.set_register(R7, ctx.gas_remaining());
    Ok(())
}

/// `lookup(svc*, hash_ptr, out_ptr, off, lim)`.
pub fn lookup(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let svc_arg = ctx.register(R7);
    let hash_ptr = ctx.register(R8);
    let out_ptr = ctx.register(R9);
    let off = ctx.register(R10);
    let lim = ctx.register(R11);

    let target = if svc_arg == u64::MAX {
        host.service_id
    } else {
        ServiceId(svc_arg as u32)
    };
    let hash: [u8; 32] = read_fixed(ctx, hash_ptr)?;

    let account = match host.context.delta.read().get(&target) {
        Some(a) => a,
        None => {
            ctx.set_register(R7, HostResultCode::Who.as_register());
            return Ok(());
        }
    };
    let key = structured_key(KeyKind::Preimage, target, &hash.into());
    match account.preimages.get(&key) {
        Some(preimage) => {
            write_partial(ctx, out_ptr, off, lim, preimage)?;
            ctx.set_register(R7, preimage.len() as u64);
        }
        None => ctx.set_register(R7, HostResultCode::None.as_register()),
    }
    Ok(())
}

/// `read(svc*, key_ptr, key_len, out_ptr, off, lim)`.
pub fn read(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let svc_arg = ctx.register(R7);
    let key_ptr = ctx.register(R8);
    let out_ptr = ctx.register(R10);
    let off = ctx.register(R11);
    let lim = ctx.register(R12);

    let target = if svc_arg == u64::MAX {
        host.service_id
    } else {
        ServiceId(svc_arg as u32)
    };
    let raw_key: [u8; 31] = read_fixed(ctx, key_ptr)?;

    let account = match host.context.delta.read().get(&target) {
        Some(a) => a,
        None => {
            ctx.set_register(R7, HostResultCode::Who.as_register());
            return Ok(());
        }
    };
    match account.storage.get(&raw_key) {
        Some(value) => {
            write_partial(ctx, out_ptr, off, lim, value)?;
            ctx.set_register(R7, value.len() as u64);
        }
        None => ctx.set_register(R7, HostResultCode::None.as_register()),
    }
    Ok(())
}

/// `write(key_ptr, key_len, val_ptr, val_len)`: refuses with FULL, state
/// unchanged, if the post-write threshold balance would exceed `balance`.
pub fn write(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let key_ptr = ctx.register(R7);
    let val_ptr = ctx.register(R9);
    let val_len = ctx.register(R10);

    let raw_key: [u8; 31] = read_fixed(ctx, key_ptr)?;
    let value = if val_len == 0 {
        None
    } else {
        Some(ctx.read_memory(val_ptr as u32, val_len as u32)?)
    };

    match host.context.delta.try_write_storage(host.service_id, raw_key, value) {
        Ok(prior) => {
            let code = prior.map(|p| p.len() as u64).unwrap_or(HostResultCode::None.as_register());
            ctx.set_register(R7, code);
        }
        Err(_) => ctx.set_register(R7, HostResultCode::Full.as_register()),
    }
    Ok(())
}

/// `info(svc*, out_ptr, off, lim)`.
pub fn info(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let svc_arg = ctx.register(R7);
    let out_ptr = ctx.register(R8);
    let off = ctx.register(R9);
    let lim = ctx.register(R10);

    let target = if svc_arg == u64::MAX {
        host.service_id
    } else {
        ServiceId(svc_arg as u32)
    };
    let account = match host.context.delta.read().get(&target) {
        Some(a) => a,
        None => {
            ctx.set_register(R7, HostResultCode::Who.as_register());
            return Ok(());
        }
    };
    let info = account.info();
    let encoded = {
        use parity_scale_codec::Encode;
        EncodableServiceInfo::from(info).encode()
    };
    write_partial(ctx, out_ptr, off, lim, &encoded)?;
    ctx.set_register(R7, encoded.len() as u64);
    Ok(())
}

/// A SCALE-encodable mirror of `ServiceInfo`, local to this module since
/// `ServiceInfo` itself carries an `Option<ServiceId>` the core crate keeps
/// un-derived to stay permissive about future fields.
#[derive(parity_scale_codec::Encode)]
struct EncodableServiceInfo {
    code_hash: [u8; 32],
    balance: u64,
    threshold_balance: u64,
    min_gas_accumulate: u64,
    min_gas_on_transfer: u64,
    item_count: u32,
    octet_footprint: u64,
    creation_slot: u32,
    last_accumulation_slot: u32,
    parent_service: u32,
}

impl From<jam_types::ServiceInfo> for EncodableServiceInfo {
    fn from(info: jam_types::ServiceInfo) -> Self {
        Self {
            code_hash: info.code_hash.0,
            balance: info.balance,
            threshold_balance: info.threshold_balance,
            min_gas_accumulate: info.min_gas_accumulate,
            min_gas_on_transfer: info.min_gas_on_transfer,
            item_count: info.item_count,
            octet_footprint: info.octet_footprint,
            creation_slot: info.creation_slot,
            last_accumulation_slot: info.last_accumulation_slot,
            parent_service: info.parent_service.map(|s| s.0).unwrap_or(u32::MAX),
        }
    }
}

/// The deterministic balance newly created services are seeded with, debited
/// from the creating service.
pub const NEW_SERVICE_INITIAL_BALANCE: Balance = 100;

/// `new(code_hash_ptr, code_len, min_acc_gas, min_xfer_gas)`.
pub fn new_service(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let code_hash_ptr = ctx.register(R7);
    let min_acc_gas = ctx.register(R9);
    let min_xfer_gas = ctx.register(R10);
    let code_hash: [u8; 32] = read_fixed(ctx, code_hash_ptr)?;

    let creator_id = host.service_id;
    let time_slot = host.context.time_slot;
    let entropy = host.context.entropy;

    let mut candidate = match first_candidate_service_id(creator_id, &entropy, time_slot) {
        Ok(id) => id,
        Err(_) => return Err(ExitStatus::Panic),
    };
    let delta = host.context.delta.read();
    while delta.contains_key(&candidate) {
        candidate = next_candidate_service_id(candidate);
    }
    drop(delta);

    let creator_balance = match host.current_account() {
        Some(a) => a.balance,
        None => return Err(ExitStatus::Panic),
    };
    if creator_balance < NEW_SERVICE_INITIAL_BALANCE {
        ctx.set_register(R7, HostResultCode::Cash.as_register());
        return Ok(());
    }

    let delta = host.context.delta.mutate();
    if let Some(creator) = delta.get_mut(&creator_id) {
        creator.balance -= NEW_SERVICE_INITIAL_BALANCE;
    }
    let preimage_key = structured_key(KeyKind::Lookup, candidate, &code_hash.into());
    let mut account = ServiceAccount {
        storage: Default::default(),
        preimages: Default::default(),
        preimage_lookups: Default::default(),
        code_hash: code_hash.into(),
        balance: NEW_SERVICE_INITIAL_BALANCE,
        min_gas_accumulate: min_acc_gas,
        min_gas_on_transfer: min_xfer_gas,
        creation_slot: time_slot,
        last_accumulation_slot: time_slot,
        parent_service: Some(creator_id),
        storage_offset: 0,
    };
    account.preimage_lookups.insert(preimage_key, PreimageStatus::Requested);
    delta.insert(candidate, account);

    ctx.set_register(R7, candidate.0 as u64);
    Ok(())
}

/// `transfer(dst, amount, gas_limit, memo_ptr)`.
pub fn transfer(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let dst = ServiceId(ctx.register(R7) as u32);
    let amount = ctx.register(R8);
    let gas_limit = ctx.register(R9);
    let memo_ptr = ctx.register(R10);

    let memo: [u8; TRANSFER_MEMO_LEN] = read_fixed(ctx, memo_ptr)?;

    let dst_min_gas = match host.context.delta.read().get(&dst) {
        Some(a) => a.min_gas_on_transfer,
        None => {
            ctx.set_register(R7, HostResultCode::Who.as_register());
            return Ok(());
        }
    };
    if gas_limit < dst_min_gas {
        ctx.set_register(R7, HostResultCode::Low.as_register());
        return Ok(());
    }
    let caller_balance = match host.current_account() {
        Some(a) => a.balance,
        None => return Err(ExitStatus::Panic),
    };
    if caller_balance < amount {
        ctx.set_register(R7, HostResultCode::Cash.as_register());
        return Ok(());
    }

    let delta = host.context.delta.mutate();
    if let Some(caller) = delta.get_mut(&host.service_id) {
        caller.balance -= amount;
    }
    host.transfers_out.push(DeferredTransfer {
        sender: host.service_id,
        destination: dst,
        amount,
        memo,
        gas_limit,
    });
    ctx.set_register(R7, HostResultCode::Ok.as_register());
    Ok(())
}

/// `bless`: only the manager may update the manager/always-accumulate table.
pub fn bless(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    if host.context.chi.read().manager != host.service_id {
        ctx.set_register(R7, HostResultCode::Who.as_register());
        return Ok(());
    }
    let new_manager = ServiceId(ctx.register(R7) as u32);
    host.context.chi.mutate().manager = new_manager;
    ctx.set_register(R7, HostResultCode::Ok.as_register());
    Ok(())
}

/// `assign(core, assigner)`: only the current assigner of `core` may replace it.
pub fn assign(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let core = ctx.register(R7) as usize;
    let new_assigner = ServiceId(ctx.register(R8) as u32);

    let permitted = host.context.chi.read().assigner(core) == Some(host.service_id);
    if !permitted {
        ctx.set_register(R7, HostResultCode::Core.as_register());
        return Ok(());
    }
    let chi = host.context.chi.mutate();
    match chi.assign.get_mut(core) {
        Some(slot) => {
            *slot = new_assigner;
            ctx.set_register(R7, HostResultCode::Ok.as_register());
        }
        None => ctx.set_register(R7, HostResultCode::Core.as_register()),
    }
    Ok(())
}

/// `designate(delegator)`: only the current delegator may hand it off.
pub fn designate(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    if host.context.chi.read().designate != host.service_id {
        ctx.set_register(R7, HostResultCode::Who.as_register());
        return Ok(());
    }
    let new_delegator = ServiceId(ctx.register(R7) as u32);
    host.context.chi.mutate().designate = new_delegator;
    ctx.set_register(R7, HostResultCode::Ok.as_register());
    Ok(())
}

/// `upgrade(code_hash_ptr, min_acc_gas, min_xfer_gas)`: replaces the
/// caller's own code hash and minimums, re-soliciting the new preimage.
pub fn upgrade(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let code_hash_ptr = ctx.register(R7);
    let min_acc_gas = ctx.register(R8);
    let min_xfer_gas = ctx.register(R9);
    let code_hash: [u8; 32] = read_fixed(ctx, code_hash_ptr)?;

    let service_id = host.service_id;
    let delta = host.context.delta.mutate();
    match delta.get_mut(&service_id) {
        Some(account) => {
            account.code_hash = code_hash.into();
            account.min_gas_accumulate = min_acc_gas;
            account.min_gas_on_transfer = min_xfer_gas;
            let lookup_key = structured_key(KeyKind::Lookup, service_id, &code_hash.into());
            account
                .preimage_lookups
                .entry(lookup_key)
                .or_insert(PreimageStatus::Requested);
            ctx.set_register(R7, HostResultCode::Ok.as_register());
        }
        None => ctx.set_register(R7, HostResultCode::Who.as_register()),
    }
    Ok(())
}

/// `eject(target)`: removes an empty, zero-balance service the caller
/// created, crediting any residual balance back to the caller.
pub fn eject(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let target = ServiceId(ctx.register(R7) as u32);

    let eligible = matches!(
        host.context.delta.read().get(&target),
        Some(account)
            if account.parent_service == Some(host.service_id)
                && account.storage.is_empty()
                && account.preimage_lookups.is_empty()
    );
    if !eligible {
        ctx.set_register(R7, HostResultCode::Who.as_register());
        return Ok(());
    }

    let delta = host.context.delta.mutate();
    let residual = delta.remove(&target).map(|a| a.balance).unwrap_or(0);
    if let Some(caller) = delta.get_mut(&host.service_id) {
        caller.balance += residual;
    }
    ctx.set_register(R7, HostResultCode::Ok.as_register());
    Ok(())
}

/// `query(svc*, hash_ptr)`: R7/R8 report a preimage-lookup entry's status
/// slots (0 used entries ⇒ `[]`, up to 3), mirroring `PreimageStatus`.
pub fn query(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let svc_arg = ctx.register(R7);
    let hash_ptr = ctx.register(R8);
    let target = if svc_arg == u64::MAX {
        host.service_id
    } else {
        ServiceId(svc_arg as u32)
    };
    let hash: [u8; 32] = read_fixed(ctx, hash_ptr)?;
    let key = structured_key(KeyKind::Lookup, target, &hash.into());

    match host.context.delta.read().get(&target).and_then(|a| a.preimage_lookups.get(&key)) {
        Some(PreimageStatus::Requested) => {
            ctx.set_register(R7, 0);
        }
        Some(PreimageStatus::Available { since }) => {
            ctx.set_register(R7, 1);
            ctx.set_register(R8, *since as u64);
        }
        Some(PreimageStatus::Unavailable { since, until }) => {
            ctx.set_register(R7, 2);
            ctx.set_register(R8, *since as u64);
            ctx.set_register(R9, *until as u64);
        }
        Some(PreimageStatus::Reinstated {
            prior_since,
            prior_until,
            since,
        }) => {
            ctx.set_register(R7, 3);
            ctx.set_register(R8, *prior_since as u64);
            ctx.set_register(R9, *prior_until as u64);
            ctx.set_register(R10, *since as u64);
        }
        None => ctx.set_register(R7, HostResultCode::None.as_register()),
    }
    Ok(())
}

/// `solicit(hash_ptr, timeslot)`: `[] → [t]`; `[t0,t1] → [t0,t1,t]`; else HUH.
pub fn solicit(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let hash_ptr = ctx.register(R7);
    let timeslot = ctx.register(R8) as u32;
    let hash: [u8; 32] = read_fixed(ctx, hash_ptr)?;
    let service_id = host.service_id;
    let key = structured_key(KeyKind::Lookup, service_id, &hash.into());

    let delta = host.context.delta.mutate();
    let account = match delta.get_mut(&service_id) {
        Some(a) => a,
        None => return Err(ExitStatus::Panic),
    };

    use std::collections::btree_map::Entry;
    match account.preimage_lookups.entry(key) {
        Entry::Vacant(entry) => {
            entry.insert(PreimageStatus::Requested);
            ctx.set_register(R7, HostResultCode::Ok.as_register());
        }
        Entry::Occupied(mut entry) => match *entry.get() {
            PreimageStatus::Unavailable { since, until } => {
                entry.insert(PreimageStatus::Reinstated {
                    prior_since: since,
                    prior_until: until,
                    since: timeslot,
                });
                ctx.set_register(R7, HostResultCode::Ok.as_register());
            }
            _ => ctx.set_register(R7, HostResultCode::Huh.as_register()),
        },
    }
    Ok(())
}

/// `forget(hash_ptr, now, expungement_period)`: see §4.5 transitions.
pub fn forget(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    let hash_ptr = ctx.register(R7);
    let now = ctx.register(R8) as u32;
    let expungement_period = ctx.register(R9) as u32;
    let hash: [u8; 32] = read_fixed(ctx, hash_ptr)?;
    let service_id = host.service_id;
    let key = structured_key(KeyKind::Lookup, service_id, &hash.into());
    let preimage_key = structured_key(KeyKind::Preimage, service_id, &hash.into());

    let delta = host.context.delta.mutate();
    let account = match delta.get_mut(&service_id) {
        Some(a) => a,
        None => return Err(ExitStatus::Panic),
    };

    let status = match account.preimage_lookups.get(&key).copied() {
        Some(s) => s,
        None => {
            ctx.set_register(R7, HostResultCode::None.as_register());
            return Ok(());
        }
    };
    match status {
        PreimageStatus::Requested => {
            account.preimage_lookups.remove(&key);
            account.preimages.remove(&preimage_key);
            ctx.set_register(R7, HostResultCode::Ok.as_register());
        }
        PreimageStatus::Available { since } => {
            account
                .preimage_lookups
                .insert(key, PreimageStatus::Unavailable { since, until: now });
            ctx.set_register(R7, HostResultCode::Ok.as_register());
        }
        PreimageStatus::Unavailable { since: _, until } if until < now.saturating_sub(expungement_period) => {
            account.preimage_lookups.remove(&key);
            account.preimages.remove(&preimage_key);
            ctx.set_register(R7, HostResultCode::Ok.as_register());
        }
        PreimageStatus::Reinstated {
            since,
            prior_until,
            ..
        } if prior_until < now.saturating_sub(expungement_period) => {
            account
                .preimage_lookups
                .insert(key, PreimageStatus::Unavailable { since, until: now });
            ctx.set_register(R7, HostResultCode::Ok.as_register());
        }
        _ => ctx.set_register(R7, HostResultCode::Huh.as_register()),
    }
    Ok(())
}

/// `yield(hash_ptr)`: records the service's single accumulation output.
/// A second call within the same invocation is rejected with HUH rather
/// than silently overwriting the first (§4.9 uniqueness invariant).
pub fn yield_output(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    if host.accumulation_output.is_some() {
        ctx.set_register(R7, HostResultCode::Huh.as_register());
        return Ok(());
    }
    let hash_ptr = ctx.register(R7);
    let hash: [u8; 32] = read_fixed(ctx, hash_ptr)?;
    *host.accumulation_output = Some(hash.into());
    ctx.set_register(R7, HostResultCode::Ok.as_register());
    Ok(())
}

/// `checkpoint`: snapshots the current context as a restore point a
/// terminal out-of-gas or panic exit will fall back to, instead of
/// discarding the clone's effects entirely (§5).
pub fn checkpoint(ctx: &mut dyn VmExecutionContext, host: &mut ServiceHostContext<'_>) -> Result<(), ExitStatus> {
    charge_base_gas(ctx)?;
    *host.checkpoint = Some(host.context.deep_clone());
    ctx.set_register(R7, HostResultCode::Ok.as_register());
    Ok(())
}

/// Builds the full host-call dispatch table (§4.5, §6).
pub fn build_host_call_table<'a>() -> HostCallTable<ServiceHostContext<'a>> {
    let mut table = HostCallTable::new();
    table.register(call_id::GAS, gas);
    table.register(call_id::LOOKUP, lookup);
    table.register(call_id::READ, read);
    table.register(call_id::WRITE, write);
    table.register(call_id::INFO, info);
    table.register(call_id::NEW, new_service);
    table.register(call_id::TRANSFER, transfer);
    table.register(call_id::BLESS, bless);
    table.register(call_id::ASSIGN, assign);
    table.register(call_id::DESIGNATE, designate);
    table.register(call_id::UPGRADE, upgrade);
    table.register(call_id::EJECT, eject);
    table.register(call_id::QUERY, query);
    table.register(call_id::SOLICIT, solicit);
    table.register(call_id::FORGET, forget);
    table.register(call_id::YIELD, yield_output);
    table.register(call_id::CHECKPOINT, checkpoint);
    table
}
