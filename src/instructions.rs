//! Opcode handlers.
//!
//! Base gas costs were already deducted by the block prologue; handlers only
//! charge the dynamic parts. Stack bounds within a block were verified at
//! block entry, so stack accesses here are unchecked.

use core::cmp::min;

use revm_primitives::{keccak256, Address, Bytes, SpecId, B256, U256};

use crate::bytecode::{Instruction, Next};
use crate::host::{CallKind, Message, StorageStatus};
use crate::state::{num_words, ExecutionState, StatusCode, CALL_DEPTH_LIMIT, STACK_LIMIT};

const I256_MIN: U256 = U256::from_limbs([0, 0, 0, 0x8000_0000_0000_0000]);

const CALL_STIPEND: i64 = 2300;
const VALUE_TRANSFER_COST: i64 = 9000;
const ACCOUNT_CREATION_COST: i64 = 25000;
const WORD_COPY_COST: i64 = 3;
const KECCAK_WORD_COST: i64 = 6;
const LOG_DATA_COST: i64 = 8;

#[inline]
fn to_address(word: U256) -> Address {
    Address::from_slice(&word.to_be_bytes::<32>()[12..])
}

#[inline]
fn address_word(address: Address) -> U256 {
    U256::from_be_slice(address.as_slice())
}

#[inline]
fn bool_word(value: bool) -> U256 {
    U256::from(value as u8)
}

#[inline]
fn is_neg(value: &U256) -> bool {
    value.bit(255)
}

#[inline]
fn abs(value: U256) -> U256 {
    if is_neg(&value) {
        value.wrapping_neg()
    } else {
        value
    }
}

#[inline]
fn i256_lt(a: &U256, b: &U256) -> bool {
    match (is_neg(a), is_neg(b)) {
        (true, false) => true,
        (false, true) => false,
        // Two's complement preserves unsigned order within one sign.
        _ => a < b,
    }
}

/// Copies `src[src_offset..]` into `dst`, zero-filling what the source does
/// not cover.
fn copy_padded(dst: &mut [u8], src: &[u8], src_offset: U256) {
    let copied = match usize::try_from(src_offset) {
        Ok(offset) if offset < src.len() => {
            let n = min(dst.len(), src.len() - offset);
            dst[..n].copy_from_slice(&src[offset..offset + n]);
            n
        }
        _ => 0,
    };
    dst[copied..].fill(0);
}

// Intrinsics.

/// The block-entry intrinsic occupying the `JUMPDEST` slot: performs the
/// combined gas and stack precondition check for the whole block, then
/// deducts the block's base cost in one step.
pub fn opx_beginblock(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let block = instr.arg.block();
    if state.gas_left < block.gas_cost as i64 {
        return state.exit(StatusCode::OutOfGas);
    }
    if (state.stack.len() as i64) < block.stack_req as i64 {
        return state.exit(StatusCode::StackUnderflow);
    }
    if state.stack.len() + block.stack_max_growth as usize > STACK_LIMIT {
        return state.exit(StatusCode::StackOverflow);
    }
    state.gas_left -= block.gas_cost as i64;
    state.current_block_cost = block.gas_cost;
    Next::Step
}

pub fn op_undefined(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    state.exit(StatusCode::UndefinedInstruction)
}

// 0x00: stop and arithmetic.

pub fn op_stop(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    state.exit(StatusCode::Success)
}

pub fn op_add(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a.wrapping_add(b));
    Next::Step
}

pub fn op_mul(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a.wrapping_mul(b));
    Next::Step
}

pub fn op_sub(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a.wrapping_sub(b));
    Next::Step
}

pub fn op_div(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a.checked_div(b).unwrap_or_default());
    Next::Step
}

pub fn op_sdiv(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    let result = if b.is_zero() {
        U256::ZERO
    } else if a == I256_MIN && b == U256::MAX {
        // MIN / -1 overflows back to MIN.
        I256_MIN
    } else {
        let quotient = abs(a).checked_div(abs(b)).unwrap_or_default();
        if is_neg(&a) != is_neg(&b) {
            quotient.wrapping_neg()
        } else {
            quotient
        }
    };
    state.stack.push(result);
    Next::Step
}

pub fn op_mod(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a.checked_rem(b).unwrap_or_default());
    Next::Step
}

pub fn op_smod(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    let result = if b.is_zero() {
        U256::ZERO
    } else {
        let rem = abs(a).checked_rem(abs(b)).unwrap_or_default();
        // The sign follows the dividend.
        if is_neg(&a) {
            rem.wrapping_neg()
        } else {
            rem
        }
    };
    state.stack.push(result);
    Next::Step
}

pub fn op_addmod(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    let m = state.stack.pop();
    let result = if m.is_zero() { U256::ZERO } else { a.add_mod(b, m) };
    state.stack.push(result);
    Next::Step
}

pub fn op_mulmod(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    let m = state.stack.pop();
    let result = if m.is_zero() { U256::ZERO } else { a.mul_mod(b, m) };
    state.stack.push(result);
    Next::Step
}

pub fn op_exp(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let base = state.stack.pop();
    let exponent = state.stack.pop();
    let exponent_bytes = (256 - exponent.leading_zeros() + 7) / 8;
    let byte_cost: i64 = if state.rev.is_enabled_in(SpecId::SPURIOUS_DRAGON) { 50 } else { 10 };
    if !state.charge(byte_cost * exponent_bytes as i64) {
        return state.exit(StatusCode::OutOfGas);
    }
    state.stack.push(base.pow(exponent));
    Next::Step
}

pub fn op_signextend(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let ext = state.stack.pop();
    let x = state.stack.pop();
    let result = match usize::try_from(ext) {
        Ok(n) if n < 31 => {
            let sign_bit = 8 * n + 7;
            let mask = (U256::from(1u8) << (sign_bit + 1)).wrapping_sub(U256::from(1u8));
            if x.bit(sign_bit) {
                x | !mask
            } else {
                x & mask
            }
        }
        _ => x,
    };
    state.stack.push(result);
    Next::Step
}

// 0x10: comparison and bitwise.

pub fn op_lt(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(bool_word(a < b));
    Next::Step
}

pub fn op_gt(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(bool_word(a > b));
    Next::Step
}

pub fn op_slt(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(bool_word(i256_lt(&a, &b)));
    Next::Step
}

pub fn op_sgt(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(bool_word(i256_lt(&b, &a)));
    Next::Step
}

pub fn op_eq(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(bool_word(a == b));
    Next::Step
}

pub fn op_iszero(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    state.stack.push(bool_word(a.is_zero()));
    Next::Step
}

pub fn op_and(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a & b);
    Next::Step
}

pub fn op_or(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a | b);
    Next::Step
}

pub fn op_xor(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    let b = state.stack.pop();
    state.stack.push(a ^ b);
    Next::Step
}

pub fn op_not(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let a = state.stack.pop();
    state.stack.push(!a);
    Next::Step
}

pub fn op_byte(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let index = state.stack.pop();
    let value = state.stack.pop();
    // Byte 0 is the most significant.
    let result = match usize::try_from(index) {
        Ok(i) if i < 32 => U256::from(value.byte(31 - i)),
        _ => U256::ZERO,
    };
    state.stack.push(result);
    Next::Step
}

pub fn op_shl(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let shift = state.stack.pop();
    let value = state.stack.pop();
    let result = match usize::try_from(shift) {
        Ok(s) if s < 256 => value << s,
        _ => U256::ZERO,
    };
    state.stack.push(result);
    Next::Step
}

pub fn op_shr(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let shift = state.stack.pop();
    let value = state.stack.pop();
    let result = match usize::try_from(shift) {
        Ok(s) if s < 256 => value >> s,
        _ => U256::ZERO,
    };
    state.stack.push(result);
    Next::Step
}

pub fn op_sar(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let shift = state.stack.pop();
    let value = state.stack.pop();
    let neg = is_neg(&value);
    let result = match usize::try_from(shift) {
        Ok(s) if s < 256 => {
            let shifted = value >> s;
            if neg && s > 0 {
                shifted | (U256::MAX << (256 - s))
            } else {
                shifted
            }
        }
        _ => {
            if neg {
                U256::MAX
            } else {
                U256::ZERO
            }
        }
    };
    state.stack.push(result);
    Next::Step
}

// 0x20: hashing.

pub fn op_keccak256(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let offset = state.stack.pop();
    let size = state.stack.pop();
    let Some((offset, size)) = state.memory_span(offset, size) else {
        return state.exit(StatusCode::OutOfGas);
    };
    if !state.charge(KECCAK_WORD_COST * num_words(size as u64) as i64) {
        return state.exit(StatusCode::OutOfGas);
    }
    let hash = keccak256(state.memory.slice(offset, size));
    state.stack.push(U256::from_be_bytes(hash.0));
    Next::Step
}

// 0x30: environment.

pub fn op_address(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let address = state.msg.recipient;
    state.stack.push(address_word(address));
    Next::Step
}

pub fn op_balance(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let address = to_address(state.stack.pop());
    let balance = state.host.get_balance(address);
    state.stack.push(balance);
    Next::Step
}

pub fn op_origin(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let origin = state.host.get_tx_context().tx_origin;
    state.stack.push(address_word(origin));
    Next::Step
}

pub fn op_caller(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let sender = state.msg.sender;
    state.stack.push(address_word(sender));
    Next::Step
}

pub fn op_callvalue(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let value = state.msg.value;
    state.stack.push(value);
    Next::Step
}

pub fn op_calldataload(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let index = state.stack.pop();
    let input = &state.msg.input_data;
    let result = match usize::try_from(index) {
        Ok(i) if i < input.len() => {
            let mut word = [0u8; 32];
            let n = min(32, input.len() - i);
            word[..n].copy_from_slice(&input[i..i + n]);
            U256::from_be_bytes(word)
        }
        _ => U256::ZERO,
    };
    state.stack.push(result);
    Next::Step
}

pub fn op_calldatasize(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let size = state.msg.input_data.len();
    state.stack.push(U256::from(size));
    Next::Step
}

pub fn op_calldatacopy(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let mem_offset = state.stack.pop();
    let data_offset = state.stack.pop();
    let size = state.stack.pop();
    let Some((mem_offset, size)) = state.memory_span(mem_offset, size) else {
        return state.exit(StatusCode::OutOfGas);
    };
    if !state.charge(WORD_COPY_COST * num_words(size as u64) as i64) {
        return state.exit(StatusCode::OutOfGas);
    }
    let msg = state.msg;
    copy_padded(state.memory.slice_mut(mem_offset, size), &msg.input_data, data_offset);
    Next::Step
}

pub fn op_codesize(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let size = state.code.len();
    state.stack.push(U256::from(size));
    Next::Step
}

pub fn op_codecopy(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let mem_offset = state.stack.pop();
    let code_offset = state.stack.pop();
    let size = state.stack.pop();
    let Some((mem_offset, size)) = state.memory_span(mem_offset, size) else {
        return state.exit(StatusCode::OutOfGas);
    };
    if !state.charge(WORD_COPY_COST * num_words(size as u64) as i64) {
        return state.exit(StatusCode::OutOfGas);
    }
    let code = state.code;
    copy_padded(state.memory.slice_mut(mem_offset, size), code, code_offset);
    Next::Step
}

pub fn op_gasprice(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let price = state.host.get_tx_context().tx_gas_price;
    state.stack.push(price);
    Next::Step
}

pub fn op_extcodesize(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let address = to_address(state.stack.pop());
    let size = state.host.get_code_size(address);
    state.stack.push(U256::from(size));
    Next::Step
}

pub fn op_extcodecopy(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let address = to_address(state.stack.pop());
    let mem_offset = state.stack.pop();
    let code_offset = state.stack.pop();
    let size = state.stack.pop();
    let Some((mem_offset, size)) = state.memory_span(mem_offset, size) else {
        return state.exit(StatusCode::OutOfGas);
    };
    if !state.charge(WORD_COPY_COST * num_words(size as u64) as i64) {
        return state.exit(StatusCode::OutOfGas);
    }
    let code_offset = usize::try_from(code_offset).unwrap_or(usize::MAX);
    let ExecutionState { memory, host, .. } = state;
    let buffer = memory.slice_mut(mem_offset, size);
    let copied = host.copy_code(address, code_offset, buffer);
    buffer[copied..].fill(0);
    Next::Step
}

pub fn op_returndatasize(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let size = state.return_data.len();
    state.stack.push(U256::from(size));
    Next::Step
}

pub fn op_returndatacopy(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let mem_offset = state.stack.pop();
    let data_offset = state.stack.pop();
    let size = state.stack.pop();

    // Unlike the other copy instructions, reading past the end of the return
    // data buffer is an error.
    let end = data_offset.checked_add(size);
    match end.map(usize::try_from) {
        Some(Ok(end)) if end <= state.return_data.len() => {}
        _ => return state.exit(StatusCode::InvalidMemoryAccess),
    }

    let Some((mem_offset, size)) = state.memory_span(mem_offset, size) else {
        return state.exit(StatusCode::OutOfGas);
    };
    if !state.charge(WORD_COPY_COST * num_words(size as u64) as i64) {
        return state.exit(StatusCode::OutOfGas);
    }
    if size > 0 {
        let data_offset = usize::try_from(data_offset).unwrap_or(usize::MAX);
        let ExecutionState { memory, return_data, .. } = state;
        memory
            .slice_mut(mem_offset, size)
            .copy_from_slice(&return_data[data_offset..data_offset + size]);
    }
    Next::Step
}

pub fn op_extcodehash(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let address = to_address(state.stack.pop());
    let hash = state.host.get_code_hash(address);
    state.stack.push(U256::from_be_bytes(hash.0));
    Next::Step
}

// 0x40: block context.

pub fn op_blockhash(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let number = state.stack.pop();
    let upper = state.host.get_tx_context().block_number;
    let lower = (upper - 256).max(0);
    let hash = match i64::try_from(number) {
        Ok(n) if n >= lower && n < upper => state.host.get_block_hash(n),
        _ => B256::ZERO,
    };
    state.stack.push(U256::from_be_bytes(hash.0));
    Next::Step
}

pub fn op_coinbase(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let coinbase = state.host.get_tx_context().block_coinbase;
    state.stack.push(address_word(coinbase));
    Next::Step
}

pub fn op_timestamp(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let timestamp = state.host.get_tx_context().block_timestamp;
    state.stack.push(U256::from(timestamp as u64));
    Next::Step
}

pub fn op_number(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let number = state.host.get_tx_context().block_number;
    state.stack.push(U256::from(number as u64));
    Next::Step
}

pub fn op_difficulty(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let difficulty = state.host.get_tx_context().block_difficulty;
    state.stack.push(difficulty);
    Next::Step
}

pub fn op_gaslimit(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let gas_limit = state.host.get_tx_context().block_gas_limit;
    state.stack.push(U256::from(gas_limit as u64));
    Next::Step
}

pub fn op_chainid(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let chain_id = state.host.get_tx_context().chain_id;
    state.stack.push(chain_id);
    Next::Step
}

pub fn op_selfbalance(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let balance = state.host.get_balance(state.msg.recipient);
    state.stack.push(balance);
    Next::Step
}

// 0x50: stack, memory, storage and control flow.

pub fn op_pop(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    state.stack.pop();
    Next::Step
}

pub fn op_mload(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let offset = state.stack.pop();
    let Some((offset, _)) = state.memory_span(offset, U256::from(32u8)) else {
        return state.exit(StatusCode::OutOfGas);
    };
    let word = state.memory.load_word(offset);
    state.stack.push(word);
    Next::Step
}

pub fn op_mstore(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let offset = state.stack.pop();
    let value = state.stack.pop();
    let Some((offset, _)) = state.memory_span(offset, U256::from(32u8)) else {
        return state.exit(StatusCode::OutOfGas);
    };
    state.memory.store_word(offset, value);
    Next::Step
}

pub fn op_mstore8(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let offset = state.stack.pop();
    let value = state.stack.pop();
    let Some((offset, _)) = state.memory_span(offset, U256::from(1u8)) else {
        return state.exit(StatusCode::OutOfGas);
    };
    state.memory.slice_mut(offset, 1)[0] = value.byte(0);
    Next::Step
}

pub fn op_sload(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let key = state.stack.pop();
    let value = state.host.get_storage(state.msg.recipient, key);
    state.stack.push(value);
    Next::Step
}

pub fn op_sstore(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    if state.msg.is_static {
        return state.exit(StatusCode::StaticModeViolation);
    }
    // EIP-2200 sentry: the net-metered SSTORE refuses to run on a nearly
    // exhausted frame.
    if state.rev.is_enabled_in(SpecId::ISTANBUL)
        && state.live_gas(instr.arg.number()) <= CALL_STIPEND
    {
        return state.exit(StatusCode::OutOfGas);
    }
    let key = state.stack.pop();
    let value = state.stack.pop();
    let status = state.host.set_storage(state.msg.recipient, key, value);

    // Net gas metering per EIP-1283, enabled at Constantinople, reverted at
    // Petersburg, re-enabled with EIP-2200 at Istanbul.
    let net_metering = state.rev == SpecId::CONSTANTINOPLE
        || state.rev.is_enabled_in(SpecId::ISTANBUL);
    let sload_like: i64 = if state.rev.is_enabled_in(SpecId::ISTANBUL) { 800 } else { 200 };
    let cost = if net_metering {
        match status {
            StorageStatus::Added => 20000,
            StorageStatus::Modified | StorageStatus::Deleted => 5000,
            StorageStatus::Unchanged | StorageStatus::ModifiedAgain => sload_like,
        }
    } else {
        match status {
            StorageStatus::Added => 20000,
            _ => 5000,
        }
    };
    if !state.charge(cost) {
        return state.exit(StatusCode::OutOfGas);
    }
    Next::Step
}

pub fn op_jump(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let destination = state.stack.pop();
    match jump_target(state, destination) {
        Some(index) => Next::Goto(index),
        None => state.exit(StatusCode::BadJumpDestination),
    }
}

pub fn op_jumpi(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let destination = state.stack.pop();
    let condition = state.stack.pop();
    if condition.is_zero() {
        return Next::Step;
    }
    match jump_target(state, destination) {
        Some(index) => Next::Goto(index),
        None => state.exit(StatusCode::BadJumpDestination),
    }
}

fn jump_target(state: &ExecutionState<'_>, destination: U256) -> Option<usize> {
    let offset = u32::try_from(destination).ok()?;
    state.analysis.find_jumpdest(offset)
}

pub fn op_pc(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    state.stack.push(U256::from(instr.arg.number() as u64));
    Next::Step
}

pub fn op_msize(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let size = state.memory.len();
    state.stack.push(U256::from(size));
    Next::Step
}

pub fn op_gas(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let gas = state.live_gas(instr.arg.number());
    state.stack.push(U256::from(gas as u64));
    Next::Step
}

// 0x5f: pushes, dups, swaps.

pub fn op_push0(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    state.stack.push(U256::ZERO);
    Next::Step
}

/// `PUSH1`..`PUSH8`: the immediate was assembled into a word at analysis
/// time.
pub fn op_push_small(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    state.stack.push(U256::from(instr.arg.small_push()));
    Next::Step
}

/// `PUSH9`..`PUSH32`: the immediate is read from the original code. Bytes
/// past the end of the code are implicit zeros.
pub fn op_push_full(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let (data, len) = instr.arg.push_data();
    let mut word = [0u8; 32];
    word[32 - len..32 - len + data.len()].copy_from_slice(data);
    state.stack.push(U256::from_be_bytes(word));
    Next::Step
}

pub fn op_dup<const N: usize>(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    let value = state.stack.peek(N - 1);
    state.stack.push(value);
    Next::Step
}

pub fn op_swap<const N: usize>(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    state.stack.swap_top(N);
    Next::Step
}

// 0xa0: logging.

pub fn op_log<const N: usize>(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    if state.msg.is_static {
        return state.exit(StatusCode::StaticModeViolation);
    }
    let offset = state.stack.pop();
    let size = state.stack.pop();
    let Some((offset, size)) = state.memory_span(offset, size) else {
        return state.exit(StatusCode::OutOfGas);
    };
    if !state.charge(LOG_DATA_COST * size as i64) {
        return state.exit(StatusCode::OutOfGas);
    }
    let mut topics = [B256::ZERO; N];
    for topic in &mut topics {
        *topic = B256::from(state.stack.pop().to_be_bytes::<32>());
    }
    let ExecutionState { memory, host, msg, .. } = state;
    host.emit_log(msg.recipient, memory.slice(offset, size), &topics);
    Next::Step
}

// 0xf0: system.

fn create_impl(instr: &Instruction<'_>, state: &mut ExecutionState<'_>, kind: CallKind) -> Next {
    if state.msg.is_static {
        return state.exit(StatusCode::StaticModeViolation);
    }
    let value = state.stack.pop();
    let offset = state.stack.pop();
    let size = state.stack.pop();
    let salt = if kind == CallKind::Create2 {
        B256::from(state.stack.pop().to_be_bytes::<32>())
    } else {
        B256::ZERO
    };
    let Some((offset, size)) = state.memory_span(offset, size) else {
        return state.exit(StatusCode::OutOfGas);
    };
    if kind == CallKind::Create2 {
        // Hashing the init code for the address derivation.
        if !state.charge(KECCAK_WORD_COST * num_words(size as u64) as i64) {
            return state.exit(StatusCode::OutOfGas);
        }
    }
    state.return_data.clear();

    if state.msg.depth >= CALL_DEPTH_LIMIT
        || (!value.is_zero() && state.host.get_balance(state.msg.recipient) < value)
    {
        state.stack.push(U256::ZERO);
        return Next::Step;
    }

    let gas_left = state.live_gas(instr.arg.number());
    let child_gas = if state.rev.is_enabled_in(SpecId::TANGERINE) {
        gas_left - gas_left / 64
    } else {
        gas_left
    };

    let msg = Message {
        kind,
        is_static: false,
        depth: state.msg.depth + 1,
        gas: child_gas,
        recipient: Address::ZERO,
        code_address: Address::ZERO,
        sender: state.msg.recipient,
        input_data: Bytes::copy_from_slice(state.memory.slice(offset, size)),
        value,
        create2_salt: salt,
    };
    let result = state.host.call(&msg);
    // Only revert data is observable after a create (EIP-211).
    if result.status_code == StatusCode::Revert {
        state.return_data = result.output_data.to_vec();
    }
    state.gas_left -= child_gas - result.gas_left;

    let created = if result.status_code == StatusCode::Success {
        address_word(result.create_address.unwrap_or(Address::ZERO))
    } else {
        U256::ZERO
    };
    state.stack.push(created);
    Next::Step
}

pub fn op_create(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    create_impl(instr, state, CallKind::Create)
}

pub fn op_create2(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    create_impl(instr, state, CallKind::Create2)
}

fn call_impl(
    instr: &Instruction<'_>,
    state: &mut ExecutionState<'_>,
    kind: CallKind,
    static_call: bool,
) -> Next {
    let gas = state.stack.pop();
    let destination = to_address(state.stack.pop());
    let value = if kind == CallKind::DelegateCall || static_call {
        U256::ZERO
    } else {
        state.stack.pop()
    };
    let has_value = !value.is_zero();
    if kind == CallKind::Call && has_value && state.msg.is_static {
        return state.exit(StatusCode::StaticModeViolation);
    }
    let input_offset = state.stack.pop();
    let input_size = state.stack.pop();
    let output_offset = state.stack.pop();
    let output_size = state.stack.pop();

    let Some((input_offset, input_size)) = state.memory_span(input_offset, input_size) else {
        return state.exit(StatusCode::OutOfGas);
    };
    let Some((output_offset, output_size)) = state.memory_span(output_offset, output_size) else {
        return state.exit(StatusCode::OutOfGas);
    };

    let mut cost: i64 = 0;
    if has_value {
        cost += VALUE_TRANSFER_COST;
    }
    if kind == CallKind::Call
        && (has_value || !state.rev.is_enabled_in(SpecId::SPURIOUS_DRAGON))
        && !state.host.account_exists(destination)
    {
        cost += ACCOUNT_CREATION_COST;
    }
    if !state.charge(cost) {
        return state.exit(StatusCode::OutOfGas);
    }
    state.return_data.clear();

    let mut child_gas = match u64::try_from(gas) {
        Ok(g) => min(g, i64::MAX as u64) as i64,
        Err(_) => i64::MAX,
    };
    let gas_left = state.live_gas(instr.arg.number());
    if state.rev.is_enabled_in(SpecId::TANGERINE) {
        // Forward at most all but one 64th of the remaining gas.
        child_gas = min(child_gas, gas_left - gas_left / 64);
    } else if child_gas > gas_left {
        return state.exit(StatusCode::OutOfGas);
    }

    if state.msg.depth >= CALL_DEPTH_LIMIT
        || (has_value && state.host.get_balance(state.msg.recipient) < value)
    {
        state.stack.push(U256::ZERO);
        return Next::Step;
    }

    let mut msg = Message {
        kind,
        is_static: state.msg.is_static || static_call,
        depth: state.msg.depth + 1,
        gas: child_gas,
        recipient: destination,
        code_address: destination,
        sender: state.msg.recipient,
        input_data: Bytes::copy_from_slice(state.memory.slice(input_offset, input_size)),
        value,
        create2_salt: B256::ZERO,
    };
    match kind {
        CallKind::DelegateCall => {
            // Run foreign code in the current context.
            msg.recipient = state.msg.recipient;
            msg.sender = state.msg.sender;
            msg.value = state.msg.value;
        }
        CallKind::CallCode => {
            msg.recipient = state.msg.recipient;
        }
        _ => {}
    }
    if has_value {
        msg.gas += CALL_STIPEND;
    }
    let child_gas_total = msg.gas;

    let result = state.host.call(&msg);
    state.return_data = result.output_data.to_vec();

    let copy_size = min(output_size, state.return_data.len());
    if copy_size > 0 {
        state
            .memory
            .slice_mut(output_offset, copy_size)
            .copy_from_slice(&state.return_data[..copy_size]);
    }
    state.stack.push(bool_word(result.status_code == StatusCode::Success));

    state.gas_left -= child_gas_total - result.gas_left;
    if has_value {
        // The stipend is granted to the child on top of the 9000 already
        // charged, not paid a second time by this frame.
        state.gas_left += CALL_STIPEND;
    }
    Next::Step
}

pub fn op_call(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    call_impl(instr, state, CallKind::Call, false)
}

pub fn op_callcode(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    call_impl(instr, state, CallKind::CallCode, false)
}

pub fn op_delegatecall(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    call_impl(instr, state, CallKind::DelegateCall, false)
}

pub fn op_staticcall(instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    call_impl(instr, state, CallKind::Call, true)
}

fn return_impl(state: &mut ExecutionState<'_>, status: StatusCode) -> Next {
    let offset = state.stack.pop();
    let size = state.stack.pop();
    let Some((offset, size)) = state.memory_span(offset, size) else {
        return state.exit(StatusCode::OutOfGas);
    };
    state.output_offset = offset;
    state.output_size = size;
    state.exit(status)
}

pub fn op_return(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    return_impl(state, StatusCode::Success)
}

pub fn op_revert(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    return_impl(state, StatusCode::Revert)
}

pub fn op_invalid(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    state.exit(StatusCode::InvalidInstruction)
}

pub fn op_selfdestruct(_instr: &Instruction<'_>, state: &mut ExecutionState<'_>) -> Next {
    if state.msg.is_static {
        return state.exit(StatusCode::StaticModeViolation);
    }
    let beneficiary = to_address(state.stack.pop());
    if state.rev.is_enabled_in(SpecId::TANGERINE) {
        // From Spurious Dragon the new-account charge applies only when a
        // balance is actually moved.
        let charged = state.rev == SpecId::TANGERINE
            || !state.host.get_balance(state.msg.recipient).is_zero();
        if charged && !state.host.account_exists(beneficiary) {
            if !state.charge(ACCOUNT_CREATION_COST) {
                return state.exit(StatusCode::OutOfGas);
            }
        }
    }
    state.host.selfdestruct(state.msg.recipient, beneficiary);
    state.exit(StatusCode::Success)
}
