use revm_primitives::{SpecId, U256};

use crate::bytecode::{CodeAnalysis, Next};
use crate::host::{Host, Message};

/// EVM stack slot limit.
pub const STACK_LIMIT: usize = 1024;

/// Maximum nested call/create depth.
pub const CALL_DEPTH_LIMIT: i32 = 1024;

/// Memory offsets and sizes are bounded to this range before any expansion
/// cost is computed; anything beyond cannot be paid for anyway.
const MAX_BUFFER_SIZE: u64 = u32::MAX as u64;

/// Terminal status of an execution. Set on the state by the handler that
/// stops the dispatch loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusCode {
    /// Normal termination: `STOP`, `RETURN`, or running off the end of code.
    #[default]
    Success,
    /// Explicit `REVERT`: remaining gas and output data are preserved.
    Revert,
    /// The block-entry gas check or a handler-metered dynamic cost failed.
    OutOfGas,
    /// `INVALID` (0xfe) was executed.
    InvalidInstruction,
    /// An opcode not defined at this revision was executed.
    UndefinedInstruction,
    /// The block-entry stack growth check failed.
    StackOverflow,
    /// The block-entry stack requirement check failed.
    StackUnderflow,
    /// A jump target is not a `JUMPDEST`.
    BadJumpDestination,
    /// A read past the end of the return data buffer.
    InvalidMemoryAccess,
    /// A state-modifying instruction inside a static call frame.
    StaticModeViolation,
}

impl StatusCode {
    /// Returns `true` if remaining gas is preserved under this status.
    #[inline]
    pub fn keeps_gas(self) -> bool {
        matches!(self, Self::Success | Self::Revert)
    }
}

/// The operand stack.
///
/// Accessors do not bounds-check: the block-entry prologue has already
/// verified the requirements of every instruction in the block.
#[derive(Clone, Debug, Default)]
pub struct Stack(Vec<U256>);

impl Stack {
    pub fn new() -> Self {
        Self(Vec::with_capacity(STACK_LIMIT))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn push(&mut self, value: U256) {
        debug_assert!(self.0.len() < STACK_LIMIT, "stack overflow past block prologue");
        self.0.push(value);
    }

    #[inline]
    pub fn pop(&mut self) -> U256 {
        debug_assert!(!self.0.is_empty(), "stack underflow past block prologue");
        self.0.pop().unwrap_or_default()
    }

    /// Returns the item `n` slots below the top; `peek(0)` is the top.
    #[inline]
    pub fn peek(&self, n: usize) -> U256 {
        debug_assert!(n < self.0.len(), "stack underflow past block prologue");
        self.0.get(self.0.len().wrapping_sub(1 + n)).copied().unwrap_or_default()
    }

    /// Swaps the top with the item `n` slots below it.
    #[inline]
    pub fn swap_top(&mut self, n: usize) {
        debug_assert!(n < self.0.len(), "stack underflow past block prologue");
        let top = self.0.len() - 1;
        self.0.swap(top, top - n);
    }

    /// Bottom-to-top view of the stack contents.
    pub fn as_slice(&self) -> &[U256] {
        &self.0
    }
}

/// Linear byte memory, grown in 32-byte words.
#[derive(Clone, Debug, Default)]
pub struct Memory(Vec<u8>);

impl Memory {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Grows to `size` bytes, rounded up by the caller to a word multiple.
    fn grow(&mut self, size: usize) {
        debug_assert!(size % 32 == 0);
        self.0.resize(size, 0);
    }

    #[inline]
    pub fn slice(&self, offset: usize, size: usize) -> &[u8] {
        &self.0[offset..offset + size]
    }

    #[inline]
    pub fn slice_mut(&mut self, offset: usize, size: usize) -> &mut [u8] {
        &mut self.0[offset..offset + size]
    }

    /// Reads the 32-byte word at `offset`.
    #[inline]
    pub fn load_word(&self, offset: usize) -> U256 {
        let mut word = [0u8; 32];
        word.copy_from_slice(self.slice(offset, 32));
        U256::from_be_bytes(word)
    }

    /// Writes the 32-byte word at `offset`.
    #[inline]
    pub fn store_word(&mut self, offset: usize, value: U256) {
        self.slice_mut(offset, 32).copy_from_slice(&value.to_be_bytes::<32>());
    }
}

/// Rounds a byte size up to 32-byte words.
#[inline]
pub(crate) const fn num_words(size: u64) -> u64 {
    size.div_ceil(32)
}

const fn words_cost(words: u64) -> i64 {
    (3 * words + words * words / 512) as i64
}

/// All mutable state of a single execution frame.
///
/// Borrows the [`CodeAnalysis`] it executes and the host it calls out to;
/// the code outlives the analysis, which outlives the state.
pub struct ExecutionState<'a> {
    pub status: StatusCode,
    pub gas_left: i64,
    pub stack: Stack,
    pub memory: Memory,
    pub msg: &'a Message,
    pub host: &'a mut dyn Host,
    pub rev: SpecId,
    pub return_data: Vec<u8>,
    /// The code being executed, for `CODESIZE`/`CODECOPY`.
    pub code: &'a [u8],
    /// Span of `memory` holding the output of `RETURN`/`REVERT`.
    pub output_offset: usize,
    pub output_size: usize,
    /// Base gas cost of the block being executed, deducted in full at block
    /// entry. Needed to reconstruct live gas for the gas-sensitive opcodes.
    pub current_block_cost: u32,
    pub analysis: &'a CodeAnalysis<'a>,
}

impl<'a> ExecutionState<'a> {
    pub fn new(
        msg: &'a Message,
        rev: SpecId,
        host: &'a mut dyn Host,
        code: &'a [u8],
        analysis: &'a CodeAnalysis<'a>,
    ) -> Self {
        Self {
            status: StatusCode::Success,
            gas_left: msg.gas,
            stack: Stack::new(),
            memory: Memory::new(),
            msg,
            host,
            rev,
            return_data: Vec::new(),
            code,
            output_offset: 0,
            output_size: 0,
            current_block_cost: 0,
            analysis,
        }
    }

    /// Terminates the execution with the given status code.
    #[inline]
    pub fn exit(&mut self, status: StatusCode) -> Next {
        self.status = status;
        Next::Halt
    }

    /// Subtracts a dynamic cost; returns `false` on exhaustion.
    #[inline]
    #[must_use]
    pub fn charge(&mut self, cost: i64) -> bool {
        self.gas_left -= cost;
        self.gas_left >= 0
    }

    /// Gas remaining as observable by the instruction whose cumulative block
    /// cost is `arg_number`: the block prologue already deducted the whole
    /// block, so the not-yet-executed remainder is credited back.
    #[inline]
    pub fn live_gas(&self, arg_number: i64) -> i64 {
        self.gas_left + (self.current_block_cost as i64 - arg_number)
    }

    /// Validates a memory span, charges its expansion cost, and grows the
    /// memory. Returns the span as native offsets, or `None` on overflow or
    /// gas exhaustion (the caller terminates with `OUT_OF_GAS`).
    ///
    /// A zero-size span is always valid and touches nothing.
    pub fn memory_span(&mut self, offset: U256, size: U256) -> Option<(usize, usize)> {
        if size.is_zero() {
            return Some((0, 0));
        }
        let offset = u64::try_from(offset).ok().filter(|o| *o <= MAX_BUFFER_SIZE)?;
        let size = u64::try_from(size).ok().filter(|s| *s <= MAX_BUFFER_SIZE)?;

        let new_words = num_words(offset + size);
        let current_words = (self.memory.len() / 32) as u64;
        if new_words > current_words {
            let cost = words_cost(new_words) - words_cost(current_words);
            if !self.charge(cost) {
                return None;
            }
            self.memory.grow((new_words * 32) as usize);
        }
        Some((offset as usize, size as usize))
    }

    /// The `RETURN`/`REVERT` output span.
    pub fn output(&self) -> &[u8] {
        self.memory.slice(self.output_offset, self.output_size)
    }
}
