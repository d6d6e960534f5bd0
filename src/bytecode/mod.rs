//! Decoded instruction stream and the basic-block analysis pass.

use revm_primitives::SpecId;

use crate::state::ExecutionState;

pub mod opcode;
use self::opcode as op;

mod info;
pub use info::*;

/// EIP-170 contract code size limit.
pub const MAX_CODE_SIZE: usize = 0x6000;

/// The highest base cost a single opcode can carry in the tables (`CREATE`).
const MAX_INSTRUCTION_BASE_COST: u64 = 32000;

/// No instruction grows the stack by more than one slot.
const MAX_INSTRUCTION_STACK_INCREASE: u64 = 1;

// `BlockInfo` field widths hold for any code within the size limit.
const _: () = assert!(MAX_CODE_SIZE as u64 * MAX_INSTRUCTION_BASE_COST <= u32::MAX as u64);
const _: () = assert!(MAX_CODE_SIZE as u64 * MAX_INSTRUCTION_STACK_INCREASE <= i16::MAX as u64);

/// Where the dispatch loop goes after a handler runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Next {
    /// Fall through to the following instruction.
    Step,
    /// Transfer control to the instruction at the given index.
    Goto(usize),
    /// Stop the loop; [`ExecutionState::status`] has been set.
    Halt,
}

/// An instruction handler.
///
/// Returns where the dispatch loop continues; on [`Next::Halt`] the handler
/// has set the terminal status on the state.
pub type InstrFn = fn(&Instruction<'_>, &mut ExecutionState<'_>) -> Next;

/// Aggregate execution requirements of one basic block, checked once at block
/// entry by the `BEGINBLOCK` intrinsic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockInfo {
    /// The total base gas cost of all instructions in the block.
    pub gas_cost: u32,
    /// The stack height required on block entry.
    pub stack_req: i16,
    /// The maximum stack height growth relative to the height at block entry.
    pub stack_max_growth: i16,
}

/// The per-instruction payload. The active interpretation is implied by the
/// opcode the instruction was decoded from; handlers know which accessor
/// applies to them.
#[derive(Clone, Copy, Debug)]
pub enum InstrArg<'a> {
    /// No payload.
    None,
    /// For the gas-sensitive opcodes (`GAS`, the call and create families,
    /// `SSTORE`), the cumulative base gas of the enclosing block up to and
    /// including this instruction; for `PC`, the original code offset.
    Number(i64),
    /// Immediate of `PUSH1`..`PUSH8`, assembled big-endian.
    SmallPush(u64),
    /// Immediate of `PUSH9`..`PUSH32`: the bytes present in the code, plus
    /// the declared push size. `data` is shorter than `len` only when the
    /// immediate runs past the end of the code; the missing low-order bytes
    /// are implicit zeros.
    Push {
        data: &'a [u8],
        len: u8,
    },
    /// Block header, on `BEGINBLOCK` entries only.
    Block(BlockInfo),
}

impl InstrArg<'_> {
    /// The numeric payload of a gas-sensitive or `PC` instruction.
    #[inline]
    pub fn number(&self) -> i64 {
        match self {
            Self::Number(n) => *n,
            _ => {
                debug_assert!(false, "instruction argument is not a number");
                0
            }
        }
    }

    /// The immediate of a small push.
    #[inline]
    pub fn small_push(&self) -> u64 {
        match self {
            Self::SmallPush(value) => *value,
            _ => {
                debug_assert!(false, "instruction argument is not a small push");
                0
            }
        }
    }

    /// The immediate bytes and declared size of a large push.
    #[inline]
    pub fn push_data(&self) -> (&[u8], usize) {
        match self {
            Self::Push { data, len } => (data, *len as usize),
            _ => {
                debug_assert!(false, "instruction argument is not a push");
                (&[], 0)
            }
        }
    }

    /// The block header of a `BEGINBLOCK`.
    #[inline]
    pub fn block(&self) -> BlockInfo {
        match self {
            Self::Block(block) => *block,
            _ => {
                debug_assert!(false, "instruction argument is not a block header");
                BlockInfo::default()
            }
        }
    }
}

/// A single decoded instruction: the handler plus its payload.
#[derive(Clone, Copy)]
pub struct Instruction<'a> {
    /// The handler executing this instruction.
    pub exec: InstrFn,
    /// The pre-decoded argument.
    pub arg: InstrArg<'a>,
}

impl<'a> Instruction<'a> {
    #[inline]
    fn new(exec: InstrFn) -> Self {
        Self { exec, arg: InstrArg::None }
    }

    /// Returns `true` if this entry is a `BEGINBLOCK` intrinsic.
    pub fn is_beginblock(&self) -> bool {
        matches!(self.arg, InstrArg::Block(_))
    }
}

impl core::fmt::Debug for Instruction<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Instruction")
            .field("exec", &(self.exec as usize as *const ()))
            .field("arg", &self.arg)
            .finish()
    }
}

/// The product of [`analyze`]: the decoded instruction stream with block
/// headers, and the sorted jump-destination index.
///
/// The lifetime ties the analysis to the code it was produced from; large
/// `PUSH` immediates borrow the original code bytes.
#[derive(Debug)]
pub struct CodeAnalysis<'a> {
    /// The decoded instructions. The entry at index 0 is always a
    /// `BEGINBLOCK`; the final entry is always a `STOP` handler.
    pub instrs: Vec<Instruction<'a>>,
    /// Byte offsets of `JUMPDEST` opcodes in the original code, ascending.
    /// These are the values `JUMP`/`JUMPI` receive as arguments.
    pub jumpdest_offsets: Vec<u32>,
    /// For each element of `jumpdest_offsets`, the index into `instrs` of the
    /// `BEGINBLOCK` that opens the destination block.
    pub jumpdest_targets: Vec<u32>,
}

impl CodeAnalysis<'_> {
    /// Resolves a jump target offset to its instruction index, or `None` if
    /// the offset is not a valid jump destination.
    #[inline]
    pub fn find_jumpdest(&self, offset: u32) -> Option<usize> {
        let index = self.jumpdest_offsets.binary_search(&offset).ok()?;
        Some(self.jumpdest_targets[index] as usize)
    }
}

/// Running accumulator for the block being analyzed. Dumped into the block's
/// `BEGINBLOCK` entry when the block closes.
#[derive(Clone, Copy)]
struct BlockAnalysis {
    gas_cost: i64,
    stack_req: i32,
    stack_change: i32,
    stack_max_growth: i32,
    /// Index of the `BEGINBLOCK` that opens this block, or `None` while
    /// analyzing code that is unreachable (after a non-`JUMPI` terminator and
    /// before the next `JUMPDEST`).
    begin_block_index: Option<usize>,
}

impl BlockAnalysis {
    fn new(begin_block_index: Option<usize>) -> Self {
        Self {
            gas_cost: 0,
            stack_req: 0,
            stack_change: 0,
            stack_max_growth: 0,
            begin_block_index,
        }
    }

    /// Produces the compressed block header, clamping each field to its
    /// target width. Only `stack_req` can actually saturate; the other
    /// fields are bounded by the static asserts above.
    fn close(&self) -> BlockInfo {
        BlockInfo {
            gas_cost: self.gas_cost.try_into().unwrap_or(u32::MAX),
            stack_req: self.stack_req.try_into().unwrap_or(i16::MAX),
            stack_max_growth: self.stack_max_growth.try_into().unwrap_or(i16::MAX),
        }
    }
}

/// Analyzes raw EVM code into an instruction stream with per-basic-block
/// headers and a sorted jump-destination index.
///
/// Never fails: truncated `PUSH` immediates are bounded at the code end and a
/// safety `STOP` terminates the stream, so malformed code is regularized
/// rather than rejected.
pub fn analyze<'a>(rev: SpecId, code: &'a [u8]) -> CodeAnalysis<'a> {
    let tbl = op_table(rev);
    let beginblock_fn = tbl[op::JUMPDEST as usize].exec;

    // Worst case: one entry per byte, the entry and safety-STOP entries, and
    // one extra fall-through header per JUMPI. Reserving it all up front
    // keeps the instruction vector from reallocating mid-analysis.
    let jumpi_count = code.iter().filter(|&&byte| byte == op::JUMPI).count();
    let mut analysis = CodeAnalysis {
        instrs: Vec::with_capacity(code.len() + 2 + jumpi_count),
        jumpdest_offsets: Vec::new(),
        jumpdest_targets: Vec::new(),
    };

    // Open the entry block.
    analysis.instrs.push(Instruction::new(beginblock_fn));
    let mut block = BlockAnalysis::new(Some(0));

    let mut pos = 0usize;
    while pos < code.len() {
        let opcode = code[pos];
        pos += 1;
        let entry = &tbl[opcode as usize];

        // The block's requirement is the deepest operand demand expressed
        // relative to the stack height at block entry.
        block.stack_req = block.stack_req.max(entry.stack_req as i32 - block.stack_change);
        block.stack_change += entry.stack_change as i32;
        block.stack_max_growth = block.stack_max_growth.max(block.stack_change);
        block.gas_cost += entry.gas_cost as i64;

        if opcode == op::JUMPDEST {
            // The JUMPDEST collapses into the BEGINBLOCK that opens this
            // block; no instruction of its own.
            analysis.jumpdest_offsets.push((pos - 1) as u32);
            analysis.jumpdest_targets.push((analysis.instrs.len() - 1) as u32);
        } else {
            analysis.instrs.push(Instruction::new(entry.exec));
            let index = analysis.instrs.len() - 1;
            match opcode {
                op::PUSH1..=op::PUSH8 => {
                    let n = op::imm_len(opcode);
                    let end = (pos + n).min(code.len());
                    let mut value = 0u64;
                    for (i, &byte) in code[pos..end].iter().enumerate() {
                        value |= (byte as u64) << (8 * (n - 1 - i));
                    }
                    analysis.instrs[index].arg = InstrArg::SmallPush(value);
                    pos = end;
                }
                op::PUSH9..=op::PUSH32 => {
                    let n = op::imm_len(opcode);
                    let end = (pos + n).min(code.len());
                    analysis.instrs[index].arg =
                        InstrArg::Push { data: &code[pos..end], len: n as u8 };
                    pos = end;
                }
                op::GAS
                | op::CALL
                | op::CALLCODE
                | op::DELEGATECALL
                | op::STATICCALL
                | op::CREATE
                | op::CREATE2
                | op::SSTORE => {
                    analysis.instrs[index].arg = InstrArg::Number(block.gas_cost);
                }
                op::PC => {
                    analysis.instrs[index].arg = InstrArg::Number((pos - 1) as i64);
                }
                _ => {}
            }
        }

        let is_terminator = op::is_terminator(opcode);
        let next_is_jumpdest = pos < code.len() && code[pos] == op::JUMPDEST;
        if is_terminator || next_is_jumpdest {
            if let Some(index) = block.begin_block_index {
                trace!(index, block = ?block.close(), "closing block");
                analysis.instrs[index].arg = InstrArg::Block(block.close());
            }
            // A successor block only needs a header if it can be entered:
            // by fall-through into a JUMPDEST or past a JUMPI, or by a jump
            // onto a JUMPDEST. Code after any other terminator is dead until
            // the next JUMPDEST and gets no header.
            let successor = if pos < code.len() && (next_is_jumpdest || opcode == op::JUMPI) {
                analysis.instrs.push(Instruction::new(beginblock_fn));
                Some(analysis.instrs.len() - 1)
            } else {
                None
            };
            block = BlockAnalysis::new(successor);
        }
    }

    if let Some(index) = block.begin_block_index {
        analysis.instrs[index].arg = InstrArg::Block(block.close());
    }

    // Terminate the stream so a malformed tail cannot run off the end.
    analysis.instrs.push(Instruction::new(tbl[op::STOP as usize].exec));

    debug!(
        code_len = code.len(),
        instrs = analysis.instrs.len(),
        jumpdests = analysis.jumpdest_offsets.len(),
        "analyzed code"
    );

    analysis
}
