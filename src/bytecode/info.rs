use revm_primitives::SpecId;

use crate::bytecode::InstrFn;
use crate::instructions as instr;

/// Static per-opcode metadata for one protocol revision.
#[derive(Clone, Copy)]
pub struct OpTableEntry {
    /// The handler executing this opcode.
    pub exec: InstrFn,
    /// Base gas cost. Dynamic parts are charged by the handler.
    pub gas_cost: i16,
    /// Minimum stack height required.
    pub stack_req: i8,
    /// Net stack height change.
    pub stack_change: i8,
}

/// One entry per opcode byte.
pub type OpTable = [OpTableEntry; 256];

/// Returns the opcode table for the given revision.
///
/// Exact through Istanbul; later revisions reuse the Istanbul schedule, plus
/// `PUSH0` from Shanghai.
pub fn op_table(rev: SpecId) -> &'static OpTable {
    static FRONTIER: OpTable = make_table(SpecId::FRONTIER);
    static HOMESTEAD: OpTable = make_table(SpecId::HOMESTEAD);
    static TANGERINE: OpTable = make_table(SpecId::TANGERINE);
    static SPURIOUS_DRAGON: OpTable = make_table(SpecId::SPURIOUS_DRAGON);
    static BYZANTIUM: OpTable = make_table(SpecId::BYZANTIUM);
    static CONSTANTINOPLE: OpTable = make_table(SpecId::CONSTANTINOPLE);
    static PETERSBURG: OpTable = make_table(SpecId::PETERSBURG);
    static ISTANBUL: OpTable = make_table(SpecId::ISTANBUL);
    static SHANGHAI: OpTable = make_table(SpecId::SHANGHAI);

    if rev.is_enabled_in(SpecId::SHANGHAI) {
        &SHANGHAI
    } else if rev.is_enabled_in(SpecId::ISTANBUL) {
        &ISTANBUL
    } else if rev.is_enabled_in(SpecId::PETERSBURG) {
        &PETERSBURG
    } else if rev.is_enabled_in(SpecId::CONSTANTINOPLE) {
        &CONSTANTINOPLE
    } else if rev.is_enabled_in(SpecId::BYZANTIUM) {
        &BYZANTIUM
    } else if rev.is_enabled_in(SpecId::SPURIOUS_DRAGON) {
        &SPURIOUS_DRAGON
    } else if rev.is_enabled_in(SpecId::TANGERINE) {
        &TANGERINE
    } else if rev.is_enabled_in(SpecId::HOMESTEAD) {
        &HOMESTEAD
    } else {
        &FRONTIER
    }
}

const fn make_table(rev: SpecId) -> OpTable {
    const UNDEFINED: OpTableEntry =
        OpTableEntry { exec: instr::op_undefined, gas_cost: 0, stack_req: 0, stack_change: 0 };

    // Repriced costs, per EIP-150 (Tangerine Whistle) and EIP-1884 (Istanbul).
    let istanbul = (rev as u8) >= (SpecId::ISTANBUL as u8);
    let tangerine = (rev as u8) >= (SpecId::TANGERINE as u8);
    let sload_cost: i16 = if istanbul {
        800
    } else if tangerine {
        200
    } else {
        50
    };
    let balance_cost: i16 = if istanbul {
        700
    } else if tangerine {
        400
    } else {
        20
    };
    let extcode_cost: i16 = if tangerine { 700 } else { 20 };
    let extcodehash_cost: i16 = if istanbul { 700 } else { 400 };
    let call_cost: i16 = if tangerine { 700 } else { 40 };
    let selfdestruct_cost: i16 = if tangerine { 5000 } else { 0 };

    let mut tbl = [UNDEFINED; 256];

    macro_rules! set {
        ($($name:ident = $exec:expr, $gas:expr, $req:expr, $change:expr $(, if $since:ident)?;)*) => {
            $(
                #[allow(unused_mut, unused_assignments)]
                {
                    let mut enabled = true;
                    $( enabled = (rev as u8) >= (SpecId::$since as u8); )?
                    if enabled {
                        tbl[super::opcode::$name as usize] = OpTableEntry {
                            exec: $exec,
                            gas_cost: $gas,
                            stack_req: $req,
                            stack_change: $change,
                        };
                    }
                }
            )*
        };
    }

    set! {
        STOP = instr::op_stop, 0, 0, 0;

        ADD        = instr::op_add, 3, 2, -1;
        MUL        = instr::op_mul, 5, 2, -1;
        SUB        = instr::op_sub, 3, 2, -1;
        DIV        = instr::op_div, 5, 2, -1;
        SDIV       = instr::op_sdiv, 5, 2, -1;
        MOD        = instr::op_mod, 5, 2, -1;
        SMOD       = instr::op_smod, 5, 2, -1;
        ADDMOD     = instr::op_addmod, 8, 3, -2;
        MULMOD     = instr::op_mulmod, 8, 3, -2;
        EXP        = instr::op_exp, 10, 2, -1;
        SIGNEXTEND = instr::op_signextend, 5, 2, -1;

        LT     = instr::op_lt, 3, 2, -1;
        GT     = instr::op_gt, 3, 2, -1;
        SLT    = instr::op_slt, 3, 2, -1;
        SGT    = instr::op_sgt, 3, 2, -1;
        EQ     = instr::op_eq, 3, 2, -1;
        ISZERO = instr::op_iszero, 3, 1, 0;
        AND    = instr::op_and, 3, 2, -1;
        OR     = instr::op_or, 3, 2, -1;
        XOR    = instr::op_xor, 3, 2, -1;
        NOT    = instr::op_not, 3, 1, 0;
        BYTE   = instr::op_byte, 3, 2, -1;
        SHL    = instr::op_shl, 3, 2, -1, if CONSTANTINOPLE;
        SHR    = instr::op_shr, 3, 2, -1, if CONSTANTINOPLE;
        SAR    = instr::op_sar, 3, 2, -1, if CONSTANTINOPLE;

        KECCAK256 = instr::op_keccak256, 30, 2, -1;

        ADDRESS      = instr::op_address, 2, 0, 1;
        BALANCE      = instr::op_balance, balance_cost, 1, 0;
        ORIGIN       = instr::op_origin, 2, 0, 1;
        CALLER       = instr::op_caller, 2, 0, 1;
        CALLVALUE    = instr::op_callvalue, 2, 0, 1;
        CALLDATALOAD = instr::op_calldataload, 3, 1, 0;
        CALLDATASIZE = instr::op_calldatasize, 2, 0, 1;
        CALLDATACOPY = instr::op_calldatacopy, 3, 3, -3;
        CODESIZE     = instr::op_codesize, 2, 0, 1;
        CODECOPY     = instr::op_codecopy, 3, 3, -3;
        GASPRICE     = instr::op_gasprice, 2, 0, 1;
        EXTCODESIZE  = instr::op_extcodesize, extcode_cost, 1, 0;
        EXTCODECOPY  = instr::op_extcodecopy, extcode_cost, 4, -4;
        RETURNDATASIZE = instr::op_returndatasize, 2, 0, 1, if BYZANTIUM;
        RETURNDATACOPY = instr::op_returndatacopy, 3, 3, -3, if BYZANTIUM;
        EXTCODEHASH  = instr::op_extcodehash, extcodehash_cost, 1, 0, if CONSTANTINOPLE;

        BLOCKHASH   = instr::op_blockhash, 20, 1, 0;
        COINBASE    = instr::op_coinbase, 2, 0, 1;
        TIMESTAMP   = instr::op_timestamp, 2, 0, 1;
        NUMBER      = instr::op_number, 2, 0, 1;
        DIFFICULTY  = instr::op_difficulty, 2, 0, 1;
        GASLIMIT    = instr::op_gaslimit, 2, 0, 1;
        CHAINID     = instr::op_chainid, 2, 0, 1, if ISTANBUL;
        SELFBALANCE = instr::op_selfbalance, 5, 0, 1, if ISTANBUL;

        POP     = instr::op_pop, 2, 1, -1;
        MLOAD   = instr::op_mload, 3, 1, 0;
        MSTORE  = instr::op_mstore, 3, 2, -2;
        MSTORE8 = instr::op_mstore8, 3, 2, -2;
        SLOAD   = instr::op_sload, sload_cost, 1, 0;
        SSTORE  = instr::op_sstore, 0, 2, -2;
        JUMP    = instr::op_jump, 8, 1, -1;
        JUMPI   = instr::op_jumpi, 10, 2, -2;
        PC      = instr::op_pc, 2, 0, 1;
        MSIZE   = instr::op_msize, 2, 0, 1;
        GAS     = instr::op_gas, 2, 0, 1;

        // The JUMPDEST slot carries the BEGINBLOCK intrinsic: every decoded
        // JUMPDEST is replaced by the header of the block it opens.
        JUMPDEST = instr::opx_beginblock, 1, 0, 0;

        PUSH0  = instr::op_push0, 2, 0, 1, if SHANGHAI;
        PUSH1  = instr::op_push_small, 3, 0, 1;
        PUSH2  = instr::op_push_small, 3, 0, 1;
        PUSH3  = instr::op_push_small, 3, 0, 1;
        PUSH4  = instr::op_push_small, 3, 0, 1;
        PUSH5  = instr::op_push_small, 3, 0, 1;
        PUSH6  = instr::op_push_small, 3, 0, 1;
        PUSH7  = instr::op_push_small, 3, 0, 1;
        PUSH8  = instr::op_push_small, 3, 0, 1;
        PUSH9  = instr::op_push_full, 3, 0, 1;
        PUSH10 = instr::op_push_full, 3, 0, 1;
        PUSH11 = instr::op_push_full, 3, 0, 1;
        PUSH12 = instr::op_push_full, 3, 0, 1;
        PUSH13 = instr::op_push_full, 3, 0, 1;
        PUSH14 = instr::op_push_full, 3, 0, 1;
        PUSH15 = instr::op_push_full, 3, 0, 1;
        PUSH16 = instr::op_push_full, 3, 0, 1;
        PUSH17 = instr::op_push_full, 3, 0, 1;
        PUSH18 = instr::op_push_full, 3, 0, 1;
        PUSH19 = instr::op_push_full, 3, 0, 1;
        PUSH20 = instr::op_push_full, 3, 0, 1;
        PUSH21 = instr::op_push_full, 3, 0, 1;
        PUSH22 = instr::op_push_full, 3, 0, 1;
        PUSH23 = instr::op_push_full, 3, 0, 1;
        PUSH24 = instr::op_push_full, 3, 0, 1;
        PUSH25 = instr::op_push_full, 3, 0, 1;
        PUSH26 = instr::op_push_full, 3, 0, 1;
        PUSH27 = instr::op_push_full, 3, 0, 1;
        PUSH28 = instr::op_push_full, 3, 0, 1;
        PUSH29 = instr::op_push_full, 3, 0, 1;
        PUSH30 = instr::op_push_full, 3, 0, 1;
        PUSH31 = instr::op_push_full, 3, 0, 1;
        PUSH32 = instr::op_push_full, 3, 0, 1;

        DUP1  = instr::op_dup::<1>, 3, 1, 1;
        DUP2  = instr::op_dup::<2>, 3, 2, 1;
        DUP3  = instr::op_dup::<3>, 3, 3, 1;
        DUP4  = instr::op_dup::<4>, 3, 4, 1;
        DUP5  = instr::op_dup::<5>, 3, 5, 1;
        DUP6  = instr::op_dup::<6>, 3, 6, 1;
        DUP7  = instr::op_dup::<7>, 3, 7, 1;
        DUP8  = instr::op_dup::<8>, 3, 8, 1;
        DUP9  = instr::op_dup::<9>, 3, 9, 1;
        DUP10 = instr::op_dup::<10>, 3, 10, 1;
        DUP11 = instr::op_dup::<11>, 3, 11, 1;
        DUP12 = instr::op_dup::<12>, 3, 12, 1;
        DUP13 = instr::op_dup::<13>, 3, 13, 1;
        DUP14 = instr::op_dup::<14>, 3, 14, 1;
        DUP15 = instr::op_dup::<15>, 3, 15, 1;
        DUP16 = instr::op_dup::<16>, 3, 16, 1;

        SWAP1  = instr::op_swap::<1>, 3, 2, 0;
        SWAP2  = instr::op_swap::<2>, 3, 3, 0;
        SWAP3  = instr::op_swap::<3>, 3, 4, 0;
        SWAP4  = instr::op_swap::<4>, 3, 5, 0;
        SWAP5  = instr::op_swap::<5>, 3, 6, 0;
        SWAP6  = instr::op_swap::<6>, 3, 7, 0;
        SWAP7  = instr::op_swap::<7>, 3, 8, 0;
        SWAP8  = instr::op_swap::<8>, 3, 9, 0;
        SWAP9  = instr::op_swap::<9>, 3, 10, 0;
        SWAP10 = instr::op_swap::<10>, 3, 11, 0;
        SWAP11 = instr::op_swap::<11>, 3, 12, 0;
        SWAP12 = instr::op_swap::<12>, 3, 13, 0;
        SWAP13 = instr::op_swap::<13>, 3, 14, 0;
        SWAP14 = instr::op_swap::<14>, 3, 15, 0;
        SWAP15 = instr::op_swap::<15>, 3, 16, 0;
        SWAP16 = instr::op_swap::<16>, 3, 17, 0;

        LOG0 = instr::op_log::<0>, 375, 2, -2;
        LOG1 = instr::op_log::<1>, 750, 3, -3;
        LOG2 = instr::op_log::<2>, 1125, 4, -4;
        LOG3 = instr::op_log::<3>, 1500, 5, -5;
        LOG4 = instr::op_log::<4>, 1875, 6, -6;

        CREATE       = instr::op_create, 32000, 3, -2;
        CALL         = instr::op_call, call_cost, 7, -6;
        CALLCODE     = instr::op_callcode, call_cost, 7, -6;
        RETURN       = instr::op_return, 0, 2, -2;
        DELEGATECALL = instr::op_delegatecall, call_cost, 6, -5, if HOMESTEAD;
        CREATE2      = instr::op_create2, 32000, 4, -3, if CONSTANTINOPLE;
        STATICCALL   = instr::op_staticcall, call_cost, 6, -5, if BYZANTIUM;
        REVERT       = instr::op_revert, 0, 2, -2, if BYZANTIUM;
        INVALID      = instr::op_invalid, 0, 0, 0;
        SELFDESTRUCT = instr::op_selfdestruct, selfdestruct_cost, 1, -1;
    }

    tbl
}
