#![allow(clippy::needless_update)]

use crate::*;
use revm_primitives::{keccak256, Address, Bytes, B256, KECCAK_EMPTY, U256};


pub use runner::*;

const G: i64 = DEF_GAS_LIMIT;

tests! {
    ret {
        empty(@raw {
            bytecode: &[],
            expected_gas_left: G,
        }),
        stop(@raw {
            bytecode: &[0x00],
            expected_gas_left: G,
        }),
        undefined(@raw {
            bytecode: &[0x21],
            expected_status: StatusCode::UndefinedInstruction,
            expected_gas_left: 0,
        }),
        invalid(@raw {
            bytecode: &[0xfe],
            expected_status: StatusCode::InvalidInstruction,
            expected_gas_left: 0,
        }),
        underflow_at_block_entry(@raw {
            bytecode: &[0x01],
            expected_status: StatusCode::StackUnderflow,
            expected_gas_left: 0,
        }),
        // The whole block is rejected up front; nothing executes.
        overflow_at_block_entry(@raw {
            bytecode: &[0x5f; 1025],
            rev: SpecId::SHANGHAI,
            expected_status: StatusCode::StackOverflow,
            expected_gas_left: 0,
        }),
        no_overflow_at_limit(@raw {
            bytecode: &[0x5f; 1024],
            rev: SpecId::SHANGHAI,
            expected_gas_left: G - 2 * 1024,
            expected_stack: &[U256::ZERO; 1024],
        }),
        out_of_gas_at_block_entry(@raw {
            bytecode: &[0x60, 0x05, 0x60, 0x03, 0x01],
            gas: 5,
            expected_status: StatusCode::OutOfGas,
            expected_gas_left: 0,
        }),
        exact_gas(@raw {
            bytecode: &[0x60, 0x05, 0x60, 0x03, 0x01],
            gas: 9,
            expected_gas_left: 0,
            expected_stack: &[U256::from(8u8)],
        }),
        one_gas_short(@raw {
            bytecode: &[0x60, 0x05, 0x60, 0x03, 0x01],
            gas: 8,
            expected_status: StatusCode::OutOfGas,
            expected_gas_left: 0,
        }),
    }

    arithmetic {
        add(@raw {
            bytecode: &[0x60, 0x05, 0x60, 0x03, 0x01],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(8u8)],
        }),
        mul(@raw {
            bytecode: &[0x60, 0x03, 0x60, 0x04, 0x02],
            expected_gas_left: G - 11,
            expected_stack: &[U256::from(12u8)],
        }),
        sub(@raw {
            bytecode: &[0x60, 0x03, 0x60, 0x05, 0x03],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(2u8)],
        }),
        div(@raw {
            bytecode: &[0x60, 0x02, 0x60, 0x06, 0x04],
            expected_gas_left: G - 11,
            expected_stack: &[U256::from(3u8)],
        }),
        div_by_zero(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x05, 0x04],
            expected_gas_left: G - 11,
            expected_stack: &[U256::ZERO],
        }),
        modulo(@raw {
            bytecode: &[0x60, 0x03, 0x60, 0x0a, 0x06],
            expected_gas_left: G - 11,
            expected_stack: &[U256::from(1u8)],
        }),
        addmod(@raw {
            bytecode: &[0x60, 0x08, 0x60, 0x0a, 0x60, 0x0a, 0x08],
            expected_gas_left: G - 17,
            expected_stack: &[U256::from(4u8)],
        }),
        mulmod(@raw {
            bytecode: &[0x60, 0x08, 0x60, 0x0a, 0x60, 0x0a, 0x09],
            expected_gas_left: G - 17,
            expected_stack: &[U256::from(4u8)],
        }),
        // 2^3, with the 50-per-exponent-byte dynamic charge.
        exp(@raw {
            bytecode: &[0x60, 0x03, 0x60, 0x02, 0x0a],
            expected_gas_left: G - 66,
            expected_stack: &[U256::from(8u8)],
        }),
        exp_of_zero(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x02, 0x0a],
            expected_gas_left: G - 16,
            expected_stack: &[U256::from(1u8)],
        }),
        signextend(@raw {
            bytecode: &[0x60, 0xff, 0x60, 0x00, 0x0b],
            expected_gas_left: G - 11,
            expected_stack: &[U256::MAX],
        }),
    }

    bitwise {
        lt(@raw {
            bytecode: &[0x60, 0x05, 0x60, 0x03, 0x10],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(1u8)],
        }),
        gt(@raw {
            bytecode: &[0x60, 0x05, 0x60, 0x03, 0x11],
            expected_gas_left: G - 9,
            expected_stack: &[U256::ZERO],
        }),
        slt(@raw {
            bytecode: &[0x60, 0x05, 0x60, 0x03, 0x12],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(1u8)],
        }),
        eq(@raw {
            bytecode: &[0x60, 0x05, 0x60, 0x05, 0x14],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(1u8)],
        }),
        iszero(@raw {
            bytecode: &[0x60, 0x00, 0x15],
            expected_gas_left: G - 6,
            expected_stack: &[U256::from(1u8)],
        }),
        and(@raw {
            bytecode: &[0x60, 0x0c, 0x60, 0x0a, 0x16],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(8u8)],
        }),
        or(@raw {
            bytecode: &[0x60, 0x0c, 0x60, 0x0a, 0x17],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(0x0eu8)],
        }),
        xor(@raw {
            bytecode: &[0x60, 0x0c, 0x60, 0x0a, 0x18],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(6u8)],
        }),
        not(@raw {
            bytecode: &[0x60, 0x00, 0x19],
            expected_gas_left: G - 6,
            expected_stack: &[U256::MAX],
        }),
        byte(@raw {
            bytecode: &[0x60, 0xff, 0x60, 0x1f, 0x1a],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(0xffu8)],
        }),
        byte_out_of_range(@raw {
            bytecode: &[0x60, 0xff, 0x60, 0x20, 0x1a],
            expected_gas_left: G - 9,
            expected_stack: &[U256::ZERO],
        }),
        shl(@raw {
            bytecode: &[0x60, 0x01, 0x60, 0x04, 0x1b],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(16u8)],
        }),
        shr(@raw {
            bytecode: &[0x60, 0x10, 0x60, 0x04, 0x1c],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(1u8)],
        }),
        keccak_of_empty(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x00, 0x20],
            expected_gas_left: G - 36,
            expected_stack: &[U256::from_be_bytes(KECCAK_EMPTY.0)],
        }),
    }

    pushes {
        push1(@raw {
            bytecode: &[0x60, 0x42],
            expected_gas_left: G - 3,
            expected_stack: &[U256::from(0x42u8)],
        }),
        push8_max(@raw {
            bytecode: &[0x67, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            expected_gas_left: G - 3,
            expected_stack: &[U256::from(u64::MAX)],
        }),
        // Truncated at the code end: the missing low byte reads as zero.
        push2_truncated(@raw {
            bytecode: &[0x61, 0xaa],
            expected_gas_left: G - 3,
            expected_stack: &[U256::from(0xaa00u16)],
        }),
        push0_shanghai(@raw {
            bytecode: &[0x5f],
            rev: SpecId::SHANGHAI,
            expected_gas_left: G - 2,
            expected_stack: &[U256::ZERO],
        }),
        push0_istanbul(@raw {
            bytecode: &[0x5f],
            expected_status: StatusCode::UndefinedInstruction,
            expected_gas_left: 0,
        }),
        dup2(@raw {
            bytecode: &[0x60, 0x01, 0x60, 0x02, 0x81],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(1u8), U256::from(2u8), U256::from(1u8)],
        }),
        swap1(@raw {
            bytecode: &[0x60, 0x01, 0x60, 0x02, 0x90],
            expected_gas_left: G - 9,
            expected_stack: &[U256::from(2u8), U256::from(1u8)],
        }),
        pop(@raw {
            bytecode: &[0x60, 0x01, 0x50],
            expected_gas_left: G - 5,
            expected_stack: &[],
        }),
    }

    env {
        address(@raw {
            bytecode: &[0x30],
            expected_gas_left: G - 2,
            expected_stack: &[addr_word(DEF_ADDR)],
        }),
        caller(@raw {
            bytecode: &[0x33],
            expected_gas_left: G - 2,
            expected_stack: &[addr_word(DEF_CALLER)],
        }),
        callvalue(@raw {
            bytecode: &[0x34],
            value: U256::from(123u8),
            expected_gas_left: G - 2,
            expected_stack: &[U256::from(123u8)],
        }),
        origin(@raw {
            bytecode: &[0x32],
            expected_gas_left: G - 2,
            expected_stack: &[addr_word(Address::repeat_byte(0xcc))],
        }),
        gasprice(@raw {
            bytecode: &[0x3a],
            expected_gas_left: G - 2,
            expected_stack: &[U256::from(0x4567u16)],
        }),
        calldataload(@raw {
            bytecode: &[0x60, 0x00, 0x35],
            input: &[0xaa; 64],
            expected_gas_left: G - 6,
            expected_stack: &[U256::from_be_bytes([0xaa; 32])],
        }),
        calldataload_past_end(@raw {
            bytecode: &[0x60, 0x7f, 0x35],
            input: &[0xaa; 64],
            expected_gas_left: G - 6,
            expected_stack: &[U256::ZERO],
        }),
        calldatasize(@raw {
            bytecode: &[0x36],
            input: &[0xaa; 64],
            expected_gas_left: G - 2,
            expected_stack: &[U256::from(64u8)],
        }),
        codesize(@raw {
            bytecode: &[0x38],
            expected_gas_left: G - 2,
            expected_stack: &[U256::from(1u8)],
        }),
        returndatasize_initial(@raw {
            bytecode: &[0x3d],
            expected_gas_left: G - 2,
            expected_stack: &[U256::ZERO],
        }),
        chainid(@raw {
            bytecode: &[0x46],
            expected_gas_left: G - 2,
            expected_stack: &[U256::from(69u8)],
        }),
        number(@raw {
            bytecode: &[0x43],
            expected_gas_left: G - 2,
            expected_stack: &[U256::from(500u16)],
        }),
        timestamp(@raw {
            bytecode: &[0x42],
            expected_gas_left: G - 2,
            expected_stack: &[U256::from(0x1234u16)],
        }),
        difficulty(@raw {
            bytecode: &[0x44],
            expected_gas_left: G - 2,
            expected_stack: &[U256::from(0xcdefu16)],
        }),
        gaslimit(@raw {
            bytecode: &[0x45],
            expected_gas_left: G - 2,
            expected_stack: &[U256::from(0x5678u16)],
        }),
        coinbase(@raw {
            bytecode: &[0x41],
            expected_gas_left: G - 2,
            expected_stack: &[addr_word(Address::repeat_byte(0xcb))],
        }),
        blockhash_in_range(@raw {
            bytecode: &[0x60, 0xff, 0x40],
            expected_gas_left: G - 23,
            expected_stack: &[U256::from(0xffu8)],
        }),
        blockhash_too_old(@raw {
            bytecode: &[0x60, 0x00, 0x40],
            expected_gas_left: G - 23,
            expected_stack: &[U256::ZERO],
        }),
        balance_of_self(@raw {
            bytecode: &[0x30, 0x31],
            expected_gas_left: G - 702,
            expected_stack: &[U256::from(1000u16)],
        }),
        selfbalance(@raw {
            bytecode: &[0x47],
            expected_gas_left: G - 5,
            expected_stack: &[U256::from(1000u16)],
        }),
    }

    memory {
        mstore_mload(@raw {
            bytecode: &[0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x00, 0x51],
            expected_gas_left: G - 18,
            expected_stack: &[U256::from(42u8)],
        }),
        msize(@raw {
            bytecode: &[0x60, 0x2a, 0x60, 0x00, 0x52, 0x59],
            expected_gas_left: G - 14,
            expected_stack: &[U256::from(32u8)],
        }),
        mstore8(@raw {
            bytecode: &[0x60, 0xff, 0x60, 0x1f, 0x53, 0x59],
            expected_gas_left: G - 14,
            expected_stack: &[U256::from(32u8)],
            assert_state: Some(|state| {
                assert_eq!(state.memory.slice(31, 1), &[0xff]);
            }),
        }),
        calldatacopy(@raw {
            bytecode: &[0x60, 0x20, 0x60, 0x00, 0x60, 0x00, 0x37, 0x60, 0x00, 0x51],
            input: &[0xaa; 64],
            expected_gas_left: G - 24,
            expected_stack: &[U256::from_be_bytes([0xaa; 32])],
        }),
    }

    storage {
        sload_preset(@raw {
            bytecode: &[0x60, 0x00, 0x54],
            expected_gas_left: G - 803,
            expected_stack: &[U256::from(1u8)],
        }),
        sload_byzantium(@raw {
            bytecode: &[0x60, 0x00, 0x54],
            rev: SpecId::BYZANTIUM,
            expected_gas_left: G - 203,
            expected_stack: &[U256::from(1u8)],
        }),
        sstore_added(@raw {
            bytecode: &[0x60, 0x01, 0x60, 0x05, 0x55],
            expected_gas_left: G - 20006,
            assert_host: Some(|host| {
                assert_eq!(host.storage[&U256::from(5u8)], U256::from(1u8));
            }),
        }),
        sstore_deleted(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x00, 0x55],
            expected_gas_left: G - 5006,
            assert_host: Some(|host| {
                assert_eq!(host.storage[&U256::ZERO], U256::ZERO);
            }),
        }),
        // Same value written back: net metering charges the SLOAD-equivalent.
        sstore_unchanged(@raw {
            bytecode: &[0x60, 0x01, 0x60, 0x00, 0x55],
            expected_gas_left: G - 806,
        }),
        // Before net metering every non-insert write costs 5000.
        sstore_legacy_reset(@raw {
            bytecode: &[0x60, 0x02, 0x60, 0x00, 0x55],
            rev: SpecId::BYZANTIUM,
            expected_gas_left: G - 5006,
            assert_host: Some(|host| {
                assert_eq!(host.storage[&U256::ZERO], U256::from(2u8));
            }),
        }),
        // EIP-2200: SSTORE refuses to run with at most the stipend left.
        sstore_sentry(@raw {
            bytecode: &[0x60, 0x01, 0x60, 0x05, 0x55],
            gas: 2306,
            expected_status: StatusCode::OutOfGas,
            expected_gas_left: 0,
            expected_stack: &[U256::from(1u8), U256::from(5u8)],
        }),
        sstore_static(@raw {
            bytecode: &[0x60, 0x01, 0x60, 0x05, 0x55],
            is_static: true,
            expected_status: StatusCode::StaticModeViolation,
            expected_gas_left: 0,
            expected_stack: &[U256::from(1u8), U256::from(5u8)],
        }),
    }

    control_flow {
        jump_valid(@raw {
            bytecode: &[0x60, 0x03, 0x56, 0x5b, 0x00],
            expected_gas_left: G - 12,
        }),
        // A leading JUMPDEST shares the entry block.
        jumpdest_entry(@raw {
            bytecode: &[0x5b, 0x00],
            expected_gas_left: G - 1,
        }),
        jump_invalid(@raw {
            bytecode: &[0x60, 0x00, 0x56],
            expected_status: StatusCode::BadJumpDestination,
            expected_gas_left: 0,
        }),
        // The 0x5b at offset 4 is PUSH data, not a destination.
        jump_into_push_data(@raw {
            bytecode: &[0x60, 0x04, 0x56, 0x60, 0x5b, 0x00],
            expected_status: StatusCode::BadJumpDestination,
            expected_gas_left: 0,
        }),
        jumpi_taken(@raw {
            bytecode: &[0x60, 0x01, 0x60, 0x06, 0x57, 0xfe, 0x5b, 0x00],
            expected_gas_left: G - 17,
        }),
        jumpi_not_taken(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x06, 0x57, 0x00, 0x5b, 0x00],
            expected_gas_left: G - 16,
        }),
        jumpi_falls_into_next_block(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x06, 0x57, 0xfe, 0x5b, 0x00],
            expected_status: StatusCode::InvalidInstruction,
            expected_gas_left: 0,
        }),
        jumpi_invalid_destination(@raw {
            bytecode: &[0x60, 0x01, 0x60, 0x05, 0x57, 0x00],
            expected_status: StatusCode::BadJumpDestination,
            expected_gas_left: 0,
        }),
        pc(@raw {
            bytecode: &[0x60, 0x00, 0x58],
            expected_gas_left: G - 5,
            expected_stack: &[U256::ZERO, U256::from(2u8)],
        }),
        gas_opcode(@raw {
            bytecode: &[0x5a],
            expected_gas_left: G - 2,
            expected_stack: &[U256::from((G - 2) as u64)],
        }),
        // Live gas accounts for the block prologue having charged the whole
        // block up front.
        gas_after_ops(@raw {
            bytecode: &[0x60, 0x00, 0x50, 0x5a],
            expected_gas_left: G - 7,
            expected_stack: &[U256::from((G - 7) as u64)],
        }),
    }

    calls {
        call_plain(@raw {
            bytecode: &[
                0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0xee,
                0x61, 0x27, 0x10, 0xf1,
            ],
            expected_gas_left: G - 721,
            expected_stack: &[U256::from(1u8)],
            assert_host: Some(|host| {
                assert_eq!(host.calls.len(), 1);
                let msg = &host.calls[0];
                assert_eq!(msg.kind, CallKind::Call);
                assert_eq!(msg.gas, 10000);
                assert_eq!(msg.sender, DEF_ADDR);
                assert_eq!(msg.recipient, addr(0xee));
                assert_eq!(msg.depth, 1);
            }),
        }),
        call_with_value(@raw {
            bytecode: &[
                0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x01, 0x60, 0xee,
                0x61, 0x27, 0x10, 0xf1,
            ],
            expected_gas_left: G - 721 - 34000 + 2300,
            expected_stack: &[U256::from(1u8)],
            assert_host: Some(|host| {
                let msg = &host.calls[0];
                assert_eq!(msg.gas, 12300);
                assert_eq!(msg.value, U256::from(1u8));
            }),
        }),
        call_value_in_static_frame(@raw {
            bytecode: &[
                0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x01, 0x60, 0xee,
                0x61, 0x27, 0x10, 0xf1,
            ],
            is_static: true,
            expected_status: StatusCode::StaticModeViolation,
            expected_gas_left: 0,
            expected_stack: &[U256::ZERO, U256::ZERO, U256::ZERO, U256::ZERO],
        }),
        call_depth_limit(@raw {
            bytecode: &[
                0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0xee,
                0x61, 0x27, 0x10, 0xf1,
            ],
            depth: 1024,
            expected_gas_left: G - 721,
            expected_stack: &[U256::ZERO],
            assert_host: Some(|host| assert!(host.calls.is_empty())),
        }),
        call_insufficient_balance(@raw {
            bytecode: &[
                0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x61, 0x07, 0xd0, 0x60, 0xee,
                0x61, 0x27, 0x10, 0xf1,
            ],
            expected_gas_left: G - 721 - 34000,
            expected_stack: &[U256::ZERO],
            assert_host: Some(|host| assert!(host.calls.is_empty())),
        }),
        call_failure_pushes_zero(@raw {
            bytecode: &[
                0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0xee,
                0x61, 0x27, 0x10, 0xf1,
            ],
            prepare_host: Some(|host| host.call_status = StatusCode::Revert),
            expected_gas_left: G - 721,
            expected_stack: &[U256::ZERO],
        }),
        staticcall(@raw {
            bytecode: &[
                0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0xee,
                0x61, 0x27, 0x10, 0xfa,
            ],
            expected_gas_left: G - 718,
            expected_stack: &[U256::from(1u8)],
            assert_host: Some(|host| {
                let msg = &host.calls[0];
                assert!(msg.is_static);
                assert_eq!(msg.value, U256::ZERO);
            }),
        }),
        // DELEGATECALL runs foreign code with the current frame's context.
        delegatecall_context(@raw {
            bytecode: &[
                0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0xee,
                0x61, 0x27, 0x10, 0xf4,
            ],
            value: U256::from(7u8),
            expected_gas_left: G - 718,
            expected_stack: &[U256::from(1u8)],
            assert_host: Some(|host| {
                let msg = &host.calls[0];
                assert_eq!(msg.kind, CallKind::DelegateCall);
                assert_eq!(msg.recipient, DEF_ADDR);
                assert_eq!(msg.code_address, addr(0xee));
                assert_eq!(msg.sender, DEF_CALLER);
                assert_eq!(msg.value, U256::from(7u8));
            }),
        }),
        returndata_after_call(@raw {
            bytecode: &[
                0x60, 0x08, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0xee,
                0x61, 0x27, 0x10, 0xf1, 0x3d,
            ],
            prepare_host: Some(|host| host.call_output = Bytes::from_static(&[0xbb; 8])),
            expected_gas_left: G - 723 - 3,
            expected_stack: &[U256::from(1u8), U256::from(8u8)],
            assert_state: Some(|state| {
                assert_eq!(state.memory.slice(0, 8), &[0xbb; 8]);
                assert_eq!(state.return_data, &[0xbb; 8]);
            }),
        }),
    }

    create {
        create_success(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0xf0],
            expected_gas_left: G - 32009,
            expected_stack: &[addr_word(OTHER_ADDR)],
            assert_host: Some(|host| {
                let msg = &host.calls[0];
                assert_eq!(msg.kind, CallKind::Create);
                assert_eq!(msg.gas, 66929);
                assert_eq!(msg.sender, DEF_ADDR);
            }),
        }),
        create2_success(@raw {
            bytecode: &[0x60, 0x05, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0xf5],
            expected_gas_left: G - 32012,
            expected_stack: &[addr_word(OTHER_ADDR)],
            assert_host: Some(|host| {
                let msg = &host.calls[0];
                assert_eq!(msg.kind, CallKind::Create2);
                assert_eq!(msg.create2_salt, B256::from(U256::from(5u8)));
            }),
        }),
        create_failed_pushes_zero(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0xf0],
            prepare_host: Some(|host| host.call_status = StatusCode::Revert),
            expected_gas_left: G - 32009,
            expected_stack: &[U256::ZERO],
        }),
        create_depth_limit(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0xf0],
            depth: 1024,
            expected_gas_left: G - 32009,
            expected_stack: &[U256::ZERO],
            assert_host: Some(|host| assert!(host.calls.is_empty())),
        }),
        create_static(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0xf0],
            is_static: true,
            expected_status: StatusCode::StaticModeViolation,
            expected_gas_left: 0,
            expected_stack: &[U256::ZERO, U256::ZERO, U256::ZERO],
        }),
    }

    system {
        return_output(@raw {
            bytecode: &[0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3],
            expected_gas_left: G - 18,
            expected_output: &U256::from(42u8).to_be_bytes::<32>(),
        }),
        revert_keeps_gas(@raw {
            bytecode: &[0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xfd],
            expected_status: StatusCode::Revert,
            expected_gas_left: G - 18,
            expected_output: &U256::from(42u8).to_be_bytes::<32>(),
        }),
        selfdestruct_new_beneficiary(@raw {
            bytecode: &[0x60, 0xee, 0xff],
            expected_gas_left: G - 5003 - 25000,
            assert_host: Some(|host| {
                assert_eq!(host.selfdestructs, [(DEF_ADDR, addr(0xee))]);
            }),
        }),
        selfdestruct_static(@raw {
            bytecode: &[0x60, 0xee, 0xff],
            is_static: true,
            expected_status: StatusCode::StaticModeViolation,
            expected_gas_left: 0,
            expected_stack: &[U256::from(0xeeu8)],
        }),
        log0(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x00, 0xa0],
            expected_gas_left: G - 381,
            assert_host: Some(|host| {
                assert_eq!(host.logs, [(DEF_ADDR, vec![], vec![])]);
            }),
        }),
        log2_topics(@raw {
            bytecode: &[0x60, 0x02, 0x60, 0x01, 0x60, 0x00, 0x60, 0x00, 0xa2],
            expected_gas_left: G - 1137,
            assert_host: Some(|host| {
                let topics = &host.logs[0].2;
                assert_eq!(topics[0], B256::from(U256::from(1u8)));
                assert_eq!(topics[1], B256::from(U256::from(2u8)));
            }),
        }),
        log1_with_data(@raw {
            bytecode: &[
                0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x07, 0x60, 0x20, 0x60, 0x00, 0xa1,
            ],
            expected_gas_left: G - 1027,
            assert_host: Some(|host| {
                let (_, data, topics) = &host.logs[0];
                assert_eq!(data, &U256::from(42u8).to_be_bytes::<32>());
                assert_eq!(topics, &[B256::from(U256::from(7u8))]);
            }),
        }),
        log_static(@raw {
            bytecode: &[0x60, 0x00, 0x60, 0x00, 0xa0],
            is_static: true,
            expected_status: StatusCode::StaticModeViolation,
            expected_gas_left: 0,
            expected_stack: &[U256::ZERO, U256::ZERO],
        }),
    }
}

fn push32(value: U256) -> Vec<u8> {
    let mut code = vec![0x7f];
    code.extend_from_slice(&value.to_be_bytes::<32>());
    code
}

#[test]
fn push32_roundtrip() {
    let value = U256::from_be_bytes([0x5a; 32]);
    let mut code = push32(value);
    code.push(0x00);
    run_test_case(&TestCase {
        bytecode: &code,
        expected_gas_left: G - 3,
        expected_stack: &[value],
        ..Default::default()
    });
}

#[test]
fn push32_truncated_pads_low_bytes() {
    let code = [0x7f, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a];
    let mut word = [0u8; 32];
    word[..10].copy_from_slice(&code[1..]);
    run_test_case(&TestCase {
        bytecode: &code,
        expected_gas_left: G - 3,
        expected_stack: &[U256::from_be_bytes(word)],
        ..Default::default()
    });
}

#[test]
fn sar_of_negative_fills_ones() {
    // -1 >> 4 stays -1.
    let mut code = push32(U256::MAX);
    code.extend_from_slice(&[0x60, 0x04, 0x1d]);
    run_test_case(&TestCase {
        bytecode: &code,
        expected_gas_left: G - 9,
        expected_stack: &[U256::MAX],
        ..Default::default()
    });
}

#[test]
fn sdiv_min_by_minus_one_wraps() {
    let min = U256::from_limbs([0, 0, 0, 0x8000_0000_0000_0000]);
    let mut code = push32(U256::MAX);
    code.extend_from_slice(&push32(min));
    code.push(0x05);
    run_test_case(&TestCase {
        bytecode: &code,
        expected_gas_left: G - 11,
        expected_stack: &[min],
        ..Default::default()
    });
}

#[test]
fn smod_sign_follows_dividend() {
    // -5 % 3 == -2.
    let minus_five = U256::MAX.wrapping_sub(U256::from(4u8));
    let mut code = vec![0x60, 0x03];
    code.extend_from_slice(&push32(minus_five));
    code.push(0x07);
    run_test_case(&TestCase {
        bytecode: &code,
        expected_gas_left: G - 11,
        expected_stack: &[U256::MAX.wrapping_sub(U256::from(1u8))],
        ..Default::default()
    });
}

#[test]
fn mstore_beyond_addressable_memory() {
    let mut code = vec![0x60, 0x01];
    code.extend_from_slice(&push32(U256::MAX));
    code.push(0x52);
    run_test_case(&TestCase {
        bytecode: &code,
        expected_status: StatusCode::OutOfGas,
        expected_gas_left: 0,
        ..Default::default()
    });
}

fn push20(address: Address) -> Vec<u8> {
    let mut code = vec![0x73];
    code.extend_from_slice(address.as_slice());
    code
}

#[test]
fn extcodesize_of_known_account() {
    let mut code = push20(OTHER_ADDR);
    code.push(0x3b);
    run_test_case(&TestCase {
        bytecode: &code,
        expected_gas_left: G - 703,
        expected_stack: &[U256::from(6u8)],
        ..Default::default()
    });
}

#[test]
fn extcodehash_of_known_account() {
    let mut code = push20(OTHER_ADDR);
    code.push(0x3f);
    let hash = keccak256([0x60, 0x69, 0x60, 0x42, 0x01, 0x00]);
    run_test_case(&TestCase {
        bytecode: &code,
        expected_gas_left: G - 703,
        expected_stack: &[U256::from_be_bytes(hash.0)],
        ..Default::default()
    });
}

#[test]
fn extcodecopy_zero_fills_past_code_end() {
    // Copy 8 bytes of a 6-byte contract.
    let mut code = vec![0x60, 0x08, 0x60, 0x00, 0x60, 0x00];
    code.extend_from_slice(&push20(OTHER_ADDR));
    code.push(0x3c);
    run_test_case(&TestCase {
        bytecode: &code,
        // 3 * 3 + 3 (PUSH20) + 700, plus one word each of expansion and copy.
        expected_gas_left: G - 712 - 3 - 3,
        assert_state: Some(|state| {
            assert_eq!(state.memory.slice(0, 8), &[0x60, 0x69, 0x60, 0x42, 0x01, 0x00, 0x00, 0x00]);
        }),
        ..Default::default()
    });
}

#[test]
fn returndatacopy_out_of_bounds() {
    // A call producing 4 bytes of return data, then an 8-byte read from it.
    let mut code = vec![
        0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0xee,
        0x61, 0x27, 0x10, 0xf1,
    ];
    code.extend_from_slice(&[0x60, 0x08, 0x60, 0x00, 0x60, 0x00, 0x3e]);
    run_test_case(&TestCase {
        bytecode: &code,
        prepare_host: Some(|host| host.call_output = Bytes::from_static(&[0xbb; 4])),
        expected_status: StatusCode::InvalidMemoryAccess,
        expected_gas_left: 0,
        expected_stack: &[U256::from(1u8)],
        ..Default::default()
    });
}

#[test]
fn calldatacopy_zero_fills_past_input_end() {
    // Copy 8 bytes starting 2 bytes into a 4-byte input.
    run_test_case(&TestCase {
        bytecode: &[0x60, 0x08, 0x60, 0x02, 0x60, 0x00, 0x37],
        input: &[0x11, 0x22, 0x33, 0x44],
        expected_gas_left: G - 12 - 3 - 3,
        assert_state: Some(|state| {
            assert_eq!(state.memory.slice(0, 8), &[0x33, 0x44, 0, 0, 0, 0, 0, 0]);
        }),
        ..Default::default()
    });
}

#[test]
fn selfdestruct_to_existing_beneficiary() {
    // No new-account surcharge when the beneficiary exists.
    let mut code = push20(OTHER_ADDR);
    code.push(0xff);
    run_test_case(&TestCase {
        bytecode: &code,
        expected_gas_left: G - 5003,
        assert_host: Some(|host| {
            assert_eq!(host.selfdestructs, [(DEF_ADDR, OTHER_ADDR)]);
        }),
        ..Default::default()
    });
}

#[test]
fn execute_packages_success() {
    let mut host = TestHost::new();
    let msg = Message { gas: 100, ..Default::default() };
    let result = execute(&mut host, SpecId::ISTANBUL, &msg, &[0x00]);
    assert_eq!(result.status_code, StatusCode::Success);
    assert_eq!(result.gas_left, 100);
    assert_eq!(result.output_data, Bytes::new());
    assert_eq!(result.used_memory, 0);
}

#[test]
fn execute_zeroes_gas_on_failure() {
    let mut host = TestHost::new();
    let msg = Message { gas: 1000, ..Default::default() };
    let result = execute(&mut host, SpecId::ISTANBUL, &msg, &[0x60, 0x00, 0x56]);
    assert_eq!(result.status_code, StatusCode::BadJumpDestination);
    assert_eq!(result.gas_left, 0);
}

#[test]
fn execute_returns_revert_output() {
    let mut host = TestHost::new();
    let msg = Message { gas: 1000, ..Default::default() };
    let code = [0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xfd];
    let result = execute(&mut host, SpecId::ISTANBUL, &msg, &code);
    assert_eq!(result.status_code, StatusCode::Revert);
    assert_eq!(result.gas_left, 1000 - 18);
    assert_eq!(result.output_data.as_ref(), U256::from(42u8).to_be_bytes::<32>());
    assert_eq!(result.used_memory, 32);
}
