use revm_primitives::{Address, Bytes, SpecId};

use crate::bytecode::{analyze, Next};
use crate::host::{Host, Message};
use crate::state::{ExecutionState, StatusCode};

/// The outcome of one execution frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status_code: StatusCode,
    /// Gas remaining. Zeroed unless the status preserves gas.
    pub gas_left: i64,
    pub output_data: Bytes,
    /// The address of the deployed contract, for successful create frames.
    pub create_address: Option<Address>,
    /// Peak memory size of the frame, for external cost analysis.
    pub used_memory: u32,
}

impl ExecutionResult {
    /// A bare result carrying only a status, for hosts that short-circuit.
    pub fn from_status(status_code: StatusCode) -> Self {
        Self {
            status_code,
            gas_left: 0,
            output_data: Bytes::new(),
            create_address: None,
            used_memory: 0,
        }
    }
}

/// Drives the threaded dispatch loop until a handler halts.
///
/// The instruction pointer starts at index 0, which is always the entry
/// block's `BEGINBLOCK`; the trailing `STOP` guarantees termination.
pub fn run(state: &mut ExecutionState<'_>) {
    let analysis = state.analysis;
    let mut pc = 0usize;
    loop {
        let instr = &analysis.instrs[pc];
        match (instr.exec)(instr, state) {
            Next::Step => pc += 1,
            Next::Goto(target) => pc = target,
            Next::Halt => break,
        }
    }
    trace!(status = ?state.status, gas_left = state.gas_left, "execution finished");
}

/// Analyzes and executes `code` within the frame described by `msg`.
pub fn execute(
    host: &mut dyn Host,
    rev: SpecId,
    msg: &Message,
    code: &[u8],
) -> ExecutionResult {
    let analysis = analyze(rev, code);
    let mut state = ExecutionState::new(msg, rev, host, code, &analysis);
    run(&mut state);

    let gas_left = if state.status.keeps_gas() { state.gas_left } else { 0 };
    ExecutionResult {
        status_code: state.status,
        gas_left,
        output_data: Bytes::copy_from_slice(state.output()),
        create_address: None,
        used_memory: state.memory.len() as u32,
    }
}
