//! A basic-block pre-analyzing, threaded interpreter for EVM bytecode.
//!
//! Raw code is decoded once, per revision, into an instruction stream with a
//! synthetic `BEGINBLOCK` entry at every basic-block boundary. The block
//! entry carries the aggregate base gas cost and stack requirements of the
//! whole block, so the dispatch loop performs a single combined check per
//! block instead of one per opcode. Jump destinations are resolved through a
//! sorted offset index built during the same pass.
//!
//! ```no_run
//! use blockvm::{execute, Host, Message, SpecId};
//!
//! fn run(host: &mut dyn Host, code: &[u8]) {
//!     let msg = Message { gas: 100_000, ..Default::default() };
//!     let result = execute(host, SpecId::ISTANBUL, &msg, code);
//!     println!("{:?}: {} gas left", result.status_code, result.gas_left);
//! }
//! ```

#![cfg_attr(not(test), warn(unused_extern_crates))]

#[macro_use]
extern crate tracing;

mod bytecode;
pub use bytecode::*;

pub mod instructions;

mod host;
pub use host::*;

mod state;
pub use state::*;

mod execute;
pub use execute::*;

#[doc(no_inline)]
pub use revm_primitives::{self as primitives, SpecId};

#[cfg(test)]
mod tests;
