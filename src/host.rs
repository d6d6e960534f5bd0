use revm_primitives::{Address, Bytes, B256, U256};

use crate::execute::ExecutionResult;

/// The kind of a call-like frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Call,
    DelegateCall,
    CallCode,
    Create,
    Create2,
}

/// Description of one execution frame, as passed to [`crate::execute`] and to
/// [`Host::call`] for nested frames.
#[derive(Clone, Debug)]
pub struct Message {
    pub kind: CallKind,
    /// Set inside `STATICCALL` frames; state-modifying instructions are
    /// rejected while it holds.
    pub is_static: bool,
    pub depth: i32,
    /// Gas available to the frame.
    pub gas: i64,
    /// The account whose storage and balance the frame acts on.
    pub recipient: Address,
    /// The account whose code runs. Differs from `recipient` for
    /// `DELEGATECALL` and `CALLCODE`.
    pub code_address: Address,
    pub sender: Address,
    pub input_data: Bytes,
    pub value: U256,
    /// Only meaningful for [`CallKind::Create2`].
    pub create2_salt: B256,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            kind: CallKind::Call,
            is_static: false,
            depth: 0,
            gas: i64::MAX,
            recipient: Address::ZERO,
            code_address: Address::ZERO,
            sender: Address::ZERO,
            input_data: Bytes::new(),
            value: U256::ZERO,
            create2_salt: B256::ZERO,
        }
    }
}

/// Transaction and block context served to the environment opcodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct TxContext {
    pub tx_gas_price: U256,
    pub tx_origin: Address,
    pub block_coinbase: Address,
    pub block_number: i64,
    pub block_timestamp: i64,
    pub block_gas_limit: i64,
    pub block_difficulty: U256,
    pub chain_id: U256,
}

/// Effect of a storage write, as reported by the host. Drives the `SSTORE`
/// gas charge; refund accounting is the host's concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageStatus {
    /// The value of the slot did not change.
    Unchanged,
    /// A nonzero value was replaced by a different nonzero value.
    Modified,
    /// A slot already written in this transaction changed again.
    ModifiedAgain,
    /// A zero slot was set to a nonzero value.
    Added,
    /// A nonzero slot was set to zero.
    Deleted,
}

/// The interface to everything outside the current frame: accounts, storage,
/// block data, logs, and nested frames. Consumed as an opaque vtable.
pub trait Host {
    fn account_exists(&mut self, address: Address) -> bool;

    fn get_storage(&mut self, address: Address, key: U256) -> U256;

    fn set_storage(&mut self, address: Address, key: U256, value: U256) -> StorageStatus;

    fn get_balance(&mut self, address: Address) -> U256;

    fn get_code_size(&mut self, address: Address) -> usize;

    fn get_code_hash(&mut self, address: Address) -> B256;

    /// Copies code of `address` starting at `code_offset` into `buffer`,
    /// returning the number of bytes written. Short reads are not an error;
    /// the caller zero-fills the rest.
    fn copy_code(&mut self, address: Address, code_offset: usize, buffer: &mut [u8]) -> usize;

    fn selfdestruct(&mut self, address: Address, beneficiary: Address);

    /// Executes a nested call or create frame.
    fn call(&mut self, msg: &Message) -> ExecutionResult;

    fn get_tx_context(&mut self) -> TxContext;

    fn get_block_hash(&mut self, number: i64) -> B256;

    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[B256]);
}
