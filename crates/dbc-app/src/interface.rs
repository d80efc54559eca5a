//! The application interface expected by the BFT replication engine.
//!
//! The engine is an opaque collaborator: it orders transactions, delivers
//! them one block at a time, and asks for the committed state hash. These
//! types are the contract only; socket framing and the engine itself live
//! outside this workspace.
//!
//! Call sequence per block: `BeginBlock`, zero or more `DeliverTx`,
//! `EndBlock`, `Commit`. `Query`, `Info` and `CheckTx` may interleave
//! between blocks. All calls are serialized by the engine; the application
//! never needs internal locking.

use std::collections::BTreeMap;

use dbc_core::types::{AccountKey, Amount, ConsensusKey, Height, Timestamp};
use serde::{Deserialize, Serialize};

// ── Requests ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestInfo {
    pub version: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestSetOption {
    pub key: String,
    pub value: String,
}

/// A query for a substructure of the state at `height` (0 = latest
/// confirmed). `data` is a base64-framed JSON query envelope.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestQuery {
    pub data: Vec<u8>,
    pub height: Height,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestCheckTx {
    pub tx: Vec<u8>,
}

/// Genesis allocations: wallet balances and the initial validator set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestInitChain {
    pub users: BTreeMap<AccountKey, Amount>,
    pub validators: BTreeMap<ConsensusKey, Amount>,
}

/// Reserved for block time and proposer metadata; the core ignores it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestBeginBlock {
    pub time: Timestamp,
}

/// A base64-framed JSON transaction envelope, in consensus order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestDeliverTx {
    pub tx: Vec<u8>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestEndBlock {
    pub height: Height,
}

// ── Responses ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub data: String,
    pub version: String,
    pub app_version: u64,
    pub last_block_height: Height,
    pub last_block_app_hash: Vec<u8>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseSetOption {
    pub code: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseQuery {
    pub code: u32,
    /// The query envelope, echoed back.
    pub key: Vec<u8>,
    /// JSON encoding of the selected substructure; empty when the entity
    /// or the height is unavailable.
    pub value: Vec<u8>,
    pub height: Height,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseCheckTx {
    pub code: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseInitChain {}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseBeginBlock {}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseDeliverTx {
    pub code: u32,
}

/// A validator's new voting power, to be applied by the consensus engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub pub_key: ConsensusKey,
    pub power: Amount,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseEndBlock {
    pub validator_updates: Vec<ValidatorUpdate>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseCommit {
    /// `dataset.hash() ‖ balance.hash()` of the state committed by this
    /// call.
    pub data: Vec<u8>,
    /// Lowest height whose history must be retained; 0 retains all.
    pub retain_height: Height,
}

// ── Application ──────────────────────────────────────────────────────────────

/// The deterministic state machine the replication engine drives.
pub trait Application {
    fn info(&self, request: RequestInfo) -> ResponseInfo;
    fn set_option(&mut self, request: RequestSetOption) -> ResponseSetOption;
    fn query(&self, request: RequestQuery) -> ResponseQuery;
    fn check_tx(&self, request: RequestCheckTx) -> ResponseCheckTx;
    fn init_chain(&mut self, request: RequestInitChain) -> ResponseInitChain;
    fn begin_block(&mut self, request: RequestBeginBlock) -> ResponseBeginBlock;
    fn deliver_tx(&mut self, request: RequestDeliverTx) -> ResponseDeliverTx;
    fn end_block(&mut self, request: RequestEndBlock) -> ResponseEndBlock;
    fn commit(&mut self) -> ResponseCommit;
}
