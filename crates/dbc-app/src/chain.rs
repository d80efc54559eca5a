//! The three-generation block state machine.
//!
//! Three generations of state exist at any time:
//!
//!   * `new`: the draft of block `h+1`, mutated by `DeliverTx`;
//!   * `committed`: the state finalized at block `h`, whose hash was
//!     returned at its `Commit`;
//!   * `confirmed`: the append-only history; `confirmed[i]` holds the
//!     state committed at height `i + 1` (queryable from height `i + 2`).
//!
//! At `Commit` the draft is promoted to `committed`, the previous
//! `committed` (if any) is archived, and a fresh draft is cloned from the
//! committed state. The first commit has no previous committed state, so
//! nothing is archived: height 1 always queries as empty.

use dbc_core::error::StateError;
use dbc_state::balance::Balance;
use dbc_state::dataset::Dataset;
use serde::Serialize;
use tracing::{debug, info};

use crate::codec;
use crate::interface::{
    Application, RequestBeginBlock, RequestCheckTx, RequestDeliverTx, RequestEndBlock,
    RequestInfo, RequestInitChain, RequestQuery, RequestSetOption, ResponseBeginBlock,
    ResponseCheckTx, ResponseCommit, ResponseDeliverTx, ResponseEndBlock, ResponseInfo,
    ResponseInitChain, ResponseQuery, ResponseSetOption, ValidatorUpdate,
};
use crate::message::{QueryType, Transaction};

// ── BlockState ───────────────────────────────────────────────────────────────

/// One generation of application state: the data registry and the token
/// ledger it settles rewards in.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockState {
    pub dataset: Dataset,
    pub balance: Balance,
}

impl BlockState {
    /// The app hash of this generation: `dataset.hash() ‖ balance.hash()`.
    pub fn hash(&self) -> Vec<u8> {
        let mut hash = self.dataset.hash().to_vec();
        hash.extend_from_slice(&self.balance.hash());
        hash
    }

    /// Deep-clone this generation into the next block's draft.
    fn next_block(&self) -> BlockState {
        BlockState {
            dataset: self.dataset.next_block(),
            balance: self.balance.next_block(),
        }
    }
}

// ── DataBlockChain ───────────────────────────────────────────────────────────

/// The application state machine driven by the replication engine.
#[derive(Debug, Default)]
pub struct DataBlockChain {
    height: i64,
    retain_height: i64,
    new: BlockState,
    committed: Option<BlockState>,
    confirmed: Vec<BlockState>,
}

impl DataBlockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    /// Lowest height the engine is told to retain history for at each
    /// commit. 0 (the default) retains everything.
    pub fn set_retain_height(&mut self, retain_height: i64) {
        self.retain_height = retain_height;
    }

    /// Read access to the current draft (test and diagnostic use).
    pub fn draft(&self) -> &BlockState {
        &self.new
    }

    /// Resolve a queried height to a confirmed generation.
    fn state_at_height(&self, height: i64) -> Option<&BlockState> {
        if self.confirmed.is_empty() {
            return None;
        }
        match height {
            // Current height: the most recent confirmed state.
            0 => self.confirmed.last(),
            // At height 1 there is no confirmed state yet.
            1 => None,
            // Confirmed states start at height 2.
            _ => usize::try_from(height - 2)
                .ok()
                .and_then(|index| self.confirmed.get(index)),
        }
    }

    /// Route one decoded transaction to its engine.
    fn apply(&mut self, transaction: Transaction) -> Result<(), StateError> {
        let BlockState { dataset, balance } = &mut self.new;
        match transaction {
            Transaction::AddData { description } => dataset.add_data(balance, description),
            Transaction::AddValidation {
                validation,
                data_index,
            } => dataset.add_validation(validation, data_index),
            Transaction::AddPayload {
                payload,
                data_index,
                version_index,
            } => dataset.add_payload(payload, data_index, version_index),
            Transaction::AcceptPayload {
                accepted,
                data_index,
                version_index,
            } => dataset.accept_payload(balance, accepted, data_index, version_index),
            Transaction::Transfer { transfer } => balance.add_transfer(transfer),
            Transaction::Stake { stake } => balance.add_stake(stake),
            Transaction::CloseData { data_index } => dataset.close_data(balance, data_index),
            Transaction::PayFee { fee } => balance.add_fee(fee),
            Transaction::Unknown => Ok(()),
        }
    }

    /// Resolve a query to the JSON encoding of the selected substructure.
    fn resolve_query(&self, request: &RequestQuery) -> Option<Vec<u8>> {
        let query = codec::decode_query(&request.data)?;
        let state = self.state_at_height(request.height)?;
        let data = |index: usize| state.dataset.data_list.get(index);
        let version =
            |d: usize, v: usize| data(d).and_then(|data| data.version_list.get(v));
        let value = match query.qr_type {
            QueryType::Dataset => serde_json::to_vec(state),
            QueryType::Data => serde_json::to_vec(&data(query.data_index)?),
            QueryType::Version => {
                serde_json::to_vec(&version(query.data_index, query.version_index)?)
            }
            QueryType::Description => {
                serde_json::to_vec(&data(query.data_index)?.description)
            }
            QueryType::Validation => {
                serde_json::to_vec(&version(query.data_index, query.version_index)?.validation)
            }
            QueryType::Payload => {
                serde_json::to_vec(&version(query.data_index, query.version_index)?.payload)
            }
            QueryType::AcceptedPayload => serde_json::to_vec(
                &version(query.data_index, query.version_index)?.accepted_payload,
            ),
            QueryType::Balance => serde_json::to_vec(&state.balance.users),
            QueryType::Stake => serde_json::to_vec(&state.balance.validators),
            QueryType::Unknown => return None,
        };
        value.ok()
    }
}

// ── Application implementation ───────────────────────────────────────────────

impl Application for DataBlockChain {
    fn info(&self, _request: RequestInfo) -> ResponseInfo {
        ResponseInfo {
            data: "data-registry blockchain application".to_string(),
            version: "V1".to_string(),
            app_version: 1,
            last_block_height: self.height,
            last_block_app_hash: self
                .committed
                .as_ref()
                .map(BlockState::hash)
                .unwrap_or_default(),
        }
    }

    fn set_option(&mut self, _request: RequestSetOption) -> ResponseSetOption {
        ResponseSetOption { code: 0 }
    }

    fn query(&self, request: RequestQuery) -> ResponseQuery {
        let value = self.resolve_query(&request).unwrap_or_default();
        ResponseQuery {
            code: 0,
            key: request.data,
            value,
            height: 0,
        }
    }

    // Validity is decided at delivery time; the mempool admits everything.
    fn check_tx(&self, _request: RequestCheckTx) -> ResponseCheckTx {
        ResponseCheckTx { code: 0 }
    }

    fn init_chain(&mut self, request: RequestInitChain) -> ResponseInitChain {
        self.new
            .balance
            .set_genesis(request.users, request.validators);
        ResponseInitChain {}
    }

    fn begin_block(&mut self, _request: RequestBeginBlock) -> ResponseBeginBlock {
        ResponseBeginBlock {}
    }

    fn deliver_tx(&mut self, request: RequestDeliverTx) -> ResponseDeliverTx {
        match codec::decode_transaction(&request.tx) {
            Some(transaction) => {
                if let Err(err) = self.apply(transaction) {
                    // Rejections must not surface to the engine: replicas
                    // whose consensus layer ignores per-tx codes would
                    // diverge. The transaction is dropped, the block
                    // proceeds.
                    debug!(%err, "transaction rejected");
                }
            }
            None => debug!("transaction frame dropped"),
        }
        ResponseDeliverTx { code: 0 }
    }

    fn end_block(&mut self, _request: RequestEndBlock) -> ResponseEndBlock {
        let validator_updates = self
            .new
            .balance
            .validator_updates()
            .into_iter()
            .map(|(pub_key, power)| ValidatorUpdate { pub_key, power })
            .collect();
        ResponseEndBlock { validator_updates }
    }

    fn commit(&mut self) -> ResponseCommit {
        if self.height > 0 {
            if let Some(previous) = self.committed.take() {
                self.confirmed.push(previous);
            }
        }
        let committed = std::mem::take(&mut self.new);
        self.new = committed.next_block();
        let data = committed.hash();
        self.committed = Some(committed);
        self.height += 1;
        info!(height = self.height, "block committed");
        ResponseCommit {
            data,
            retain_height: self.retain_height,
        }
    }
}
