//! Transaction and query envelopes.
//!
//! Both arrive as JSON with PascalCase field names and hex-encoded byte
//! fields, wrapped in base64 by the submitter. Envelopes are flat (a tag
//! plus optional entity objects plus indices) and convert into sum types
//! whose arms carry exactly the fields each operation needs. Unknown tags
//! land on an inert `Unknown` arm: the transaction mutates nothing, the
//! query selects nothing.

use dbc_state::balance::{Fee, Stake, Transfer};
use dbc_state::dataset::{AcceptedPayload, Description, Payload, Validation};
use serde::{Deserialize, Serialize};

// ── Transactions ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxType {
    AddData,
    AddValidation,
    AddPayload,
    AcceptPayload,
    Transfer,
    Stake,
    CloseData,
    PayFee,
    #[serde(other)]
    Unknown,
}

impl Default for TxType {
    fn default() -> Self {
        TxType::Unknown
    }
}

/// The wire form of a transaction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TransactionEnvelope {
    pub tx_type: TxType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Description>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<Validation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_payload: Option<AcceptedPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<Transfer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stake: Option<Stake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<Fee>,
    pub data_index: usize,
    pub version_index: usize,
}

/// A decoded transaction, one arm per operation.
#[derive(Clone, Debug)]
pub enum Transaction {
    AddData {
        description: Description,
    },
    AddValidation {
        validation: Validation,
        data_index: usize,
    },
    AddPayload {
        payload: Payload,
        data_index: usize,
        version_index: usize,
    },
    AcceptPayload {
        accepted: AcceptedPayload,
        data_index: usize,
        version_index: usize,
    },
    Transfer {
        transfer: Transfer,
    },
    Stake {
        stake: Stake,
    },
    CloseData {
        data_index: usize,
    },
    PayFee {
        fee: Fee,
    },
    /// Unrecognized tag or missing entity object; applies no mutation.
    Unknown,
}

impl TransactionEnvelope {
    pub fn into_transaction(self) -> Transaction {
        match self.tx_type {
            TxType::AddData => match self.description {
                Some(description) => Transaction::AddData { description },
                None => Transaction::Unknown,
            },
            TxType::AddValidation => match self.validation {
                Some(validation) => Transaction::AddValidation {
                    validation,
                    data_index: self.data_index,
                },
                None => Transaction::Unknown,
            },
            TxType::AddPayload => match self.payload {
                Some(payload) => Transaction::AddPayload {
                    payload,
                    data_index: self.data_index,
                    version_index: self.version_index,
                },
                None => Transaction::Unknown,
            },
            TxType::AcceptPayload => match self.accepted_payload {
                Some(accepted) => Transaction::AcceptPayload {
                    accepted,
                    data_index: self.data_index,
                    version_index: self.version_index,
                },
                None => Transaction::Unknown,
            },
            TxType::Transfer => match self.transfer {
                Some(transfer) => Transaction::Transfer { transfer },
                None => Transaction::Unknown,
            },
            TxType::Stake => match self.stake {
                Some(stake) => Transaction::Stake { stake },
                None => Transaction::Unknown,
            },
            TxType::CloseData => Transaction::CloseData {
                data_index: self.data_index,
            },
            TxType::PayFee => match self.fee {
                Some(fee) => Transaction::PayFee { fee },
                None => Transaction::Unknown,
            },
            TxType::Unknown => Transaction::Unknown,
        }
    }
}

// ── Queries ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryType {
    Dataset,
    Data,
    Version,
    Description,
    Validation,
    Payload,
    AcceptedPayload,
    Balance,
    Stake,
    #[serde(other)]
    Unknown,
}

impl Default for QueryType {
    fn default() -> Self {
        QueryType::Unknown
    }
}

/// The wire form of a query: a selector plus indices (ignored by selectors
/// that do not need them).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct QueryEnvelope {
    pub qr_type: QueryType,
    pub data_index: usize,
    pub version_index: usize,
}
