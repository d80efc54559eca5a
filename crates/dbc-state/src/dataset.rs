//! The data registry: requests for data, per-version validations,
//! provider payloads and acceptor confirmations.
//!
//! A `Data` entry is created by a requirer, certified version by version by
//! its designated validator, filled by any provider able to reveal the
//! validator's zero-knowledge commitment, and confirmed by the designated
//! acceptor. Each confirmed version releases one tranche of the reward the
//! requirer escrowed in the sibling [`Balance`] when the entry was created.
//!
//! Content hashing mirrors the structure: every entity hashes the
//! concatenation of its member fields; composite entities concatenate
//! child hashes. An empty payload slot contributes `SHA256("")`.

use dbc_core::error::StateError;
use dbc_core::types::{AccountKey, Amount, Bytes, SignatureBytes};
use dbc_crypto::hash::empty_hash;
use dbc_crypto::{ecdsa, sha256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::balance::{Balance, Confirm, RewardInfo};

// ── Dataset ──────────────────────────────────────────────────────────────────

/// The per-block registry state: an append-only list of data entries.
///
/// Reward bookkeeping lives in the sibling [`Balance`]; every operation
/// that touches it borrows the ledger for the duration of the call. Both
/// are owned by the same block state and cloned together at each commit.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Dataset {
    pub data_list: Vec<Data>,
}

impl Dataset {
    /// The registry carried into the next block.
    pub fn next_block(&self) -> Dataset {
        self.clone()
    }

    /// Register a new data request and escrow its reward.
    pub fn add_data(
        &mut self,
        balance: &mut Balance,
        description: Description,
    ) -> Result<(), StateError> {
        if !ecdsa::check_key(&description.requirer)
            || !ecdsa::check_key(&description.validator)
            || !ecdsa::check_key(&description.acceptor)
        {
            return Err(StateError::InvalidKey);
        }
        for amount in [
            description.validator_amount,
            description.provider_amount,
            description.acceptor_amount,
        ] {
            if amount < 0 {
                return Err(StateError::NegativeAmount(amount));
            }
        }
        if description.max_versions < 0 {
            return Err(StateError::NegativeAmount(description.max_versions));
        }
        if !ecdsa::verify(
            &description.requirer,
            &description.signing_message(),
            &description.signature,
        ) {
            return Err(StateError::BadSignature);
        }
        let reward_index = balance.add_reward(RewardInfo {
            requirer: description.requirer.clone(),
            validator: description.validator.clone(),
            acceptor: description.acceptor.clone(),
            validator_amount: description.validator_amount,
            provider_amount: description.provider_amount,
            acceptor_amount: description.acceptor_amount,
            max_confirms: description.max_versions,
        })?;
        self.data_list.push(Data {
            description,
            version_list: Vec::new(),
            reward_index,
        });
        info!(data_index = self.data_list.len() - 1, reward_index, "added data");
        Ok(())
    }

    /// Open a new version of the data at `data_index` with the validator's
    /// zero-knowledge commitment.
    pub fn add_validation(
        &mut self,
        validation: Validation,
        data_index: usize,
    ) -> Result<(), StateError> {
        let data = self.data_list.get_mut(data_index).ok_or(StateError::NotFound)?;
        if !ecdsa::check_key(&validation.validator_addr) {
            return Err(StateError::InvalidKey);
        }
        if !ecdsa::verify(&validation.validator_addr, &validation.info.0, &validation.signature) {
            return Err(StateError::BadSignature);
        }
        if validation.validator_addr != data.description.validator {
            return Err(StateError::NotValidator);
        }
        if data.version_list.len() as i64 >= data.description.max_versions {
            return Err(StateError::VersionsExhausted(data.description.max_versions));
        }
        data.version_list.push(Version {
            accepted_payload: None,
            payload: None,
            validation,
        });
        info!(data_index, version_index = data.version_list.len() - 1, "added validation");
        Ok(())
    }

    /// Fill a version's payload slot. The provider must reveal the
    /// preimage of the validation's commitment.
    pub fn add_payload(
        &mut self,
        payload: Payload,
        data_index: usize,
        version_index: usize,
    ) -> Result<(), StateError> {
        let version = self
            .data_list
            .get_mut(data_index)
            .ok_or(StateError::NotFound)?
            .version_list
            .get_mut(version_index)
            .ok_or(StateError::NotFound)?;
        if !ecdsa::check_key(&payload.provider_addr) {
            return Err(StateError::InvalidKey);
        }
        if !ecdsa::verify(&payload.provider_addr, &payload.signing_message(), &payload.signature) {
            return Err(StateError::BadSignature);
        }
        if sha256(&payload.proof.0) != version.validation.info.0[..] {
            return Err(StateError::BadProof);
        }
        if version.payload.is_some() {
            return Err(StateError::AlreadyExists);
        }
        version.payload = Some(payload);
        info!(data_index, version_index, "added payload");
        Ok(())
    }

    /// Confirm a version's payload and release one reward tranche.
    ///
    /// Reward confirmation and the slot write are atomic: if the sibling
    /// ledger rejects the confirmation the slot stays empty.
    pub fn accept_payload(
        &mut self,
        balance: &mut Balance,
        accepted: AcceptedPayload,
        data_index: usize,
        version_index: usize,
    ) -> Result<(), StateError> {
        let data = self.data_list.get(data_index).ok_or(StateError::NotFound)?;
        let version = data.version_list.get(version_index).ok_or(StateError::NotFound)?;
        if !ecdsa::check_key(&accepted.acceptor_addr) {
            return Err(StateError::InvalidKey);
        }
        if !ecdsa::verify(&accepted.acceptor_addr, &accepted.data.0, &accepted.signature) {
            return Err(StateError::BadSignature);
        }
        if accepted.acceptor_addr != data.description.acceptor {
            return Err(StateError::NotAcceptor);
        }
        if version.accepted_payload.is_some() {
            return Err(StateError::AlreadyExists);
        }
        // The provider tranche is owed to whoever filled the payload slot;
        // a version without a payload has nothing to confirm.
        let provider = version
            .payload
            .as_ref()
            .map(|payload| payload.provider_addr.clone())
            .ok_or(StateError::NotFound)?;
        balance.confirm_reward(Confirm { provider }, data.reward_index)?;
        self.data_list[data_index].version_list[version_index].accepted_payload = Some(accepted);
        info!(data_index, version_index, "accepted payload");
        Ok(())
    }

    /// Close the reward behind the data at `data_index`, refunding the
    /// requirer's remaining escrow. Versions confirmed afterwards are
    /// rejected by the ledger with `RewardClosed`.
    pub fn close_data(&mut self, balance: &mut Balance, data_index: usize) -> Result<(), StateError> {
        let data = self.data_list.get(data_index).ok_or(StateError::NotFound)?;
        balance.close_reward(data.reward_index)?;
        info!(data_index, "closed data");
        Ok(())
    }

    /// Content hash of the registry: SHA-256 over the concatenated hashes
    /// of all data entries in insertion order.
    pub fn hash(&self) -> [u8; 32] {
        let mut sum = Vec::new();
        for data in &self.data_list {
            sum.extend_from_slice(&data.hash());
        }
        sha256(&sum)
    }
}

// ── Data ─────────────────────────────────────────────────────────────────────

/// One registered data request: its immutable description, the versions
/// added so far, and the index of its reward in the sibling ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Data {
    pub description: Description,
    pub version_list: Vec<Version>,
    pub reward_index: usize,
}

impl Data {
    pub fn hash(&self) -> [u8; 32] {
        let mut sum = self.description.hash().to_vec();
        for version in &self.version_list {
            sum.extend_from_slice(&version.hash());
        }
        sha256(&sum)
    }
}

// ── Description ──────────────────────────────────────────────────────────────

/// The immutable terms of a data request, set by the requirer: what data is
/// wanted (`data_info`), from what kind of provider (`provider_info`), who
/// certifies versions, who accepts them, and the reward split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Description {
    pub provider_info: Bytes,
    pub data_info: Bytes,
    pub validator: AccountKey,
    pub acceptor: AccountKey,
    pub requirer: AccountKey,
    pub validator_amount: Amount,
    pub provider_amount: Amount,
    pub acceptor_amount: Amount,
    pub max_versions: i64,
    pub signature: SignatureBytes,
}

impl Description {
    /// The bytes the requirer signs: `provider_info ‖ data_info`.
    pub fn signing_message(&self) -> Vec<u8> {
        let mut message = self.provider_info.0.clone();
        message.extend_from_slice(&self.data_info.0);
        message
    }

    pub fn hash(&self) -> [u8; 32] {
        let mut sum = self.signing_message();
        sum.extend_from_slice(&self.validator.0);
        sum.extend_from_slice(&self.acceptor.0);
        sum.extend_from_slice(&self.requirer.0);
        sum.extend_from_slice(&self.signature.0);
        sha256(&sum)
    }
}

// ── Version ──────────────────────────────────────────────────────────────────

/// One certified version of a data entry. The validation is set at
/// creation; the payload and accepted-payload slots are each written at
/// most once.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Version {
    pub accepted_payload: Option<AcceptedPayload>,
    pub payload: Option<Payload>,
    pub validation: Validation,
}

impl Version {
    pub fn hash(&self) -> [u8; 32] {
        let accepted = self
            .accepted_payload
            .as_ref()
            .map_or_else(empty_hash, AcceptedPayload::hash);
        let payload = self.payload.as_ref().map_or_else(empty_hash, Payload::hash);
        let mut sum = accepted.to_vec();
        sum.extend_from_slice(&payload);
        sum.extend_from_slice(&self.validation.hash());
        sha256(&sum)
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

/// The validator's zero-knowledge commitment for one version: `info` is a
/// shared secret hashed twice; a provider proves knowledge by revealing the
/// single-hash preimage in its payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Validation {
    pub info: Bytes,
    pub validator_addr: AccountKey,
    pub signature: SignatureBytes,
}

impl Validation {
    pub fn hash(&self) -> [u8; 32] {
        let mut sum = self.info.0.clone();
        sum.extend_from_slice(&self.validator_addr.0);
        sum.extend_from_slice(&self.signature.0);
        sha256(&sum)
    }
}

// ── Payload ──────────────────────────────────────────────────────────────────

/// Provider-supplied data for one version, with the revealed proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payload {
    pub data: Bytes,
    pub proof: Bytes,
    pub provider_addr: AccountKey,
    pub signature: SignatureBytes,
}

impl Payload {
    /// The bytes the provider signs: `data ‖ proof`.
    pub fn signing_message(&self) -> Vec<u8> {
        let mut message = self.data.0.clone();
        message.extend_from_slice(&self.proof.0);
        message
    }

    pub fn hash(&self) -> [u8; 32] {
        let mut sum = self.signing_message();
        sum.extend_from_slice(&self.provider_addr.0);
        sum.extend_from_slice(&self.signature.0);
        sha256(&sum)
    }
}

// ── AcceptedPayload ──────────────────────────────────────────────────────────

/// The acceptor's confirmation of a version, carrying the data re-encrypted
/// for the requirer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AcceptedPayload {
    pub data: Bytes,
    pub acceptor_addr: AccountKey,
    pub signature: SignatureBytes,
}

impl AcceptedPayload {
    pub fn hash(&self) -> [u8; 32] {
        let mut sum = self.data.0.clone();
        sum.extend_from_slice(&self.acceptor_addr.0);
        sum.extend_from_slice(&self.signature.0);
        sha256(&sum)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
//
// See tests/dataset.rs: these run as an integration test crate so that
// dbc-testkit (which itself depends on dbc-state) does not form a
// dev-dependency cycle with this crate's own unit test build.
