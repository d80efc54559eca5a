//! The token ledger: user wallets, validator stakes, reward escrows and
//! per-transaction fees.
//!
//! Content hashing is byte-exact and order-dependent. Every entity hashes
//! the concatenation of its member fields (amounts and timestamps as
//! shortest ASCII decimal); the ledger hash is SHA-256 over the
//! concatenated entity hashes of all transfers, then stakes, then rewards,
//! then fees, in insertion order. An empty ledger hashes to `SHA256("")`.

use dbc_core::constants::TX_FEE;
use dbc_core::error::StateError;
use dbc_core::types::{
    AccountKey, Amount, Bytes, ConsensusKey, SignatureBytes, Timestamp, ValidatorAddress,
};
use dbc_crypto::{ecdsa, eddsa, sha256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

// ── Balance ──────────────────────────────────────────────────────────────────

/// The per-block ledger state.
///
/// Maps are `BTreeMap` so that iteration (validator-update emission, JSON
/// encoding) is identical on every replica. Missing entries read as zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Balance {
    /// Wallet balances keyed by secp256k1 account key. Never negative.
    pub users: BTreeMap<AccountKey, Amount>,
    /// Staked sats keyed by Ed25519 consensus key. Never negative.
    pub validators: BTreeMap<ConsensusKey, Amount>,
    /// Stake deltas accumulated since block start; cleared by `next_block`.
    pub val_changes: BTreeMap<ConsensusKey, Amount>,
    /// 20-byte consensus address → Ed25519 key, populated by genesis and
    /// by every stake.
    pub val_addr: BTreeMap<ValidatorAddress, ConsensusKey>,
    pub transfers: Vec<Transfer>,
    pub stakes: Vec<Stake>,
    pub rewards: Vec<Reward>,
    pub fees: Vec<Fee>,
}

impl Balance {
    /// The ledger carried into the next block: same maps and histories,
    /// fresh delta tracking.
    pub fn next_block(&self) -> Balance {
        let mut balance = self.clone();
        balance.val_changes.clear();
        balance
    }

    /// Seed wallets and the validator set at chain initialization.
    pub fn set_genesis(
        &mut self,
        users: BTreeMap<AccountKey, Amount>,
        validators: BTreeMap<ConsensusKey, Amount>,
    ) {
        for key in validators.keys() {
            self.val_addr.insert(eddsa::address(key), key.clone());
        }
        self.users = users;
        self.validators = validators;
    }

    pub fn user_balance(&self, key: &AccountKey) -> Amount {
        self.users.get(key).copied().unwrap_or(0)
    }

    pub fn validator_stake(&self, key: &ConsensusKey) -> Amount {
        self.validators.get(key).copied().unwrap_or(0)
    }

    /// Current voting power of every validator touched since block start,
    /// in key order. Consumed by the block state machine at `EndBlock`.
    pub fn validator_updates(&self) -> Vec<(ConsensusKey, Amount)> {
        self.val_changes
            .keys()
            .map(|key| (key.clone(), self.validator_stake(key)))
            .collect()
    }

    // ── Operations ───────────────────────────────────────────────────────────

    /// Move sats between two wallets.
    pub fn add_transfer(&mut self, transfer: Transfer) -> Result<(), StateError> {
        if !ecdsa::check_key(&transfer.sender) || !ecdsa::check_key(&transfer.receiver) {
            return Err(StateError::InvalidKey);
        }
        if transfer.amount < 0 {
            return Err(StateError::NegativeAmount(transfer.amount));
        }
        if !ecdsa::verify(&transfer.sender, &transfer.signing_message(), &transfer.signature) {
            return Err(StateError::BadSignature);
        }
        self.debit_user(&transfer.sender, transfer.amount)?;
        self.credit_user(&transfer.receiver, transfer.amount);
        info!(sender = %transfer.sender, amount = transfer.amount, "applied transfer");
        self.transfers.push(transfer);
        Ok(())
    }

    /// Stake (`amount >= 0`, authorized by the user's secp256k1 key) or
    /// unstake (`amount < 0`, authorized by the validator's Ed25519 key).
    pub fn add_stake(&mut self, stake: Stake) -> Result<(), StateError> {
        if !ecdsa::check_key(&stake.user) || !eddsa::check_key(&stake.validator) {
            return Err(StateError::InvalidKey);
        }
        let message = stake.signing_message();
        let signed = if stake.amount >= 0 {
            ecdsa::verify(&stake.user, &message, &stake.signature)
        } else {
            eddsa::verify(&stake.validator, &message, &stake.signature)
        };
        if !signed {
            return Err(StateError::BadSignature);
        }
        if stake.amount >= 0 {
            self.debit_user(&stake.user, stake.amount)?;
        } else {
            // Unstake: the validator pool must cover the withdrawal.
            let have = self.validator_stake(&stake.validator);
            if have < -stake.amount {
                return Err(StateError::InsufficientBalance {
                    need: -stake.amount,
                    have,
                });
            }
            self.credit_user(&stake.user, -stake.amount);
        }
        *self.validators.entry(stake.validator.clone()).or_insert(0) += stake.amount;
        *self.val_changes.entry(stake.validator.clone()).or_insert(0) += stake.amount;
        self.val_addr
            .insert(eddsa::address(&stake.validator), stake.validator.clone());
        info!(validator = %stake.validator, amount = stake.amount, "applied stake");
        self.stakes.push(stake);
        Ok(())
    }

    /// Open a reward, escrowing the full payout for `max_confirms`
    /// confirmations from the requirer's wallet. Returns the index the
    /// reward is addressed by for its whole lifetime.
    pub fn add_reward(&mut self, info: RewardInfo) -> Result<usize, StateError> {
        if info.max_confirms < 0 {
            return Err(StateError::NegativeAmount(info.max_confirms));
        }
        let escrow = info.tranche() * info.max_confirms;
        if escrow < 0 {
            // A negative escrow would mint sats into the requirer's wallet.
            return Err(StateError::NegativeAmount(escrow));
        }
        self.debit_user(&info.requirer, escrow)?;
        info!(requirer = %info.requirer, escrow, "opened reward");
        self.rewards.push(Reward {
            info,
            confirms: Vec::new(),
            state: RewardState::Open,
        });
        Ok(self.rewards.len() - 1)
    }

    /// Release one tranche of the reward at `index`: the validator and
    /// acceptor amounts to the designated keys, the provider amount to the
    /// provider recorded in `confirm`.
    pub fn confirm_reward(&mut self, confirm: Confirm, index: usize) -> Result<(), StateError> {
        let reward = self.rewards.get_mut(index).ok_or(StateError::NotFound)?;
        if reward.state == RewardState::Closed {
            return Err(StateError::RewardClosed);
        }
        if reward.confirms.len() as i64 >= reward.info.max_confirms {
            return Err(StateError::ConfirmsExhausted(reward.info.max_confirms));
        }
        let info = reward.info.clone();
        reward.confirms.push(confirm.clone());
        self.credit_user(&info.validator, info.validator_amount);
        self.credit_user(&confirm.provider, info.provider_amount);
        self.credit_user(&info.acceptor, info.acceptor_amount);
        info!(index, released = info.tranche(), "confirmed reward");
        Ok(())
    }

    /// Close the reward at `index`, refunding the unconfirmed tranches to
    /// the requirer.
    pub fn close_reward(&mut self, index: usize) -> Result<(), StateError> {
        let reward = self.rewards.get_mut(index).ok_or(StateError::NotFound)?;
        if reward.state == RewardState::Closed {
            return Err(StateError::RewardClosed);
        }
        reward.state = RewardState::Closed;
        let refund = reward.info.tranche() * (reward.info.max_confirms - reward.confirms.len() as i64);
        let requirer = reward.info.requirer.clone();
        self.credit_user(&requirer, refund);
        info!(index, refund, "closed reward");
        Ok(())
    }

    /// Charge the flat transaction fee to `fee.user` and credit it to the
    /// validator registered under `fee.validator_addr`.
    pub fn add_fee(&mut self, fee: Fee) -> Result<(), StateError> {
        let validator = self
            .val_addr
            .get(&fee.validator_addr)
            .cloned()
            .ok_or(StateError::NotFound)?;
        self.debit_user(&fee.user, TX_FEE)?;
        *self.validators.entry(validator.clone()).or_insert(0) += TX_FEE;
        *self.val_changes.entry(validator).or_insert(0) += TX_FEE;
        info!(user = %fee.user, "applied fee");
        self.fees.push(fee);
        Ok(())
    }

    // ── Hashing ──────────────────────────────────────────────────────────────

    /// Content hash of the ledger: SHA-256 over the concatenated hashes of
    /// transfers, stakes, rewards and fees in insertion order.
    pub fn hash(&self) -> [u8; 32] {
        let mut sum = Vec::new();
        for transfer in &self.transfers {
            sum.extend_from_slice(&transfer.hash());
        }
        for stake in &self.stakes {
            sum.extend_from_slice(&stake.hash());
        }
        for reward in &self.rewards {
            sum.extend_from_slice(&reward.hash());
        }
        for fee in &self.fees {
            sum.extend_from_slice(&fee.hash());
        }
        sha256(&sum)
    }

    // ── Wallet arithmetic ────────────────────────────────────────────────────

    fn debit_user(&mut self, key: &AccountKey, amount: Amount) -> Result<(), StateError> {
        let have = self.user_balance(key);
        if have < amount {
            return Err(StateError::InsufficientBalance { need: amount, have });
        }
        self.users.insert(key.clone(), have - amount);
        Ok(())
    }

    fn credit_user(&mut self, key: &AccountKey, amount: Amount) {
        *self.users.entry(key.clone()).or_insert(0) += amount;
    }
}

// ── Transfer ─────────────────────────────────────────────────────────────────

/// A wallet-to-wallet payment, signed by the sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transfer {
    pub sender: AccountKey,
    pub receiver: AccountKey,
    pub amount: Amount,
    pub time: Timestamp,
    pub signature: SignatureBytes,
}

impl Transfer {
    /// The bytes the sender signs: `sender ‖ receiver ‖ decimal(amount) ‖
    /// decimal(time)`.
    pub fn signing_message(&self) -> Vec<u8> {
        let mut message = self.sender.0.clone();
        message.extend_from_slice(&self.receiver.0);
        message.extend_from_slice(self.amount.to_string().as_bytes());
        message.extend_from_slice(self.time.to_string().as_bytes());
        message
    }

    pub fn hash(&self) -> [u8; 32] {
        let mut sum = self.signing_message();
        sum.extend_from_slice(&self.signature.0);
        sha256(&sum)
    }
}

// ── Stake ────────────────────────────────────────────────────────────────────

/// A stake delta. Positive amounts move wallet sats into a validator's
/// pool and are signed by the user; negative amounts withdraw and are
/// signed by the validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Stake {
    pub user: AccountKey,
    pub validator: ConsensusKey,
    pub amount: Amount,
    pub time: Timestamp,
    pub signature: SignatureBytes,
}

impl Stake {
    /// `user ‖ validator ‖ decimal(amount) ‖ decimal(time)`, common to both
    /// signing domains.
    pub fn signing_message(&self) -> Vec<u8> {
        let mut message = self.user.0.clone();
        message.extend_from_slice(&self.validator.0);
        message.extend_from_slice(self.amount.to_string().as_bytes());
        message.extend_from_slice(self.time.to_string().as_bytes());
        message
    }

    pub fn hash(&self) -> [u8; 32] {
        let mut sum = self.signing_message();
        sum.extend_from_slice(&self.signature.0);
        sha256(&sum)
    }
}

// ── Reward ───────────────────────────────────────────────────────────────────

/// The immutable terms of a reward, mirrored from the data request that
/// opened it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RewardInfo {
    pub requirer: AccountKey,
    pub validator: AccountKey,
    pub acceptor: AccountKey,
    pub validator_amount: Amount,
    pub provider_amount: Amount,
    pub acceptor_amount: Amount,
    pub max_confirms: i64,
}

impl RewardInfo {
    /// Sats released per confirmation (and escrowed per remaining one).
    pub fn tranche(&self) -> Amount {
        self.validator_amount + self.provider_amount + self.acceptor_amount
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardState {
    Open,
    Closed,
}

/// One confirmation of a reward, naming the provider the provider tranche
/// goes to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Confirm {
    pub provider: AccountKey,
}

/// A reward escrow. Addressed by insertion index for its whole lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Reward {
    pub info: RewardInfo,
    pub confirms: Vec<Confirm>,
    pub state: RewardState,
}

impl Reward {
    pub fn hash(&self) -> [u8; 32] {
        let info = &self.info;
        let mut sum = info.requirer.0.clone();
        sum.extend_from_slice(&info.validator.0);
        sum.extend_from_slice(&info.acceptor.0);
        sum.extend_from_slice(info.validator_amount.to_string().as_bytes());
        sum.extend_from_slice(info.provider_amount.to_string().as_bytes());
        sum.extend_from_slice(info.acceptor_amount.to_string().as_bytes());
        sum.extend_from_slice(info.max_confirms.to_string().as_bytes());
        for confirm in &self.confirms {
            sum.extend_from_slice(&confirm.provider.0);
        }
        sha256(&sum)
    }
}

// ── Fee ──────────────────────────────────────────────────────────────────────

/// The flat fee charged for one transaction, credited to the validator
/// registered under the 20-byte consensus address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fee {
    pub user: AccountKey,
    pub validator_addr: ValidatorAddress,
    pub tx_hash: Bytes,
}

impl Fee {
    pub fn hash(&self) -> [u8; 32] {
        let mut sum = self.user.0.clone();
        sum.extend_from_slice(self.validator_addr.as_bytes());
        sum.extend_from_slice(&self.tx_hash.0);
        sha256(&sum)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
//
// See tests/balance.rs: these run as an integration test crate so that
// dbc-testkit (which itself depends on dbc-state) does not form a
// dev-dependency cycle with this crate's own unit test build.
