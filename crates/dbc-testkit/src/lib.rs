//! Deterministic mock factories for the DBC test suites.
//!
//! Everything here derives from fixed seed strings: two runs of any test
//! build bit-identical keys, signatures and entities, which the
//! determinism and hash-sensitivity properties rely on.

use std::collections::BTreeMap;

use dbc_core::constants::to_sats;
use dbc_core::types::{AccountKey, Amount, Bytes, ConsensusKey, Timestamp};
use dbc_crypto::{sha256, AccountKeyPair, ConsensusKeyPair};
use dbc_state::balance::{Balance, Stake, Transfer};
use dbc_state::dataset::{AcceptedPayload, Description, Payload, Validation};

// ── Actors ───────────────────────────────────────────────────────────────────

/// The standard cast: four secp256k1 account roles and one Ed25519
/// consensus validator.
pub struct Actors {
    pub requirer: AccountKeyPair,
    pub validator: AccountKeyPair,
    pub provider: AccountKeyPair,
    pub acceptor: AccountKeyPair,
    pub consensus: ConsensusKeyPair,
}

pub fn actors() -> Actors {
    Actors {
        requirer: AccountKeyPair::from_seed("requirer"),
        validator: AccountKeyPair::from_seed("validator"),
        provider: AccountKeyPair::from_seed("provider"),
        acceptor: AccountKeyPair::from_seed("acceptor"),
        consensus: ConsensusKeyPair::from_seed("consensus-validator"),
    }
}

/// Genesis wallet allocations: 25 / 5 / 10 / 15 DBCC for requirer /
/// validator / provider / acceptor.
pub fn genesis_users(actors: &Actors) -> BTreeMap<AccountKey, Amount> {
    let mut users = BTreeMap::new();
    users.insert(actors.requirer.public.clone(), to_sats(25));
    users.insert(actors.validator.public.clone(), to_sats(5));
    users.insert(actors.provider.public.clone(), to_sats(10));
    users.insert(actors.acceptor.public.clone(), to_sats(15));
    users
}

/// Genesis validator set: the consensus validator with 30 DBCC staked.
pub fn genesis_validators(actors: &Actors) -> BTreeMap<ConsensusKey, Amount> {
    let mut validators = BTreeMap::new();
    validators.insert(actors.consensus.public.clone(), to_sats(30));
    validators
}

/// A ledger seeded with the standard genesis allocations.
pub fn genesis_balance(actors: &Actors) -> Balance {
    let mut balance = Balance::default();
    balance.set_genesis(genesis_users(actors), genesis_validators(actors));
    balance
}

// ── Zero-knowledge proof material ────────────────────────────────────────────

/// A ZKP triple: `proof = SHA256(secret)`, `info = SHA256(proof)`. The
/// validator commits `info`; the provider later reveals `proof`.
#[derive(Clone, Debug)]
pub struct Zkp {
    pub secret: Vec<u8>,
    pub proof: Bytes,
    pub info: Bytes,
}

pub fn mock_zkp(seed: &str) -> Zkp {
    let secret = seed.as_bytes().to_vec();
    let proof = sha256(&secret);
    let info = sha256(&proof);
    Zkp {
        secret,
        proof: Bytes(proof.to_vec()),
        info: Bytes(info.to_vec()),
    }
}

// ── Dataset factories ────────────────────────────────────────────────────────

/// A requirer-signed description with the given reward split (sats) and
/// version bound.
pub fn mock_description(
    actors: &Actors,
    amounts: (Amount, Amount, Amount),
    max_versions: i64,
) -> Description {
    let provider_info = Bytes(b"pi".to_vec());
    let data_info = Bytes(b"di".to_vec());
    let mut message = provider_info.0.clone();
    message.extend_from_slice(&data_info.0);
    Description {
        provider_info,
        data_info,
        validator: actors.validator.public.clone(),
        acceptor: actors.acceptor.public.clone(),
        requirer: actors.requirer.public.clone(),
        validator_amount: amounts.0,
        provider_amount: amounts.1,
        acceptor_amount: amounts.2,
        max_versions,
        signature: actors.requirer.sign(&message),
    }
}

/// A validator-signed commitment over `zkp.info`.
pub fn mock_validation(actors: &Actors, zkp: &Zkp) -> Validation {
    Validation {
        info: zkp.info.clone(),
        validator_addr: actors.validator.public.clone(),
        signature: actors.validator.sign(&zkp.info.0),
    }
}

/// A provider-signed payload revealing `zkp.proof`.
pub fn mock_payload(actors: &Actors, zkp: &Zkp, data: &[u8]) -> Payload {
    let mut message = data.to_vec();
    message.extend_from_slice(&zkp.proof.0);
    Payload {
        data: Bytes(data.to_vec()),
        proof: zkp.proof.clone(),
        provider_addr: actors.provider.public.clone(),
        signature: actors.provider.sign(&message),
    }
}

/// An acceptor-signed confirmation carrying `data`.
pub fn mock_accepted_payload(actors: &Actors, data: &[u8]) -> AcceptedPayload {
    AcceptedPayload {
        data: Bytes(data.to_vec()),
        acceptor_addr: actors.acceptor.public.clone(),
        signature: actors.acceptor.sign(data),
    }
}

// ── Balance factories ────────────────────────────────────────────────────────

/// A sender-signed transfer.
pub fn mock_transfer(
    sender: &AccountKeyPair,
    receiver: &AccountKey,
    amount: Amount,
    time: Timestamp,
) -> Transfer {
    let mut transfer = Transfer {
        sender: sender.public.clone(),
        receiver: receiver.clone(),
        amount,
        time,
        signature: Default::default(),
    };
    transfer.signature = sender.sign(&transfer.signing_message());
    transfer
}

/// A stake delta signed in the domain its sign selects: the user's
/// secp256k1 key for deposits, the validator's Ed25519 key for
/// withdrawals.
pub fn mock_stake(
    user: &AccountKeyPair,
    validator: &ConsensusKeyPair,
    amount: Amount,
    time: Timestamp,
) -> Stake {
    let mut stake = Stake {
        user: user.public.clone(),
        validator: validator.public.clone(),
        amount,
        time,
        signature: Default::default(),
    };
    stake.signature = if amount >= 0 {
        user.sign(&stake.signing_message())
    } else {
        validator.sign(&stake.signing_message())
    };
    stake
}
