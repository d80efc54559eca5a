use thiserror::Error;

/// Validation failures raised by the Dataset and Balance engines.
///
/// Every variant is local to the transaction that caused it: the block
/// state machine drops the offending transaction and the block proceeds.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    // ── Keys and signatures ──────────────────────────────────────────────────
    #[error("public key failed to parse")]
    InvalidKey,

    #[error("signature verification failed")]
    BadSignature,

    // ── Amounts and balances ─────────────────────────────────────────────────
    #[error("amount must not be negative: got {0}")]
    NegativeAmount(i64),

    #[error("insufficient balance: need {need} sats, have {have}")]
    InsufficientBalance { need: i64, have: i64 },

    // ── Dataset preconditions ────────────────────────────────────────────────
    #[error("proof is not the preimage of the committed validation info")]
    BadProof,

    #[error("address is not the designated validator")]
    NotValidator,

    #[error("address is not the designated acceptor")]
    NotAcceptor,

    #[error("slot is already populated")]
    AlreadyExists,

    // ── Bounds and lifecycle ─────────────────────────────────────────────────
    #[error("version limit reached: max {0}")]
    VersionsExhausted(i64),

    #[error("confirmation limit reached: max {0}")]
    ConfirmsExhausted(i64),

    #[error("reward is already closed")]
    RewardClosed,

    #[error("index out of range")]
    NotFound,
}
