//! ─── DBC Protocol Constants ─────────────────────────────────────────────────
//!
//! Ticker:    DBCC
//! Base unit: sat  (1 DBCC = 100_000_000 sats)

/// 1 DBCC expressed in sats.
pub const DBCC_SATS: i64 = 100_000_000;

/// Upper bound on total sats in circulation. Mirrors the replication
/// engine's maximum total voting power, since staked sats are reported to
/// it one-to-one as voting power.
pub const SATS_SUPPLY: i64 = i64::MAX / 8;

/// Flat fee charged per fee-paying transaction (sats).
pub const TX_FEE: i64 = 7_700_000;

/// Convert whole DBCC to sats.
pub const fn to_sats(dbcc: i64) -> i64 {
    dbcc * DBCC_SATS
}
