//! Base64 frame decoding for transaction and query envelopes.
//!
//! The consensus engine hands frames through verbatim; submitters wrap
//! their JSON in standard base64, and some pad the buffer, so trailing NUL
//! bytes after decoding are trimmed before parsing. Decoding never fails
//! upward: an undecodable transaction is dropped, an undecodable query
//! selects nothing.

use tracing::debug;

use crate::message::{QueryEnvelope, Transaction, TransactionEnvelope};

/// Wrap a JSON-serializable envelope in a base64 frame: the submitter
/// side of [`decode_frame`], used by wallets and tests.
pub fn encode_frame<T: serde::Serialize>(envelope: &T) -> Vec<u8> {
    let json = serde_json::to_vec(envelope).expect("envelope serialization is infallible");
    base64::encode(json).into_bytes()
}

/// Strip the base64 framing from `raw` and trim trailing NUL padding.
pub fn decode_frame(raw: &[u8]) -> Option<Vec<u8>> {
    let mut bytes = base64::decode(raw).ok()?;
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    Some(bytes)
}

/// Decode one transaction frame. `None` means the frame was not base64 or
/// not a JSON envelope; unknown tags still decode (to the inert arm).
pub fn decode_transaction(raw: &[u8]) -> Option<Transaction> {
    let bytes = decode_frame(raw)?;
    let envelope: TransactionEnvelope = match serde_json::from_slice(&bytes) {
        Ok(envelope) => envelope,
        Err(err) => {
            debug!(%err, "dropping undecodable transaction envelope");
            return None;
        }
    };
    Some(envelope.into_transaction())
}

/// Decode one query frame.
pub fn decode_query(raw: &[u8]) -> Option<QueryEnvelope> {
    let bytes = decode_frame(raw)?;
    match serde_json::from_slice(&bytes) {
        Ok(envelope) => Some(envelope),
        Err(err) => {
            debug!(%err, "unparseable query envelope");
            None
        }
    }
}
