use dbc_core::types::{AccountKey, SignatureBytes};
use libsecp256k1::{Message, PublicKey, SecretKey, Signature};
use thiserror::Error;

use crate::hash::sha256;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secp256k1 secret key")]
    InvalidSecretKey,
}

/// Sign `message` with a secp256k1 secret key.
///
/// The message is SHA-256 digested first; the returned signature is
/// DER-serialized, matching what [`verify`] expects.
pub fn sign(secret_key: &SecretKey, message: &[u8]) -> SignatureBytes {
    let digest = Message::parse(&sha256(message));
    let (signature, _) = libsecp256k1::sign(&digest, secret_key);
    SignatureBytes(signature.serialize_der().as_ref().to_vec())
}

/// Verify a DER-encoded secp256k1 signature over SHA-256(`message`).
///
/// Any parse failure (malformed key, malformed signature) is reported as
/// an unverified signature, never as a distinct error.
pub fn verify(public_key: &AccountKey, message: &[u8], signature: &SignatureBytes) -> bool {
    let key = match PublicKey::parse_slice(&public_key.0, None) {
        Ok(key) => key,
        Err(_) => return false,
    };
    let signature = match Signature::parse_der(&signature.0) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    let digest = Message::parse(&sha256(message));
    libsecp256k1::verify(&digest, &signature, &key)
}

/// Check that `public_key` is a parseable SEC1 secp256k1 public key
/// (compressed or uncompressed).
pub fn check_key(public_key: &AccountKey) -> bool {
    PublicKey::parse_slice(&public_key.0, None).is_ok()
}

/// Parse a 32-byte secret key.
pub fn secret_key(bytes: &[u8; 32]) -> Result<SecretKey, KeyError> {
    SecretKey::parse(bytes).map_err(|_| KeyError::InvalidSecretKey)
}

/// The SEC1 compressed encoding of the public key for `secret`.
pub fn public_key(secret: &SecretKey) -> AccountKey {
    AccountKey(PublicKey::from_secret_key(secret).serialize_compressed().to_vec())
}
