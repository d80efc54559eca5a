use dbc_core::types::{ConsensusKey, SignatureBytes, ValidatorAddress};
use ed25519_dalek::{ExpandedSecretKey, PublicKey, SecretKey, Signature, Verifier};
use thiserror::Error;

use crate::hash::sha256;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid Ed25519 secret key seed")]
    InvalidSeed,
}

/// Sign `message` with an Ed25519 secret key seed (32 bytes).
///
/// Unlike the secp256k1 domain, the message is signed raw: Ed25519 hashes
/// internally and the two signing domains must stay distinguishable.
pub fn sign(seed: &[u8], message: &[u8]) -> Result<SignatureBytes, KeyError> {
    let secret = SecretKey::from_bytes(seed).map_err(|_| KeyError::InvalidSeed)?;
    let public = PublicKey::from(&secret);
    let signature = ExpandedSecretKey::from(&secret).sign(message, &public);
    Ok(SignatureBytes(signature.to_bytes().to_vec()))
}

/// Verify a 64-byte Ed25519 signature over the raw `message`.
/// Any parse failure yields `false`.
pub fn verify(public_key: &ConsensusKey, message: &[u8], signature: &SignatureBytes) -> bool {
    let key = match PublicKey::from_bytes(&public_key.0) {
        Ok(key) => key,
        Err(_) => return false,
    };
    let signature = match Signature::try_from(signature.0.as_slice()) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    key.verify(message, &signature).is_ok()
}

/// Check that `public_key` is a valid 32-byte Ed25519 point encoding.
pub fn check_key(public_key: &ConsensusKey) -> bool {
    PublicKey::from_bytes(&public_key.0).is_ok()
}

/// Derive the 20-byte consensus address of a validator key: the first 20
/// bytes of SHA-256 of the raw public key, the replication engine's own
/// derivation.
pub fn address(public_key: &ConsensusKey) -> ValidatorAddress {
    let digest = sha256(&public_key.0);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&digest[..20]);
    ValidatorAddress(addr)
}
