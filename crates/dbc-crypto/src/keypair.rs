use dbc_core::types::{AccountKey, ConsensusKey, SignatureBytes};
use ed25519_dalek::{PublicKey, SecretKey};
use libsecp256k1::SecretKey as Secp256k1SecretKey;

use crate::hash::sha256;
use crate::{ecdsa, eddsa};

/// A secp256k1 account keypair.
///
/// Keys are derived deterministically from a seed string: the secret key is
/// SHA-256 of the seed, re-hashed in the negligible case the digest falls
/// outside the curve order. Key file loading and RNG-backed generation are
/// the embedding node's concern.
pub struct AccountKeyPair {
    pub public: AccountKey,
    secret: Secp256k1SecretKey,
}

impl AccountKeyPair {
    pub fn from_seed(seed: &str) -> Self {
        let mut digest = sha256(seed.as_bytes());
        let secret = loop {
            match ecdsa::secret_key(&digest) {
                Ok(secret) => break secret,
                Err(_) => digest = sha256(&digest),
            }
        };
        Self {
            public: ecdsa::public_key(&secret),
            secret,
        }
    }

    /// Sign `message` (SHA-256 pre-hash, DER signature).
    pub fn sign(&self, message: &[u8]) -> SignatureBytes {
        ecdsa::sign(&self.secret, message)
    }
}

impl std::fmt::Debug for AccountKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountKeyPair {{ public: {:?} }}", self.public)
    }
}

/// An Ed25519 consensus validator keypair, derived like [`AccountKeyPair`].
pub struct ConsensusKeyPair {
    pub public: ConsensusKey,
    seed: [u8; 32],
}

impl ConsensusKeyPair {
    pub fn from_seed(seed: &str) -> Self {
        let digest = sha256(seed.as_bytes());
        let secret = SecretKey::from_bytes(&digest).expect("32-byte seed is always a valid key");
        Self {
            public: ConsensusKey(PublicKey::from(&secret).to_bytes().to_vec()),
            seed: digest,
        }
    }

    /// Sign the raw `message` (no pre-hash; Ed25519 domain).
    pub fn sign(&self, message: &[u8]) -> SignatureBytes {
        eddsa::sign(&self.seed, message).expect("seed validated at construction")
    }
}

impl std::fmt::Debug for ConsensusKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ConsensusKeyPair {{ public: {:?} }}", self.public)
    }
}
