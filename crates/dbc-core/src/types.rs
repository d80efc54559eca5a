use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Token amount in sats (signed: stake deltas may be negative).
pub type Amount = i64;

/// Unix timestamp (seconds, UTC) supplied by transaction authors.
pub type Timestamp = i64;

/// Block height (monotonically increasing, incremented at every commit).
pub type Height = i64;

fn hex_serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

fn hex_deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s: String = Deserialize::deserialize(deserializer)?;
    hex::decode(&s).map_err(DeError::custom)
}

macro_rules! bytes_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub Vec<u8>);

        impl $name {
            pub fn new(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn to_hex(&self) -> String {
                hex::encode(&self.0)
            }

            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                Ok(Self(hex::decode(s)?))
            }
        }

        impl From<Vec<u8>> for $name {
            fn from(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }
        }

        impl From<&[u8]> for $name {
            fn from(bytes: &[u8]) -> Self {
                Self(bytes.to_vec())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({}b)"), self.0.len())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                hex_serialize(&self.0, serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                hex_deserialize(deserializer).map(Self)
            }
        }
    };
}

bytes_newtype! {
    /// Opaque byte string (descriptions, payload data, ZKP material).
    /// Lowercase hex on the JSON wire.
    Bytes
}

bytes_newtype! {
    /// secp256k1 public key in SEC1 encoding (33-byte compressed or
    /// 65-byte uncompressed). Identifies requirers, data-level validators,
    /// providers, acceptors and wallet owners.
    AccountKey
}

bytes_newtype! {
    /// 32-byte Ed25519 public key of a consensus validator.
    ConsensusKey
}

bytes_newtype! {
    /// Detached signature: DER-encoded for secp256k1, 64 raw bytes for
    /// Ed25519. Which domain applies is determined by the signed entity.
    SignatureBytes
}

// ── ValidatorAddress ─────────────────────────────────────────────────────────

/// 20-byte consensus validator address (truncated SHA-256 of the Ed25519
/// key), the identifier the replication engine reports block proposers by.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValidatorAddress(pub [u8; 20]);

impl ValidatorAddress {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ValidatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ValidatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValidatorAddress({})", self.to_hex())
    }
}

impl Serialize for ValidatorAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        hex_serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for ValidatorAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = hex_deserialize(deserializer)?;
        let mut addr = [0u8; 20];
        if bytes.len() != addr.len() {
            return Err(DeError::custom("validator address must be 20 bytes"));
        }
        addr.copy_from_slice(&bytes);
        Ok(Self(addr))
    }
}
