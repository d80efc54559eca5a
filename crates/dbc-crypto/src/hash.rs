use sha2::{Digest, Sha256};

/// Compute SHA-256 of arbitrary bytes → 32-byte array.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 of the empty byte string: the stand-in hash for empty optional
/// substructures in the content-hash tree.
pub fn empty_hash() -> [u8; 32] {
    sha256(&[])
}
