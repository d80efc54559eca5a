pub mod ecdsa;
pub mod eddsa;
pub mod hash;
pub mod keypair;

pub use hash::sha256;
pub use keypair::{AccountKeyPair, ConsensusKeyPair};
