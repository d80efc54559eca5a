pub mod chain;
pub mod codec;
pub mod interface;
pub mod message;

pub use chain::{BlockState, DataBlockChain};
pub use interface::Application;
