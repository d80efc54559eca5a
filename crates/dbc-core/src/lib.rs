pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::StateError;
pub use types::*;
