pub mod balance;
pub mod dataset;

pub use balance::{Balance, Confirm, Fee, Reward, RewardInfo, RewardState, Stake, Transfer};
pub use dataset::{AcceptedPayload, Data, Dataset, Description, Validation, Version};
