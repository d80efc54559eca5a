use dbc_core::constants::{to_sats, TX_FEE};
use dbc_core::error::StateError;
use dbc_core::types::{Bytes, Timestamp, ValidatorAddress};
use dbc_crypto::{eddsa, sha256};
use dbc_state::{Confirm, Fee, RewardInfo};
use dbc_testkit::{actors, genesis_balance, mock_stake, mock_transfer, Actors};

const NOW: Timestamp = 1_590_000_000;

#[test]
fn genesis_seeds_wallets_and_empty_histories() {
    let actors = actors();
    let balance = genesis_balance(&actors);
    assert_eq!(balance.user_balance(&actors.requirer.public), to_sats(25));
    assert_eq!(balance.user_balance(&actors.provider.public), to_sats(10));
    assert_eq!(balance.validator_stake(&actors.consensus.public), to_sats(30));
    assert!(balance.transfers.is_empty() && balance.fees.is_empty());
    assert_eq!(balance.hash(), sha256(&[]));
    // Genesis validators are reachable through their consensus address.
    let addr = eddsa::address(&actors.consensus.public);
    assert_eq!(balance.val_addr.get(&addr), Some(&actors.consensus.public));
}

#[test]
fn transfer_moves_sats_and_extends_hash() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    let transfer = mock_transfer(&actors.acceptor, &actors.requirer.public, to_sats(2), NOW);
    balance.add_transfer(transfer.clone()).unwrap();

    assert_eq!(balance.user_balance(&actors.acceptor.public), to_sats(13));
    assert_eq!(balance.user_balance(&actors.requirer.public), to_sats(27));
    assert_eq!(balance.hash(), sha256(&transfer.hash()));
}

#[test]
fn transfer_rejects_negative_and_overdraft() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);

    let negative = mock_transfer(&actors.acceptor, &actors.requirer.public, -1, NOW);
    assert_eq!(
        balance.add_transfer(negative),
        Err(StateError::NegativeAmount(-1))
    );

    let overdraft = mock_transfer(&actors.acceptor, &actors.requirer.public, to_sats(16), NOW);
    assert_eq!(
        balance.add_transfer(overdraft),
        Err(StateError::InsufficientBalance {
            need: to_sats(16),
            have: to_sats(15),
        })
    );
    assert!(balance.transfers.is_empty());
}

#[test]
fn transfer_rejects_foreign_signature() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    // Signed by the provider, claims to be from the acceptor.
    let mut transfer = mock_transfer(&actors.provider, &actors.requirer.public, 5, NOW);
    transfer.sender = actors.acceptor.public.clone();
    assert_eq!(balance.add_transfer(transfer), Err(StateError::BadSignature));
}

#[test]
fn stake_and_unstake_use_their_own_signing_domains() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);

    let stake = mock_stake(&actors.provider, &actors.consensus, to_sats(3), NOW);
    balance.add_stake(stake.clone()).unwrap();
    assert_eq!(balance.user_balance(&actors.provider.public), to_sats(7));
    assert_eq!(balance.validator_stake(&actors.consensus.public), to_sats(33));
    assert_eq!(balance.hash(), sha256(&stake.hash()));

    let unstake = mock_stake(&actors.provider, &actors.consensus, to_sats(-5), NOW);
    balance.add_stake(unstake.clone()).unwrap();
    assert_eq!(balance.user_balance(&actors.provider.public), to_sats(12));
    assert_eq!(balance.validator_stake(&actors.consensus.public), to_sats(28));
    assert_eq!(
        balance.hash(),
        sha256(&[stake.hash(), unstake.hash()].concat())
    );
}

#[test]
fn unstake_rejects_wrong_domain_signature() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    // A withdrawal signed by the user instead of the validator.
    let mut unstake = mock_stake(&actors.provider, &actors.consensus, to_sats(-5), NOW);
    unstake.signature = actors.provider.sign(&unstake.signing_message());
    assert_eq!(balance.add_stake(unstake), Err(StateError::BadSignature));
}

#[test]
fn unstake_cannot_drain_beyond_pool() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    let unstake = mock_stake(&actors.provider, &actors.consensus, to_sats(-31), NOW);
    assert_eq!(
        balance.add_stake(unstake),
        Err(StateError::InsufficientBalance {
            need: to_sats(31),
            have: to_sats(30),
        })
    );
}

#[test]
fn stake_registers_address_and_delta() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    balance
        .add_stake(mock_stake(&actors.provider, &actors.consensus, to_sats(3), NOW))
        .unwrap();

    let addr = eddsa::address(&actors.consensus.public);
    assert_eq!(balance.val_addr.get(&addr), Some(&actors.consensus.public));
    assert_eq!(
        balance.validator_updates(),
        vec![(actors.consensus.public.clone(), to_sats(33))]
    );
    // A fresh block starts with a clean delta set.
    assert!(balance.next_block().validator_updates().is_empty());
}

fn reward_info(actors: &Actors) -> RewardInfo {
    RewardInfo {
        requirer: actors.requirer.public.clone(),
        validator: actors.validator.public.clone(),
        acceptor: actors.acceptor.public.clone(),
        validator_amount: 1,
        provider_amount: 5,
        acceptor_amount: 2,
        max_confirms: 3,
    }
}

#[test]
fn reward_escrows_then_releases_per_confirm() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    let info = reward_info(&actors);
    let requirer_before = balance.user_balance(&actors.requirer.public);

    let index = balance.add_reward(info.clone()).unwrap();
    assert_eq!(index, 0);
    assert_eq!(
        balance.user_balance(&actors.requirer.public),
        requirer_before - 8 * 3
    );

    let confirm = Confirm {
        provider: actors.provider.public.clone(),
    };
    balance.confirm_reward(confirm, index).unwrap();
    assert_eq!(balance.user_balance(&actors.validator.public), to_sats(5) + 1);
    assert_eq!(balance.user_balance(&actors.provider.public), to_sats(10) + 5);
    assert_eq!(balance.user_balance(&actors.acceptor.public), to_sats(15) + 2);
}

#[test]
fn reward_with_negative_terms_cannot_mint() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);

    let mut negative_bound = reward_info(&actors);
    negative_bound.max_confirms = -3;
    assert_eq!(
        balance.add_reward(negative_bound),
        Err(StateError::NegativeAmount(-3))
    );

    let mut negative_tranche = reward_info(&actors);
    negative_tranche.provider_amount = -20;
    // tranche = 1 - 20 + 2 = -17, escrow = -17 * 3.
    assert_eq!(
        balance.add_reward(negative_tranche),
        Err(StateError::NegativeAmount(-51))
    );

    assert!(balance.rewards.is_empty());
    assert_eq!(balance.user_balance(&actors.requirer.public), to_sats(25));
}

#[test]
fn close_refunds_unconfirmed_tranches() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    let requirer_before = balance.user_balance(&actors.requirer.public);
    let index = balance.add_reward(reward_info(&actors)).unwrap();
    balance
        .confirm_reward(
            Confirm {
                provider: actors.provider.public.clone(),
            },
            index,
        )
        .unwrap();

    balance.close_reward(index).unwrap();
    // One tranche spent, two refunded.
    assert_eq!(
        balance.user_balance(&actors.requirer.public),
        requirer_before - 8
    );
    assert_eq!(balance.close_reward(index), Err(StateError::RewardClosed));
    assert_eq!(
        balance.confirm_reward(
            Confirm {
                provider: actors.provider.public.clone()
            },
            index,
        ),
        Err(StateError::RewardClosed)
    );
}

#[test]
fn confirms_are_bounded() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    let mut info = reward_info(&actors);
    info.max_confirms = 1;
    let index = balance.add_reward(info).unwrap();
    let confirm = Confirm {
        provider: actors.provider.public.clone(),
    };
    balance.confirm_reward(confirm.clone(), index).unwrap();
    assert_eq!(
        balance.confirm_reward(confirm, index),
        Err(StateError::ConfirmsExhausted(1))
    );
}

#[test]
fn reward_hash_covers_terms_and_confirms() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    let index = balance.add_reward(reward_info(&actors)).unwrap();

    let mut expected = actors.requirer.public.0.clone();
    expected.extend_from_slice(&actors.validator.public.0);
    expected.extend_from_slice(&actors.acceptor.public.0);
    expected.extend_from_slice(b"152");
    expected.extend_from_slice(b"3");
    assert_eq!(balance.rewards[index].hash(), sha256(&expected));
    assert_eq!(balance.hash(), sha256(&balance.rewards[index].hash()));

    let before = balance.hash();
    balance
        .confirm_reward(
            Confirm {
                provider: actors.provider.public.clone(),
            },
            index,
        )
        .unwrap();
    expected.extend_from_slice(&actors.provider.public.0);
    assert_eq!(balance.rewards[index].hash(), sha256(&expected));
    assert_ne!(balance.hash(), before);
}

#[test]
fn fee_flows_from_user_to_validator() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    let fee = Fee {
        user: actors.requirer.public.clone(),
        validator_addr: eddsa::address(&actors.consensus.public),
        tx_hash: Bytes(sha256(b"some transaction bytes").to_vec()),
    };
    balance.add_fee(fee.clone()).unwrap();

    assert_eq!(
        balance.user_balance(&actors.requirer.public),
        to_sats(25) - TX_FEE
    );
    assert_eq!(
        balance.validator_stake(&actors.consensus.public),
        to_sats(30) + TX_FEE
    );
    assert_eq!(balance.hash(), sha256(&fee.hash()));
}

#[test]
fn fee_with_unknown_address_is_rejected() {
    let actors = actors();
    let mut balance = genesis_balance(&actors);
    let fee = Fee {
        user: actors.requirer.public.clone(),
        validator_addr: ValidatorAddress([7u8; 20]),
        tx_hash: Bytes::default(),
    };
    assert_eq!(balance.add_fee(fee), Err(StateError::NotFound));
    assert!(balance.fees.is_empty());
}
