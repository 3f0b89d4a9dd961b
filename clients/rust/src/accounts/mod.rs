mod stake_account;
mod stake_history;

pub use {
    stake_account::{parse_stake_account, Authorized, Lockup, Meta, Stake, StakeAccount},
    stake_history::parse_stake_history,
};
