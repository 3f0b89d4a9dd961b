//! Decoders that turn `jsonParsed` RPC account payloads into the types the
//! stake activation calculator works on.

mod accounts;
pub mod error;
pub mod rpc;

pub use {
    accounts::{
        parse_stake_account, parse_stake_history, Authorized, Lockup, Meta, Stake, StakeAccount,
    },
    error::{ClientError, Result},
    resolution_stake_interface as interface,
    rpc::ParsedAccount,
};
