use {
    crate::{
        error::{ClientError, Result},
        rpc::{parse_pubkey, parsed_account_data, ParsedAccount, UiInteger},
    },
    resolution_stake_interface::{
        stake_history::StakeHistoryGetEntry,
        state::{Delegation, StakeActivationState, StakeActivationStatus},
    },
    serde::{Deserialize, Serialize},
    solana_clock::{Epoch, UnixTimestamp},
    solana_pubkey::Pubkey,
};

const STAKE_PROGRAM: &str = "stake";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorized {
    pub staker: Pubkey,
    pub withdrawer: Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lockup {
    /// UnixTimestamp at which this stake will allow withdrawal, unless the
    ///   transaction is signed by the custodian
    pub unix_timestamp: UnixTimestamp,
    /// epoch height at which this stake will allow withdrawal, unless the
    ///   transaction is signed by the custodian
    pub epoch: Epoch,
    /// custodian signature on a transaction exempts the operation from
    ///  lockup constraints
    pub custodian: Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub rent_exempt_reserve: u64,
    pub authorized: Authorized,
    pub lockup: Lockup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stake {
    pub delegation: Delegation,
    /// credits observed is credits from vote account state when delegated or redeemed
    pub credits_observed: u64,
}

/// A stake account as rendered by the RPC node's `jsonParsed` encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "info")]
pub enum StakeAccount {
    Initialized(Meta),
    Delegated(Meta, Stake),
}

impl StakeAccount {
    pub fn meta(&self) -> &Meta {
        match self {
            Self::Initialized(meta) | Self::Delegated(meta, _) => meta,
        }
    }

    pub fn stake(&self) -> Option<&Stake> {
        match self {
            Self::Delegated(_meta, stake) => Some(stake),
            Self::Initialized(_meta) => None,
        }
    }

    pub fn delegation(&self) -> Option<&Delegation> {
        self.stake().map(|stake| &stake.delegation)
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, Self::Delegated(..))
    }

    /// Effective, activating, and deactivating stake as of `target_epoch`.
    /// An account that was never delegated has none of either.
    pub fn activation<T: StakeHistoryGetEntry + ?Sized>(
        &self,
        target_epoch: Epoch,
        history: &T,
    ) -> StakeActivationStatus {
        self.delegation()
            .map(|delegation| delegation.stake_activating_and_deactivating(target_epoch, history))
            .unwrap_or_default()
    }

    pub fn activation_state<T: StakeHistoryGetEntry + ?Sized>(
        &self,
        target_epoch: Epoch,
        history: &T,
    ) -> StakeActivationState {
        StakeActivationState::from(&self.activation(target_epoch, history))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiStakeAccount {
    meta: UiMeta,
    #[serde(default)]
    stake: Option<UiStake>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiMeta {
    rent_exempt_reserve: UiInteger,
    authorized: UiAuthorized,
    lockup: UiLockup,
}

#[derive(Deserialize)]
struct UiAuthorized {
    staker: String,
    withdrawer: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiLockup {
    unix_timestamp: UiInteger,
    epoch: UiInteger,
    custodian: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiStake {
    delegation: UiDelegation,
    credits_observed: UiInteger,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiDelegation {
    #[serde(alias = "voterPubkey")]
    voter: String,
    stake: UiInteger,
    activation_epoch: UiInteger,
    deactivation_epoch: UiInteger,
}

impl TryFrom<UiMeta> for Meta {
    type Error = ClientError;

    fn try_from(meta: UiMeta) -> Result<Self> {
        Ok(Self {
            rent_exempt_reserve: meta.rent_exempt_reserve.to_u64("rentExemptReserve")?,
            authorized: Authorized {
                staker: parse_pubkey(&meta.authorized.staker, "staker")?,
                withdrawer: parse_pubkey(&meta.authorized.withdrawer, "withdrawer")?,
            },
            lockup: Lockup {
                unix_timestamp: meta.lockup.unix_timestamp.to_i64("unixTimestamp")?,
                epoch: meta.lockup.epoch.to_u64("epoch")?,
                custodian: parse_pubkey(&meta.lockup.custodian, "custodian")?,
            },
        })
    }
}

impl TryFrom<UiStake> for Stake {
    type Error = ClientError;

    fn try_from(stake: UiStake) -> Result<Self> {
        let delegation = stake.delegation;
        Ok(Self {
            delegation: Delegation {
                voter_pubkey: parse_pubkey(&delegation.voter, "voter")?,
                stake: delegation.stake.to_u64("stake")?,
                activation_epoch: delegation.activation_epoch.to_u64("activationEpoch")?,
                deactivation_epoch: delegation.deactivation_epoch.to_u64("deactivationEpoch")?,
            },
            credits_observed: stake.credits_observed.to_u64("creditsObserved")?,
        })
    }
}

/// Decodes a stake account from a `jsonParsed` `getAccountInfo` response body.
pub fn parse_stake_account(response: &str) -> Result<ParsedAccount<StakeAccount>> {
    let account = parsed_account_data(response, STAKE_PROGRAM)?;
    let account_type = account.state.account_type.clone();
    let state = match account_type.as_str() {
        "initialized" => {
            let info: UiStakeAccount = account.state.info()?;
            StakeAccount::Initialized(info.meta.try_into()?)
        }
        "delegated" => {
            let info: UiStakeAccount = account.state.info()?;
            let stake = info.stake.ok_or_else(|| ClientError::InvalidField {
                field: "stake",
                reason: "missing from delegated account".to_string(),
            })?;
            StakeAccount::Delegated(info.meta.try_into()?, stake.try_into()?)
        }
        _ => return Err(ClientError::UnsupportedAccountType(account_type.clone())),
    };

    Ok(ParsedAccount {
        slot: account.slot,
        lamports: account.lamports,
        state,
    })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        assert_matches::assert_matches,
        resolution_stake_interface::stake_history::{StakeHistory, StakeHistoryEntry},
        serde_json::json,
    };

    const STAKER: &str = "Stake11111111111111111111111111111111111111";
    const VOTER: &str = "Vote111111111111111111111111111111111111111";

    fn stake_response(parsed: serde_json::Value) -> String {
        json!({
            "context": { "apiVersion": "2.1.0", "slot": 1234 },
            "value": {
                "data": { "program": "stake", "parsed": parsed, "space": 200 },
                "executable": false,
                "lamports": 1_002_282_880u64,
                "owner": "Stake11111111111111111111111111111111111111",
                "rentEpoch": 18446744073709551615u64,
            },
        })
        .to_string()
    }

    fn meta_json() -> serde_json::Value {
        json!({
            "authorized": { "staker": STAKER, "withdrawer": STAKER },
            "lockup": {
                "custodian": "11111111111111111111111111111111",
                "epoch": 0,
                "unixTimestamp": 0,
            },
            "rentExemptReserve": "2282880",
        })
    }

    fn delegated_json(deactivation_epoch: &str) -> serde_json::Value {
        json!({
            "type": "delegated",
            "info": {
                "meta": meta_json(),
                "stake": {
                    "creditsObserved": 17,
                    "delegation": {
                        "activationEpoch": "10",
                        "deactivationEpoch": deactivation_epoch,
                        "stake": "1000000000",
                        "voter": VOTER,
                        "warmupCooldownRate": 0.25,
                    },
                },
            },
        })
    }

    #[test]
    fn test_parse_delegated() {
        let account = parse_stake_account(&stake_response(delegated_json(
            "18446744073709551615",
        )))
        .unwrap();
        assert_eq!(account.slot, 1234);
        assert_eq!(account.lamports, 1_002_282_880);
        assert!(account.state.is_delegated());
        assert_eq!(account.state.meta().rent_exempt_reserve, 2_282_880);
        assert_eq!(account.state.meta().lockup.custodian, Pubkey::default());

        let delegation = account.state.delegation().unwrap();
        assert_eq!(delegation.voter_pubkey.to_string(), VOTER);
        assert_eq!(delegation.stake, 1_000_000_000);
        assert_eq!(delegation.activation_epoch, 10);
        assert!(!delegation.is_deactivated());
        assert_eq!(account.state.stake().unwrap().credits_observed, 17);
    }

    #[test]
    fn test_parse_initialized() {
        let account =
            parse_stake_account(&stake_response(json!({ "type": "initialized", "info": {
                "meta": meta_json(),
                "stake": null,
            }})))
            .unwrap();
        assert!(!account.state.is_delegated());
        assert_eq!(account.state.delegation(), None);
        assert_eq!(
            account.state.activation(100, &StakeHistory::default()),
            StakeActivationStatus::default()
        );
        assert_eq!(
            account.state.activation_state(100, &StakeHistory::default()),
            StakeActivationState::Inactive
        );
    }

    #[test]
    fn test_delegated_without_stake() {
        let body = stake_response(json!({ "type": "delegated", "info": { "meta": meta_json() } }));
        assert_matches!(
            parse_stake_account(&body),
            Err(ClientError::InvalidField { field: "stake", .. })
        );
    }

    #[test]
    fn test_uninitialized_is_unsupported() {
        let body = stake_response(json!({ "type": "uninitialized" }));
        assert_matches!(
            parse_stake_account(&body),
            Err(ClientError::UnsupportedAccountType(account_type)) if account_type == "uninitialized"
        );
    }

    #[test]
    fn test_bad_voter() {
        let mut parsed = delegated_json("18446744073709551615");
        parsed["info"]["stake"]["delegation"]["voter"] = json!("nope");
        assert_matches!(
            parse_stake_account(&stake_response(parsed)),
            Err(ClientError::InvalidField { field: "voter", .. })
        );
    }

    #[test]
    fn test_activation_from_parsed_account() {
        let account = parse_stake_account(&stake_response(delegated_json("12"))).unwrap();
        let stake_history: StakeHistory = (10..12)
            .map(|epoch| {
                (
                    epoch,
                    StakeHistoryEntry {
                        effective: 100_000_000_000,
                        activating: 1_000_000_000,
                        deactivating: 1_000_000_000,
                    },
                )
            })
            .collect();

        assert_eq!(
            account.state.activation_state(10, &stake_history),
            StakeActivationState::Activating
        );
        assert_eq!(
            account.state.activation(11, &stake_history),
            StakeActivationStatus::with_effective(1_000_000_000)
        );
        assert_eq!(
            account.state.activation_state(12, &stake_history),
            StakeActivationState::Deactivating
        );
        // epoch 12 was never recorded, so cooldown settles
        assert_eq!(
            account.state.activation(13, &stake_history),
            StakeActivationStatus::default()
        );
        assert!(account.state.delegation().unwrap().is_deactivation_reached(12));
    }

    #[test]
    fn test_serialize_for_display() {
        let account = parse_stake_account(&stake_response(delegated_json("12"))).unwrap();
        let value = serde_json::to_value(account.state).unwrap();
        assert_eq!(value["type"], "delegated");
        assert_eq!(value["info"][0]["rentExemptReserve"], 2_282_880);
        assert_eq!(value["info"][1]["creditsObserved"], 17);
    }
}
