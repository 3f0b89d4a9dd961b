use {
    crate::{
        error::{ClientError, Result},
        rpc::{parsed_account_data, ParsedAccount, UiInteger},
    },
    log::warn,
    resolution_stake_interface::stake_history::{StakeHistory, StakeHistoryEntry},
    serde::Deserialize,
    std::collections::HashSet,
};

const SYSVAR_PROGRAM: &str = "sysvar";
const STAKE_HISTORY_TYPE: &str = "stakeHistory";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiStakeHistoryEntry {
    epoch: UiInteger,
    stake_history: UiStakeHistoryValues,
}

#[derive(Deserialize)]
struct UiStakeHistoryValues {
    effective: UiInteger,
    activating: UiInteger,
    deactivating: UiInteger,
}

impl TryFrom<UiStakeHistoryValues> for StakeHistoryEntry {
    type Error = ClientError;

    fn try_from(values: UiStakeHistoryValues) -> Result<Self> {
        Ok(Self {
            effective: values.effective.to_u64("effective")?,
            activating: values.activating.to_u64("activating")?,
            deactivating: values.deactivating.to_u64("deactivating")?,
        })
    }
}

/// Decodes the stake history sysvar from a `jsonParsed` `getAccountInfo`
/// response body.
///
/// Entries may arrive in any order. If an epoch appears more than once the
/// last occurrence wins.
pub fn parse_stake_history(response: &str) -> Result<ParsedAccount<StakeHistory>> {
    let account = parsed_account_data(response, SYSVAR_PROGRAM)?;
    if account.state.account_type != STAKE_HISTORY_TYPE {
        return Err(ClientError::UnsupportedAccountType(
            account.state.account_type,
        ));
    }

    let entries: Vec<UiStakeHistoryEntry> = account.state.info()?;
    let mut seen = HashSet::with_capacity(entries.len());
    let mut stake_history = StakeHistory::default();
    for entry in entries {
        let epoch = entry.epoch.to_u64("epoch")?;
        if !seen.insert(epoch) {
            warn!("stake history lists epoch {epoch} more than once, keeping the last entry");
        }
        stake_history.add(epoch, entry.stake_history.try_into()?);
    }

    Ok(ParsedAccount {
        slot: account.slot,
        lamports: account.lamports,
        state: stake_history,
    })
}
