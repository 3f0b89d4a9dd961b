//! The `getAccountInfo` response envelope, as returned with `jsonParsed`
//! encoding.

use {
    crate::error::{ClientError, Result},
    log::debug,
    serde::{de::DeserializeOwned, Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::str::FromStr,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcResponseContext {
    pub slot: u64,
    #[serde(default)]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcResponse<T> {
    pub context: RpcResponseContext,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiAccount {
    pub lamports: u64,
    pub data: UiAccountData,
    pub owner: String,
    pub executable: bool,
    #[serde(default)]
    pub rent_epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UiAccountData {
    Json(ParsedAccountData),
    /// `[data, encoding]`
    Binary(String, String),
    LegacyBinary(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedAccountData {
    pub program: String,
    pub parsed: serde_json::Value,
    pub space: u64,
}

/// `{ "type": ..., "info": ... }`, the shape every parsed account shares.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ParsedAccountType {
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub info: serde_json::Value,
}

impl ParsedAccountType {
    pub fn info<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.info)?)
    }
}

/// A decoded account together with where and when it was observed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAccount<T> {
    /// Slot the RPC node answered at.
    pub slot: u64,
    pub lamports: u64,
    pub state: T,
}

/// Unwraps a `getAccountInfo` response down to its parsed payload, checking
/// that the account exists and was parsed by `expected_program`.
pub(crate) fn parsed_account_data(
    response: &str,
    expected_program: &'static str,
) -> Result<ParsedAccount<ParsedAccountType>> {
    let response: RpcResponse<Option<UiAccount>> = serde_json::from_str(response)?;
    let account = response.value.ok_or(ClientError::AccountNotFound)?;
    let UiAccountData::Json(data) = account.data else {
        return Err(ClientError::NotJsonParsed);
    };
    if data.program != expected_program {
        return Err(ClientError::UnexpectedProgram {
            expected: expected_program,
            actual: data.program,
        });
    }
    let state: ParsedAccountType = serde_json::from_value(data.parsed)?;
    debug!(
        "decoded {} account of type `{}` at slot {}",
        expected_program, state.account_type, response.context.slot
    );
    Ok(ParsedAccount {
        slot: response.context.slot,
        lamports: account.lamports,
        state,
    })
}

/// Integers the RPC node renders either as JSON numbers or, for amounts that
/// may exceed what JavaScript can represent, as decimal strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum UiInteger {
    Unsigned(u64),
    Signed(i64),
    String(String),
}

impl UiInteger {
    pub fn to_u64(&self, field: &'static str) -> Result<u64> {
        match self {
            Self::Unsigned(value) => Ok(*value),
            Self::Signed(value) => u64::try_from(*value).map_err(|err| invalid(field, err)),
            Self::String(value) => value.parse().map_err(|err| invalid(field, err)),
        }
    }

    pub fn to_i64(&self, field: &'static str) -> Result<i64> {
        match self {
            Self::Unsigned(value) => i64::try_from(*value).map_err(|err| invalid(field, err)),
            Self::Signed(value) => Ok(*value),
            Self::String(value) => value.parse().map_err(|err| invalid(field, err)),
        }
    }
}

pub(crate) fn parse_pubkey(value: &str, field: &'static str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|err| invalid(field, err))
}

fn invalid(field: &'static str, err: impl std::fmt::Display) -> ClientError {
    ClientError::InvalidField {
        field,
        reason: err.to_string(),
    }
}
