use thiserror::Error;

/// Reasons an RPC account payload could not be decoded
#[derive(Debug, Error)]
pub enum ClientError {
    /// The RPC node returned no account at the requested address.
    #[error("account not found")]
    AccountNotFound,

    /// The account was fetched with a binary encoding instead of `jsonParsed`.
    #[error("account data is not jsonParsed")]
    NotJsonParsed,

    /// The account belongs to a different program than the decoder expects.
    #[error("account was parsed by program `{actual}`, expected `{expected}`")]
    UnexpectedProgram {
        expected: &'static str,
        actual: String,
    },

    /// The parsed account type has no decoder.
    #[error("unsupported account type `{0}`")]
    UnsupportedAccountType(String),

    /// A field was present but its value could not be interpreted.
    #[error("invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("malformed RPC payload: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
