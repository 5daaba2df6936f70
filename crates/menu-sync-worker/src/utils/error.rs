use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Platform request failed: {0}")]
    RemoteUnavailable(#[from] reqwest::Error),

    #[error("Platform rejected the call: {code} {message}")]
    Platform { code: i64, message: String },

    #[error("Menu nesting deeper than one level is not supported")]
    UnsupportedTreeShape,

    #[error("Unknown menu kind: {0}")]
    UnknownMenuKind(String),

    #[error("Malformed menu button: {0}")]
    MalformedButton(String),

    #[error("Malformed platform response: {0}")]
    MalformedResponse(String),

    #[error("Account not found: {0}")]
    AccountNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for SyncError {
    fn from(err: anyhow::Error) -> Self {
        SyncError::Unknown(err.to_string())
    }
}
