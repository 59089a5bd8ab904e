use thiserror::Error;

/// Why a session file was refused. A refused import changes nothing.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file is not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("not a review session (type {found:?})")]
    WrongType { found: Option<String> },

    #[error("session file contains no validation result")]
    MissingResult,

    #[error("session file is malformed: {0}")]
    Malformed(String),
}
