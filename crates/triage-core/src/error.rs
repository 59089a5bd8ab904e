use thiserror::Error;

use crate::{FindingId, Status};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("unknown finding: {0}")]
    UnknownFinding(FindingId),

    #[error("no finding at position {0}")]
    IndexOutOfRange(usize),

    #[error("unknown group: {0}")]
    UnknownGroup(String),

    #[error("a bulk edit to {status} for {target} is still awaiting confirmation")]
    ConfirmationPending { target: FindingId, status: Status },

    #[error("no bulk edit is awaiting confirmation")]
    NothingPending,

    #[error("chat message is empty")]
    EmptyMessage,
}
