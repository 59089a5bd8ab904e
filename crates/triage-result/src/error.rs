use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultError {
    #[error("read validation result {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("validation result is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation result has no findings array")]
    MissingFindings,
}
