//! Error types for reports and the route store.

use thiserror::Error;

/// Failures talking to the route store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("malformed store data: {0}")]
    Malformed(String),
}

/// Errors surfaced by the reporters.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("could not parse {0} as ip address or prefix")]
    InvalidPrefix(String),

    #[error("no prefix found for {0}")]
    NotFound(String),

    #[error("route store query failed: {0}")]
    Upstream(#[from] StoreError),
}
