//! Error types shared across the A2P workspace

use thiserror::Error;

/// Result type alias for A2P operations
pub type Result<T> = std::result::Result<T, A2pError>;

/// Main error type for A2P
///
/// These are the batch-level failures. Anything that goes wrong for a single
/// row is recorded on that row instead and never surfaces here.
#[derive(Error, Debug)]
pub enum A2pError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Header mismatch at column {position}: found '{found}', expected '{expected}'")]
    HeaderMismatch {
        position: usize,
        found: String,
        expected: String,
    },

    #[error("Header has {found} columns, expected {expected}")]
    HeaderLength { found: usize, expected: usize },
}

impl A2pError {
    /// Whether this error comes from validating the checkpoint header
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::HeaderMismatch { .. } | Self::HeaderLength { .. })
    }
}
