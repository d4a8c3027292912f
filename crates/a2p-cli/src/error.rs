//! Error types for the A2P CLI
//!
//! Every message is user-facing and ends with what to do next.

use a2p_common::A2pError;
use a2p_engine::RemoteError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// The checkpoint file could not be read, validated or written
    #[error("Checkpoint error: {0}.{hint}", hint = checkpoint_hint(.0))]
    Checkpoint(#[from] A2pError),

    /// A call made outside any row failed (client setup)
    #[error("Remote service error: {0}. Check TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and any host overrides.")]
    Remote(#[from] RemoteError),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// Refusing to replace an existing file
    #[error("File already exists: '{0}'. Use --force to overwrite it.")]
    AlreadyExists(String),
}

fn checkpoint_hint(err: &A2pError) -> &'static str {
    if err.is_validation() {
        " Compare the file header with the one 'a2p init' writes."
    } else {
        " Check the path and file permissions."
    }
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an already-exists error
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists(path.into())
    }
}
