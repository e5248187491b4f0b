//! Error types for the game core
//!
//! Only `InvalidState` is fatal. Missing collaborators and empty configuration
//! are logged by the operation that hits them and reported as skipped outcomes.

use thiserror::Error;

/// Errors raised by the game core
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state value outside the enumeration reached a transition
    #[error("invalid game state: {0}")]
    InvalidState(String),

    /// A required host collaborator was never attached
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A required configuration value was empty when an operation needed it
    #[error("empty required configuration: {0}")]
    EmptyConfiguration(&'static str),

    /// Scene name not present in the build manifest
    #[error("unknown scene '{0}'")]
    UnknownScene(String),

    #[error("settings parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether the error must stop the game loop
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::InvalidState(_))
    }
}
