//! Wrapper error types.

use thiserror::Error;

use crate::errors::EngineError;

/// Errors returned by the dispatcher and its capability adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WrapperError {
    /// The requested engine major version is not one of 5, 6 or 7.
    #[error("Unsupported Elasticsearch version: {0}")]
    UnsupportedVersion(u8),

    /// An engine failure, passed through untouched.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Flushing or releasing the bulk buffer failed during shutdown.
    #[error("Failed to close bulk buffer: {0}")]
    Close(EngineError),
}

impl WrapperError {
    /// Create an unsupported version error.
    pub fn unsupported_version(version: u8) -> Self {
        Self::UnsupportedVersion(version)
    }

    /// The engine error carried by this error, if any.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Engine(e) | Self::Close(e) => Some(e),
            Self::UnsupportedVersion(_) => None,
        }
    }
}
