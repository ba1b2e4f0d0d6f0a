//! # Elasticsearch Span Storage
//!
//! Startup wiring for the Elasticsearch span storage backend: reads the
//! connection options, settles the engine version and hands back a ready
//! [`es_wrapper::ClientWrapper`].

pub mod config;

pub use config::{Dependencies, EsOptions};

use thiserror::Error;

/// Errors that can occur while starting or stopping the storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Wrapper error.
    #[error("Wrapper error: {0}")]
    WrapperError(#[from] es_wrapper::WrapperError),

    /// Engine error.
    #[error("Engine error: {0}")]
    EngineError(#[from] es_wrapper::EngineError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StorageError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
