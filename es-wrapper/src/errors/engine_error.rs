//! Engine error types.
//!
//! Failures raised by the underlying engine clients and bulk buffers. The
//! wrapper never reclassifies these; they reach callers as-is.

use thiserror::Error;

/// Errors surfaced by an underlying engine client or bulk buffer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The HTTP transport failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The engine answered with a non-success status code.
    #[error("Engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The engine response could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A bulk commit was accepted but some items were rejected.
    #[error("Bulk request had {failed} failed items out of {total}")]
    BulkItems { failed: usize, total: usize },

    /// The bulk buffer has been closed and no longer accepts requests.
    #[error("Bulk buffer is closed")]
    BulkClosed,
}

impl EngineError {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Whether the engine reported the requested resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
