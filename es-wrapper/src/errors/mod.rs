//! Error types for the Elasticsearch wrapper.

mod engine_error;
mod wrapper_error;

pub use engine_error::EngineError;
pub use wrapper_error::WrapperError;
