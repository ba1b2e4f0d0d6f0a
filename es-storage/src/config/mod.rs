//! Configuration and dependency wiring.

mod dependencies;
mod options;

pub use dependencies::{build_client, detect_version, Dependencies};
pub use options::EsOptions;
