//! Dispatcher and per-capability adapters.

mod client;
mod index;
mod indices;
mod search;

pub use client::ClientWrapper;
pub use index::IndexAdapter;
pub use indices::{IndicesCreateAdapter, IndicesExistsAdapter};
pub use search::{MultiSearchAdapter, SearchAdapter};
