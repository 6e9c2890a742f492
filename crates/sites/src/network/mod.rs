//! Pluggable networking and storage.

pub mod traits;

pub use traits::{DataFetcher, KeyValueStore};
