//! Pluggable networking traits.
//!
//! External crates implement these to provide data fetching and persistence.

use std::future::Future;
use std::pin::Pin;

use crate::models::types::Result;

/// Fetch raw bytes from a URL
///
/// Implementations make exactly one attempt per call and report any transport
/// failure or non-success status as `SiteError::DataUnavailable`.
pub trait DataFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;
}

/// Named-entry persistent storage
pub trait KeyValueStore: Send + Sync {
    /// Read an entry; `Ok(None)` when it was never written.
    fn load<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>>> + Send + 'a>>;

    /// Overwrite an entry with the given bytes.
    fn save<'a>(
        &'a self,
        key: &'a str,
        data: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
