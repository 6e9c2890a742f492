use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use larder_sites::{KeyValueStore, Result, SiteError};

/// Process-lifetime storage. Used when no database can be opened, and in tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>>> + Send + 'a>> {
        let entry = self
            .entries
            .lock()
            .map(|entries| entries.get(key).cloned())
            .map_err(|_| SiteError::Storage("memory store poisoned".into()));
        Box::pin(async move { entry })
    }

    fn save<'a>(
        &'a self,
        key: &'a str,
        data: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        let result = self
            .entries
            .lock()
            .map(|mut entries| {
                entries.insert(key.to_owned(), data.to_vec());
            })
            .map_err(|_| SiteError::Storage("memory store poisoned".into()));
        Box::pin(async move { result })
    }
}
