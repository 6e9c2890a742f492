//! User-favorited sites, mirrored to persistent storage.
//!
//! The in-memory set is authoritative for the session. Every toggle rewrites the
//! whole persisted entry; a failed write is logged and leaves memory as toggled.

mod memory;
mod sqlite;

use std::sync::Arc;

use larder_sites::prelude::*;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage entry holding the serialized favorites list.
pub const FAVORITES_KEY: &str = "favoritedFoodBanks";

/// Favorited site names in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FavoriteSet {
    names: Vec<SiteIdentifier>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &SiteIdentifier) -> bool {
        self.names.contains(id)
    }

    /// Flip membership; returns whether the site is now a favorite.
    pub fn toggle(&mut self, id: &SiteIdentifier) -> bool {
        if let Some(index) = self.names.iter().position(|name| name == id) {
            self.names.remove(index);
            false
        } else {
            self.names.push(id.clone());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Serialize as a JSON array of names.
    pub fn to_json(&self) -> Vec<u8> {
        let names: Vec<&str> = self.names.iter().map(SiteIdentifier::as_str).collect();
        // A list of strings always serializes
        serde_json::to_vec(&names).unwrap_or_else(|_| b"[]".to_vec())
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let names: Vec<String> = serde_json::from_slice(bytes)
            .map_err(|e| SiteError::InvalidData(format!("favorites entry: {e}")))?;

        let mut set = Self::new();
        for name in names {
            let id = SiteIdentifier::new(name);
            if !set.contains(&id) {
                set.names.push(id);
            }
        }
        Ok(set)
    }
}

impl<'a> FromIterator<&'a str> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            let id = SiteIdentifier::new(name);
            if !set.contains(&id) {
                set.names.push(id);
            }
        }
        set
    }
}

/// Outcome of [`FavoritesStore::toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Toggled {
    pub favorited: bool,
    pub persisted: bool,
}

/// Sole writer of the favorite set.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    favorites: FavoriteSet,
}

impl FavoritesStore {
    /// Read the persisted set. A missing or unreadable entry yields an empty set.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let favorites = match storage.load(FAVORITES_KEY).await {
            Ok(Some(bytes)) => FavoriteSet::from_json(&bytes).unwrap_or_else(|e| {
                tracing::error!(error = %e, "discarding corrupt favorites");
                FavoriteSet::new()
            }),
            Ok(None) => FavoriteSet::new(),
            Err(e) => {
                tracing::error!(error = %e, "could not load favorites");
                FavoriteSet::new()
            }
        };

        tracing::debug!(count = favorites.len(), "loaded favorites");
        Self { storage, favorites }
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn is_favorite(&self, id: &SiteIdentifier) -> bool {
        self.favorites.contains(id)
    }

    /// Flip a site's membership and persist the full set.
    pub async fn toggle(&mut self, id: &SiteIdentifier) -> Toggled {
        let favorited = self.favorites.toggle(id);

        let persisted = match self.storage.save(FAVORITES_KEY, &self.favorites.to_json()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(site = %id, error = %e, "could not save favorites");
                false
            }
        };

        Toggled {
            favorited,
            persisted,
        }
    }
}
