//! In-memory site catalog for one fetch cycle.
//!
//! Holds the normalized sites in provider order with a name index. A refresh builds
//! a new catalog rather than mutating an existing one.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::identifiers::*;
use crate::models::{traits::*, types::*};

/// Immutable snapshot of the site set.
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone, Debug, Default)]
pub struct SiteCatalog {
    sites: Vec<Arc<Site>>,

    // Lookup map, first occurrence of a name wins
    site_map: HashMap<SiteIdentifier, Arc<Site>>,

    // Names that occurred more than once in the input
    duplicates: Vec<SiteIdentifier>,
}

impl SiteCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from normalized sites, keeping their order
    pub fn from_sites(sites: Vec<Site>) -> Self {
        let sites: Vec<Arc<Site>> = sites.into_iter().map(Arc::new).collect();

        let mut site_map = HashMap::with_capacity(sites.len());
        let mut duplicates = Vec::new();
        for site in &sites {
            match site_map.entry(site.id.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(site.clone());
                }
                Entry::Occupied(_) => {
                    if !duplicates.contains(&site.id) {
                        duplicates.push(site.id.clone());
                    }
                }
            }
        }

        Self {
            sites,
            site_map,
            duplicates,
        }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Names shared by more than one site. Favorites and proximity state key on the
    /// name, so these sites are indistinguishable to them.
    pub fn duplicate_names(&self) -> &[SiteIdentifier] {
        &self.duplicates
    }
}

impl SiteProvider for SiteCatalog {
    fn get_site(&self, id: &SiteIdentifier) -> Option<Arc<Site>> {
        self.site_map.get(id).cloned()
    }

    fn all_sites(&self) -> &[Arc<Site>] {
        &self.sites
    }
}
