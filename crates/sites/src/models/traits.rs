//! Core traits for food bank data.
//!
//! Implementations can be in-memory snapshots or anything else that can answer
//! lookups over the current site set.

use std::sync::Arc;

use crate::identifiers::*;
use crate::models::types::*;

// ============================================================================
// Provider Trait
// ============================================================================

/// Read-only view over one fetch cycle's site set.
///
/// Consumers never mutate the sites they receive; a refresh replaces the whole
/// provider.
pub trait SiteProvider: Send + Sync {
    // ---- Lookups ----
    fn get_site(&self, id: &SiteIdentifier) -> Option<Arc<Site>>;

    // ---- Collections ----

    /// All sites in provider order.
    fn all_sites(&self) -> &[Arc<Site>];
}
