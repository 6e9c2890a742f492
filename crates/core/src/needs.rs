//! Picks what to show on a site's needs panel.

use std::sync::Arc;

use larder_sites::prelude::*;

/// What the needs panel shows for a site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedNeed {
    /// The most recently found need record.
    Current(NeedRecord),
    /// No need records; point the user at the site's shopping list instead.
    ShoppingList(Arc<str>),
    /// Neither need records nor a shopping list.
    NoInformation,
}

/// Resolve the needs panel for `site`.
///
/// The newest record by discovery time wins; on equal times the first one
/// encountered is kept, and undated records lose to any dated one. Without records
/// the shopping-list URL is looked up by name in `sites`.
pub fn resolve(
    site: &SiteIdentifier,
    all_needs: &[NeedRecord],
    sites: &dyn SiteProvider,
) -> ResolvedNeed {
    let newest = all_needs
        .iter()
        .filter(|record| &record.site_id == site)
        .fold(None::<&NeedRecord>, |best, record| match best {
            Some(best) if record.found <= best.found => Some(best),
            _ => Some(record),
        });

    if let Some(record) = newest {
        return ResolvedNeed::Current(record.clone());
    }

    match sites.get_site(site).and_then(|s| s.shopping_list_url.clone()) {
        Some(url) => ResolvedNeed::ShoppingList(url),
        None => {
            tracing::debug!(site = %site, "no needs or shopping list");
            ResolvedNeed::NoInformation
        }
    }
}
