//! Remote site and need collections.
//!
//! Fetches, filters and normalizes the provider's data, keeping the last good
//! result so a failed refresh never clears what the user is looking at.

mod http;
pub(crate) mod wire;

use std::sync::{Arc, RwLock};

use larder_sites::prelude::*;
use tokio::sync::watch;

use crate::config::AppConfig;
use crate::error::CoreError;

pub use http::HttpFetcher;
use wire::{RawNeed, RawSite};

pub struct SiteRepository {
    fetcher: Arc<dyn DataFetcher>,
    sites_url: String,
    needs_url: String,
    region: String,

    sites: watch::Sender<Arc<SiteCatalog>>,
    needs: RwLock<Arc<[NeedRecord]>>,
}

impl SiteRepository {
    pub fn new(fetcher: Arc<dyn DataFetcher>, config: &AppConfig) -> Self {
        let (sites, _) = watch::channel(Arc::new(SiteCatalog::new()));

        Self {
            fetcher,
            sites_url: config.sites_url.clone(),
            needs_url: config.needs_url.clone(),
            region: config.region.clone(),
            sites,
            needs: RwLock::new(Arc::from(Vec::new())),
        }
    }

    /// Fetch the site collection, keep only the supported region and normalize it.
    pub async fn fetch_sites(&self) -> Result<Vec<Site>, CoreError> {
        let body = self
            .fetcher
            .fetch(&self.sites_url)
            .await
            .map_err(CoreError::DataUnavailable)?;

        let raw: Vec<RawSite> = serde_json::from_slice(&body).map_err(|e| {
            CoreError::DataUnavailable(SiteError::InvalidData(format!("site collection: {e}")))
        })?;

        Ok(raw
            .into_iter()
            .filter(|site| site.country() == self.region)
            .map(RawSite::into_site)
            .filter(|site| {
                if site.id.is_blank() {
                    tracing::debug!(address = %site.address, "skipping site without a name");
                }
                !site.id.is_blank()
            })
            .collect())
    }

    /// Fetch every need record, unfiltered.
    pub async fn fetch_needs(&self) -> Result<Vec<NeedRecord>, CoreError> {
        let body = self
            .fetcher
            .fetch(&self.needs_url)
            .await
            .map_err(CoreError::DataUnavailable)?;

        let raw: Vec<RawNeed> = serde_json::from_slice(&body).map_err(|e| {
            CoreError::DataUnavailable(SiteError::InvalidData(format!("need collection: {e}")))
        })?;

        Ok(raw.into_iter().map(RawNeed::into_record).collect())
    }

    /// Fetch and publish a new catalog. On failure the previous catalog (empty on
    /// first load) stays current and is returned.
    pub async fn refresh_sites(&self) -> Arc<SiteCatalog> {
        match self.fetch_sites().await {
            Ok(sites) => {
                let catalog = SiteCatalog::from_sites(sites);
                for name in catalog.duplicate_names() {
                    tracing::warn!(site = %name, "several sites share this name; favorites and alerts treat them as one");
                }
                tracing::info!(count = catalog.len(), region = %self.region, "loaded sites");

                let catalog = Arc::new(catalog);
                self.sites.send_replace(catalog.clone());
                catalog
            }
            Err(e) => {
                tracing::warn!(error = %e, "keeping previous sites");
                self.sites()
            }
        }
    }

    /// Fetch need records, falling back to the previous set on failure.
    pub async fn refresh_needs(&self) -> Arc<[NeedRecord]> {
        match self.fetch_needs().await {
            Ok(needs) => {
                tracing::info!(count = needs.len(), "loaded need records");
                let needs: Arc<[NeedRecord]> = needs.into();
                if let Ok(mut guard) = self.needs.write() {
                    *guard = needs.clone();
                }
                needs
            }
            Err(e) => {
                tracing::warn!(error = %e, "keeping previous need records");
                self.needs()
            }
        }
    }

    /// The most recently published catalog.
    pub fn sites(&self) -> Arc<SiteCatalog> {
        self.sites.borrow().clone()
    }

    pub fn needs(&self) -> Arc<[NeedRecord]> {
        match self.needs.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Follow catalog replacements, e.g. from the proximity monitor.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SiteCatalog>> {
        self.sites.subscribe()
    }
}
