use std::path::Path;
use std::sync::Arc;

use larder_core::favorites::{MemoryStore, SqliteStore};
use larder_core::links;
use larder_core::needs;
use larder_core::sites::prelude::*;
use larder_core::{
    AppConfig, FavoritesStore, FilterSortPipeline, HttpFetcher, MapSession, Monitoring,
    PermissionStatus, ProximityAlert, ProximityWatch, PushedLocation, SiteQuery, SiteRepository,
};
use tokio::runtime::Runtime;
use tokio::sync::{Mutex, broadcast};

use crate::error::MobileError;
use crate::logging::setup_logging;
use crate::platform::{HostLinks, HostNotifications, LinkHandler, NotificationPresenter};
use crate::types::{
    AlertRecord, LinkRecord, LocationRequestRecord, MapRegionRecord, NeedsPanel, PermissionKind,
    PositionRecord, RankedSiteRecord, SearchQuery, SiteRecord, ToggleResult,
};

const DATABASE_FILE: &str = "larder.sqlite3";

/// Network names for the filter picker, in display order.
#[uniffi::export]
pub fn known_networks() -> Vec<String> {
    Network::known().map(|network| network.to_string()).collect()
}

#[derive(uniffi::Enum)]
pub enum MonitoringStatus {
    Started { handle: Arc<MonitorHandle> },
    /// The user refused a permission; the map keeps working without alerts.
    Degraded { permission: PermissionKind },
}

/// Everything the app screens talk to. One per process.
#[derive(uniffi::Object)]
pub struct AppState {
    runtime: Runtime,
    repository: Arc<SiteRepository>,
    favorites: Arc<Mutex<FavoritesStore>>,
    session: Arc<MapSession>,
    location: Arc<PushedLocation>,
}

#[uniffi::export]
impl AppState {
    /// `config_json` overrides individual settings; pass `None` for the defaults.
    #[uniffi::constructor]
    pub fn new(data_dir: String, config_json: Option<String>) -> Result<Arc<Self>, MobileError> {
        setup_logging();

        let config = match config_json {
            Some(json) => AppConfig::from_json(&json)?,
            None => AppConfig::default(),
        };
        let config = Arc::new(config);

        let runtime = Runtime::new().map_err(|e| MobileError::Runtime(e.to_string()))?;

        let storage: Arc<dyn KeyValueStore> =
            match SqliteStore::open(Path::new(&data_dir).join(DATABASE_FILE)) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!(error = %e, "favorites will not survive a restart");
                    Arc::new(MemoryStore::new())
                }
            };
        let favorites = runtime.block_on(FavoritesStore::load(storage));

        let repository = Arc::new(SiteRepository::new(Arc::new(HttpFetcher::new()), &config));

        tracing::info!(region = %config.region, "app state ready");
        Ok(Arc::new(Self {
            runtime,
            repository,
            favorites: Arc::new(Mutex::new(favorites)),
            session: Arc::new(MapSession::new(config)),
            location: Arc::new(PushedLocation::new(PermissionStatus::Denied)),
        }))
    }

    /// Reload sites from the provider. On failure the previous sites stay.
    /// Returns how many sites are now available.
    pub async fn refresh_sites(&self) -> Result<u32, MobileError> {
        let repository = self.repository.clone();
        let catalog = self
            .runtime
            .spawn(async move { repository.refresh_sites().await })
            .await?;
        Ok(catalog.len() as u32)
    }

    pub async fn refresh_needs(&self) -> Result<u32, MobileError> {
        let repository = self.repository.clone();
        let needs = self
            .runtime
            .spawn(async move { repository.refresh_needs().await })
            .await?;
        Ok(needs.len() as u32)
    }

    /// The list screen: search, filter and order the current sites.
    pub async fn search(&self, query: SearchQuery) -> Vec<RankedSiteRecord> {
        let query = SiteQuery::from(query);
        let position = self.session.current_position(&*self.location).await;
        let catalog = self.repository.sites();
        let favorites = self.favorites.lock().await;

        FilterSortPipeline::new(favorites.favorites(), position.as_ref())
            .run(catalog.all_sites(), &query)
            .iter()
            .map(|ranked| RankedSiteRecord::new(ranked, favorites.favorites()))
            .collect()
    }

    pub async fn site(&self, name: String) -> Option<SiteRecord> {
        let catalog = self.repository.sites();
        let site = catalog.get_site(&SiteIdentifier::new(name))?;
        let favorites = self.favorites.lock().await;
        Some(SiteRecord::new(&site, favorites.favorites()))
    }

    pub async fn toggle_favorite(&self, name: String) -> ToggleResult {
        let favorites = self.favorites.clone();
        let id = SiteIdentifier::new(name);
        let toggle = self
            .runtime
            .spawn(async move { favorites.lock().await.toggle(&id).await })
            .await;

        match toggle {
            Ok(toggled) => toggled.into(),
            Err(e) => {
                tracing::error!(error = %e, "favorite toggle task failed");
                ToggleResult {
                    favorited: false,
                    persisted: false,
                }
            }
        }
    }

    pub fn needs_for(&self, name: String) -> NeedsPanel {
        let catalog = self.repository.sites();
        needs::resolve(&SiteIdentifier::new(name), &self.repository.needs(), &*catalog).into()
    }

    pub fn links_for(&self, name: String) -> Vec<LinkRecord> {
        let catalog = self.repository.sites();
        catalog
            .get_site(&SiteIdentifier::new(name))
            .map(|site| links::links_for(&site).into_iter().map(LinkRecord::from).collect())
            .unwrap_or_default()
    }

    /// Fire and forget. Failures are logged.
    pub fn open_link(&self, link: LinkRecord, handler: Arc<dyn LinkHandler>) {
        let _guard = self.runtime.enter();
        links::open_detached(Arc::new(HostLinks(handler)), link.into());
    }

    pub fn first_load_message(&self) -> Option<String> {
        self.session.first_load_message().map(str::to_owned)
    }

    pub async fn initial_region(&self) -> MapRegionRecord {
        let position = self.session.current_position(&*self.location).await;
        self.session.initial_region(position.as_ref()).into()
    }

    pub fn set_location_permission(&self, granted: bool) {
        self.location.set_permission(if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        });
    }

    /// Options the host should use for its one-shot and watch location requests.
    pub fn location_request(&self) -> LocationRequestRecord {
        (&self.session.config().location).into()
    }

    /// Feed a fix from the platform location service.
    pub fn push_position(&self, position: PositionRecord) {
        self.location.push(position.into());
    }

    /// Ask for permissions and start proximity alerts. A refused permission is not
    /// an error; it comes back as `Degraded`.
    pub async fn start_monitoring(
        &self,
        presenter: Arc<dyn NotificationPresenter>,
    ) -> Result<MonitoringStatus, MobileError> {
        let session = self.session.clone();
        let location = self.location.clone();
        let sites = self.repository.subscribe();

        let monitoring = self
            .runtime
            .spawn(async move {
                session
                    .start_monitoring(&*location, Arc::new(HostNotifications(presenter)), sites)
                    .await
            })
            .await??;

        Ok(match monitoring {
            Monitoring::Started(watch) => MonitoringStatus::Started {
                handle: Arc::new(MonitorHandle::new(watch)),
            },
            Monitoring::Degraded(permission) => MonitoringStatus::Degraded {
                permission: permission.into(),
            },
        })
    }
}

/// A live proximity subscription. Dropping it stops monitoring.
#[derive(uniffi::Object)]
pub struct MonitorHandle {
    watch: Mutex<Option<ProximityWatch>>,
    alerts: Mutex<broadcast::Receiver<ProximityAlert>>,
}

impl MonitorHandle {
    fn new(watch: ProximityWatch) -> Self {
        Self {
            alerts: Mutex::new(watch.subscribe()),
            watch: Mutex::new(Some(watch)),
        }
    }
}

#[uniffi::export]
impl MonitorHandle {
    pub async fn is_running(&self) -> bool {
        self.watch
            .lock()
            .await
            .as_ref()
            .is_some_and(ProximityWatch::is_running)
    }

    /// Wait for the next alert. `None` once monitoring has stopped.
    pub async fn next_alert(&self) -> Option<AlertRecord> {
        let mut alerts = self.alerts.lock().await;
        loop {
            match alerts.recv().await {
                Ok(alert) => return Some(alert.into()),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "alert listener fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    pub async fn stop(&self) {
        let watch = self.watch.lock().await.take();
        if let Some(watch) = watch {
            watch.stop().await;
        }
    }
}
