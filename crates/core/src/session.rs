//! Map screen lifecycle: the first-load hint, where the map opens, and bringing up
//! proximity monitoring once the user has agreed to it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use larder_sites::prelude::*;
use tokio::sync::watch;

use crate::config::{AppConfig, MapRegion};
use crate::error::{CoreError, Permission};
use crate::location::{LocationService, Position};
use crate::notify::{NotificationDispatcher, NotificationService};
use crate::proximity::{ProximityMonitor, ProximityWatch};

/// Outcome of [`MapSession::start_monitoring`].
pub enum Monitoring {
    Started(ProximityWatch),
    /// A permission was refused; the map works without live alerts.
    Degraded(Permission),
}

impl Monitoring {
    pub fn into_watch(self) -> Option<ProximityWatch> {
        match self {
            Monitoring::Started(watch) => Some(watch),
            Monitoring::Degraded(_) => None,
        }
    }
}

pub struct MapSession {
    config: Arc<AppConfig>,
    first_load_shown: AtomicBool,
}

impl MapSession {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            first_load_shown: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The "showing food banks near you" hint. Only the first call gets it.
    pub fn first_load_message(&self) -> Option<&str> {
        if self.first_load_shown.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(&self.config.first_load_message)
        }
    }

    /// Centre on the user when we know where they are, otherwise the configured
    /// fallback. The zoom level is the same either way.
    pub fn initial_region(&self, position: Option<&Position>) -> MapRegion {
        let fallback = self.config.fallback_region;
        match position {
            Some(position) if position.latitude().is_finite() && position.longitude().is_finite() => {
                MapRegion {
                    latitude: position.latitude(),
                    longitude: position.longitude(),
                    ..fallback
                }
            }
            _ => fallback,
        }
    }

    /// Best-effort one-shot fix for centring the map.
    pub async fn current_position(&self, location: &dyn LocationService) -> Option<Position> {
        if !location.request_permission().await.is_granted() {
            tracing::info!("location permission denied, using fallback region");
            return None;
        }

        match location.current_position(&self.config.location).await {
            Ok(position) => Some(position),
            Err(e) => {
                tracing::warn!(error = %e, "could not read current position");
                None
            }
        }
    }

    /// Ask for location, then notification permission, and start watching.
    ///
    /// Monitoring needs both. A denial is logged and returned as
    /// [`Monitoring::Degraded`]; nothing is started. Errors are left for the
    /// location service failing to open its watch.
    pub async fn start_monitoring(
        &self,
        location: &dyn LocationService,
        notifications: Arc<dyn NotificationService>,
        sites: watch::Receiver<Arc<SiteCatalog>>,
    ) -> Result<Monitoring, CoreError> {
        if !location.request_permission().await.is_granted() {
            tracing::warn!("location permission denied, proximity alerts disabled");
            return Ok(Monitoring::Degraded(Permission::Location));
        }

        if !notifications.request_permission().await.is_granted() {
            tracing::warn!("notification permission denied, proximity alerts disabled");
            return Ok(Monitoring::Degraded(Permission::Notifications));
        }

        let positions = location.watch_position(&self.config.location)?;
        let dispatcher = NotificationDispatcher::new(
            notifications,
            self.config.notification_channel.clone(),
            &self.config.alert_title,
        );

        Ok(Monitoring::Started(ProximityWatch::start(
            positions,
            sites,
            dispatcher,
            ProximityMonitor::new(self.config.proximity_radius_m),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{PermissionStatus, PushedLocation};
    use crate::notify::testing::RecordingNotifier;
    use crate::proximity::testing::*;

    fn session() -> MapSession {
        MapSession::new(Arc::new(AppConfig::default()))
    }

    #[test]
    fn test_first_load_message_once() {
        let session = session();
        assert_eq!(session.first_load_message(), Some("Showing food banks near you"));
        assert_eq!(session.first_load_message(), None);
    }

    #[test]
    fn test_initial_region() {
        let session = session();

        let fallback = session.initial_region(None);
        assert_eq!(fallback, MapRegion::default());

        let here = Position::new(55.95, -3.19);
        let region = session.initial_region(Some(&here));
        assert_eq!(region.latitude, 55.95);
        assert_eq!(region.longitude, -3.19);
        assert_eq!(region.latitude_delta, fallback.latitude_delta);

        let nowhere = Position::new(f64::NAN, 0.0);
        assert_eq!(session.initial_region(Some(&nowhere)), fallback);
    }

    #[tokio::test]
    async fn test_current_position_respects_permission() {
        let session = session();
        let location = PushedLocation::new(PermissionStatus::Denied);
        location.push(Position::new(55.95, -3.19));
        assert_eq!(session.current_position(&location).await, None);

        location.set_permission(PermissionStatus::Granted);
        assert_eq!(
            session.current_position(&location).await,
            Some(Position::new(55.95, -3.19))
        );
    }

    #[tokio::test]
    async fn test_monitoring_needs_location_permission() {
        let session = session();
        let location = PushedLocation::new(PermissionStatus::Denied);
        let notifier = Arc::new(RecordingNotifier::default());
        let (_tx, sites) = watch::channel(Arc::new(SiteCatalog::new()));

        let result = session.start_monitoring(&location, notifier, sites).await;
        assert!(matches!(
            result,
            Ok(Monitoring::Degraded(Permission::Location))
        ));
        assert_eq!(location.watcher_count(), 0);
    }

    #[tokio::test]
    async fn test_monitoring_needs_notification_permission() {
        let session = session();
        let location = PushedLocation::new(PermissionStatus::Granted);
        let notifier = Arc::new(RecordingNotifier {
            permission: Some(PermissionStatus::Denied),
            ..Default::default()
        });
        let (_tx, sites) = watch::channel(Arc::new(SiteCatalog::new()));

        let result = session.start_monitoring(&location, notifier.clone(), sites).await;
        assert!(matches!(
            result,
            Ok(Monitoring::Degraded(Permission::Notifications))
        ));
        assert!(notifier.channels.lock().unwrap().is_empty());
        assert_eq!(location.watcher_count(), 0);
    }

    #[tokio::test]
    async fn test_monitoring_alerts_on_entry() {
        let session = session();
        let location = PushedLocation::new(PermissionStatus::Granted);
        let notifier = Arc::new(RecordingNotifier::default());
        let catalog = SiteCatalog::from_sites(vec![(*site_at_edinburgh("Site A")).clone()]);
        let (_tx, sites) = watch::channel(Arc::new(catalog));

        let watch = session
            .start_monitoring(&location, notifier.clone(), sites)
            .await
            .unwrap()
            .into_watch()
            .expect("both permissions granted");
        let mut alerts = watch.subscribe();

        location.push(user_at(800.0));
        location.push(user_at(100.0));
        let alert = alerts.recv().await.unwrap();
        assert_eq!(alert.site.name(), "Site A");

        watch.stop().await;
    }
}
