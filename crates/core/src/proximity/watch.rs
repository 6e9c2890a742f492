use std::sync::Arc;

use futures_core::Stream;
use futures_util::StreamExt;
use larder_sites::prelude::*;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};

use crate::location::Position;
use crate::notify::NotificationDispatcher;
use crate::proximity::{ProximityAlert, ProximityMonitor};

const ALERT_BUFFER: usize = 32;

/// A running proximity subscription.
///
/// Consumes a position stream in arrival order, checks every update against the
/// latest published catalog and dispatches a notification for each new alert.
/// Dispatch runs beside the stream, so a slow or failing notification never holds
/// up or undoes a state transition.
///
/// Stopping (or dropping) the watch ends processing: no distance checks or
/// notifications happen afterwards, and pending dispatches are cancelled.
pub struct ProximityWatch {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<ProximityMonitor>>,
    alerts: broadcast::Sender<ProximityAlert>,
}

impl ProximityWatch {
    /// Spawn the monitoring task on the current tokio runtime.
    pub fn start<S>(
        positions: S,
        sites: watch::Receiver<Arc<SiteCatalog>>,
        dispatcher: NotificationDispatcher,
        monitor: ProximityMonitor,
    ) -> Self
    where
        S: Stream<Item = Position> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (alerts, _) = broadcast::channel(ALERT_BUFFER);

        tracing::info!(radius_m = monitor.radius_m(), "proximity monitoring started");
        let task = tokio::spawn(run(
            positions,
            sites,
            dispatcher,
            monitor,
            shutdown_rx,
            alerts.clone(),
        ));

        Self {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
            alerts,
        }
    }

    /// Receive alerts in-process, e.g. to highlight the site on the map.
    pub fn subscribe(&self) -> broadcast::Receiver<ProximityAlert> {
        self.alerts.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Halt processing and wait for the task to wind down. Returns the final
    /// monitor state.
    pub async fn stop(mut self) -> Option<ProximityMonitor> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.join().await
    }

    /// Wait for the position stream to end and pending notifications to finish.
    pub async fn finished(mut self) -> Option<ProximityMonitor> {
        self.join().await
    }

    async fn join(&mut self) -> Option<ProximityMonitor> {
        let task = self.task.take()?;
        match task.await {
            Ok(monitor) => Some(monitor),
            Err(e) => {
                tracing::error!(error = %e, "proximity task failed");
                None
            }
        }
    }
}

impl Drop for ProximityWatch {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<S>(
    positions: S,
    sites: watch::Receiver<Arc<SiteCatalog>>,
    dispatcher: NotificationDispatcher,
    mut monitor: ProximityMonitor,
    mut shutdown: oneshot::Receiver<()>,
    alerts: broadcast::Sender<ProximityAlert>,
) -> ProximityMonitor
where
    S: Stream<Item = Position> + Send + 'static,
{
    let mut positions = std::pin::pin!(positions);
    let mut dispatches = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                dispatches.abort_all();
                tracing::info!("proximity monitoring stopped");
                return monitor;
            }

            next = positions.next() => {
                let Some(position) = next else { break };

                let catalog = sites.borrow().clone();
                for alert in monitor.observe(&position, catalog.all_sites()) {
                    // No subscribers is fine
                    let _ = alerts.send(alert.clone());

                    let dispatcher = dispatcher.clone();
                    dispatches.spawn(async move {
                        if let Err(e) = dispatcher.dispatch(alert.site.name()).await {
                            tracing::warn!(site = %alert.site.id, error = %e, "could not show proximity alert");
                        }
                    });
                }
            }

            Some(result) = dispatches.join_next(), if !dispatches.is_empty() => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "notification dispatch task failed");
                }
            }
        }
    }

    tracing::info!("position stream ended");

    // Let alerts already raised finish, unless told to stop
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                dispatches.abort_all();
                break;
            }

            next = dispatches.join_next() => {
                if next.is_none() {
                    break;
                }
            }
        }
    }

    monitor
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;

    use super::*;
    use crate::config::ChannelSpec;
    use crate::location::{LocationService, PermissionStatus, PushedLocation};
    use crate::notify::testing::RecordingNotifier;
    use crate::proximity::testing::*;

    fn dispatcher(notifier: &Arc<RecordingNotifier>) -> NotificationDispatcher {
        NotificationDispatcher::new(notifier.clone(), ChannelSpec::default(), "Nearby Food Bank")
    }

    fn catalog_with(sites: Vec<Arc<Site>>) -> SiteCatalog {
        SiteCatalog::from_sites(sites.iter().map(|s| (**s).clone()).collect())
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("condition not reached");
    }

    #[tokio::test]
    async fn test_stream_path_dispatches_one_alert_per_entry() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (_tx, sites) = watch::channel(Arc::new(catalog_with(vec![site_at_edinburgh("Site A")])));
        let positions = futures_util::stream::iter(
            [600.0, 300.0, 300.0, 600.0, 300.0].map(user_at),
        );

        let watch = ProximityWatch::start(positions, sites, dispatcher(&notifier), ProximityMonitor::new(500.0));
        let monitor = watch.finished().await.unwrap();

        assert_eq!(
            notifier.presented_bodies(),
            ["You are near Site A", "You are near Site A"]
        );
        assert!(monitor.is_near(&SiteIdentifier::new("Site A")));
        assert_eq!(notifier.channels.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_dispatch_still_commits_state() {
        let notifier = Arc::new(RecordingNotifier {
            fail_present: true,
            ..Default::default()
        });
        let (_tx, sites) = watch::channel(Arc::new(catalog_with(vec![site_at_edinburgh("Site A")])));
        let positions = futures_util::stream::iter([300.0, 300.0, 200.0].map(user_at));

        let watch = ProximityWatch::start(positions, sites, dispatcher(&notifier), ProximityMonitor::new(500.0));
        let monitor = watch.finished().await.unwrap();

        // One attempt only, and the site is still marked near
        assert_eq!(notifier.presented.lock().unwrap().len(), 1);
        assert!(monitor.is_near(&SiteIdentifier::new("Site A")));
    }

    #[tokio::test]
    async fn test_stop_halts_processing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let location = PushedLocation::new(PermissionStatus::Granted);
        let (_tx, sites) = watch::channel(Arc::new(catalog_with(vec![site_at_edinburgh("Site A")])));

        let stream = location.watch_position(&Default::default()).unwrap();
        let watch = ProximityWatch::start(stream, sites, dispatcher(&notifier), ProximityMonitor::new(500.0));
        let mut alerts = watch.subscribe();

        location.push(user_at(300.0));
        let alert = alerts.recv().await.unwrap();
        assert_eq!(alert.site.name(), "Site A");
        wait_until(|| !notifier.presented.lock().unwrap().is_empty()).await;

        let monitor = watch.stop().await.unwrap();
        assert!(monitor.is_near(&SiteIdentifier::new("Site A")));

        // The subscription is gone; later fixes go nowhere
        location.push(user_at(600.0));
        location.push(user_at(300.0));
        assert_eq!(location.watcher_count(), 0);
        tokio::task::yield_now().await;
        assert_eq!(notifier.presented.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_cancels_subscription() {
        let notifier = Arc::new(RecordingNotifier::default());
        let location = PushedLocation::new(PermissionStatus::Granted);
        let (_tx, sites) = watch::channel(Arc::new(SiteCatalog::new()));

        let stream = location.watch_position(&Default::default()).unwrap();
        let watch = ProximityWatch::start(stream, sites, dispatcher(&notifier), ProximityMonitor::new(500.0));
        assert!(watch.is_running());
        drop(watch);

        wait_until(|| location.watcher_count() == 0).await;
    }

    #[tokio::test]
    async fn test_refreshed_catalog_is_picked_up() {
        let notifier = Arc::new(RecordingNotifier::default());
        let location = PushedLocation::new(PermissionStatus::Granted);
        let (catalog_tx, sites) = watch::channel(Arc::new(SiteCatalog::new()));

        let stream = location.watch_position(&Default::default()).unwrap();
        let watch = ProximityWatch::start(stream, sites, dispatcher(&notifier), ProximityMonitor::new(500.0));
        let mut alerts = watch.subscribe();

        // Sites arrive after monitoring has started
        catalog_tx.send_replace(Arc::new(catalog_with(vec![site_at_edinburgh("Site A")])));
        location.push(user_at(250.0));

        let alert = alerts.recv().await.unwrap();
        assert_eq!(alert.site.name(), "Site A");
        assert_relative_eq!(alert.distance_m, 250.0, epsilon = 1e-6);

        watch.stop().await;
    }
}
