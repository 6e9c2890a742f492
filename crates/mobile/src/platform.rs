//! Host callbacks and their adapters onto the core service traits.
//!
//! Host calls are blocking from Rust's point of view, so the adapters run them on
//! the blocking pool.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use larder_core::config::ChannelSpec;
use larder_core::links::LinkOpener;
use larder_core::notify::{Notification, NotificationService};
use larder_core::{CoreError, PermissionStatus};

use crate::error::MobileError;
use crate::types::ChannelRecord;

/// Local notifications, implemented by the host app.
#[uniffi::export(with_foreign)]
pub trait NotificationPresenter: Send + Sync {
    /// Prompt for (or report) notification permission.
    fn request_permission(&self) -> bool;
    fn create_channel(&self, channel: ChannelRecord) -> Result<(), MobileError>;
    fn present(&self, channel_id: String, title: String, body: String) -> Result<(), MobileError>;
}

/// Opens URLs in the browser, dialer, mail app or maps.
#[uniffi::export(with_foreign)]
pub trait LinkHandler: Send + Sync {
    fn open(&self, url: String) -> Result<(), MobileError>;
}

async fn off_thread<T, F>(f: F) -> Result<T, CoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, MobileError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CoreError::Notification(e.to_string()))?
        .map_err(|e| CoreError::Notification(e.to_string()))
}

pub(crate) struct HostNotifications(pub Arc<dyn NotificationPresenter>);

impl NotificationService for HostNotifications {
    fn request_permission(&self) -> Pin<Box<dyn Future<Output = PermissionStatus> + Send + '_>> {
        let host = self.0.clone();
        Box::pin(async move {
            match off_thread(move || Ok(host.request_permission())).await {
                Ok(true) => PermissionStatus::Granted,
                Ok(false) => PermissionStatus::Denied,
                Err(e) => {
                    tracing::warn!(error = %e, "notification permission request failed");
                    PermissionStatus::Denied
                }
            }
        })
    }

    fn create_channel<'a>(
        &'a self,
        channel: &'a ChannelSpec,
    ) -> Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send + 'a>> {
        let host = self.0.clone();
        let record = ChannelRecord {
            id: channel.id.clone(),
            name: channel.name.clone(),
            description: channel.description.clone(),
            importance: channel.importance,
            vibrate: channel.vibrate,
        };
        Box::pin(off_thread(move || host.create_channel(record)))
    }

    fn present<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send + 'a>> {
        let host = self.0.clone();
        let Notification {
            channel_id,
            title,
            body,
        } = notification.clone();
        Box::pin(off_thread(move || host.present(channel_id, title, body)))
    }
}

pub(crate) struct HostLinks(pub Arc<dyn LinkHandler>);

impl LinkOpener for HostLinks {
    fn open<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send + 'a>> {
        let host = self.0.clone();
        let url = url.to_owned();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || host.open(url))
                .await
                .map_err(|e| CoreError::Link(e.to_string()))?
                .map_err(|e| CoreError::Link(e.to_string()))
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakePresenter {
        pub deny: bool,
        pub bodies: Mutex<Vec<String>>,
    }

    impl NotificationPresenter for FakePresenter {
        fn request_permission(&self) -> bool {
            !self.deny
        }

        fn create_channel(&self, _channel: ChannelRecord) -> Result<(), MobileError> {
            Ok(())
        }

        fn present(&self, _channel_id: String, _title: String, body: String) -> Result<(), MobileError> {
            self.bodies.lock().unwrap().push(body);
            Ok(())
        }
    }
}
