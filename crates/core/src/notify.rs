//! Local notifications for proximity alerts.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::ChannelSpec;
use crate::error::CoreError;
use crate::location::PermissionStatus;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub channel_id: String,
    pub title: String,
    pub body: String,
}

/// Platform notification API, gated behind its own permission.
pub trait NotificationService: Send + Sync {
    fn request_permission(&self) -> Pin<Box<dyn Future<Output = PermissionStatus> + Send + '_>>;

    /// Create the channel. Called at most once per dispatcher.
    fn create_channel<'a>(
        &'a self,
        channel: &'a ChannelSpec,
    ) -> Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send + 'a>>;

    fn present<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send + 'a>>;
}

/// Builds alert notifications and makes sure the channel exists before the first one.
///
/// Cheap to clone; clones share the channel state.
#[derive(Clone)]
pub struct NotificationDispatcher {
    service: Arc<dyn NotificationService>,
    channel: Arc<ChannelSpec>,
    title: Arc<str>,
    channel_ready: Arc<OnceCell<()>>,
}

impl NotificationDispatcher {
    pub fn new(service: Arc<dyn NotificationService>, channel: ChannelSpec, title: &str) -> Self {
        Self {
            service,
            channel: Arc::new(channel),
            title: title.into(),
            channel_ready: Arc::new(OnceCell::new()),
        }
    }

    pub fn alert_for(&self, site_name: &str) -> Notification {
        Notification {
            channel_id: self.channel.id.clone(),
            title: self.title.to_string(),
            body: format!("You are near {site_name}"),
        }
    }

    /// Present the "you are near" alert for a site.
    pub async fn dispatch(&self, site_name: &str) -> Result<(), CoreError> {
        self.channel_ready
            .get_or_try_init(|| async {
                self.service.create_channel(&self.channel).await?;
                tracing::debug!(channel = %self.channel.id, "created notification channel");
                Ok::<_, CoreError>(())
            })
            .await?;

        let notification = self.alert_for(site_name);
        self.service.present(&notification).await
    }
}
