//! Platform location service seam.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use geo::Point;
use tokio::sync::mpsc;

use crate::config::LocationRequest;
use crate::error::{CoreError, Permission};

/// A fix reported by the location service. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub location: Point,
    pub accuracy_m: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            location: Point::new(longitude, latitude),
            accuracy_m: None,
            timestamp: None,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Location access, gated behind a user-granted permission.
pub trait LocationService: Send + Sync {
    fn request_permission(&self) -> Pin<Box<dyn Future<Output = PermissionStatus> + Send + '_>>;

    /// One-shot read of the current position.
    fn current_position<'a>(
        &'a self,
        request: &'a LocationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Position, CoreError>> + Send + 'a>>;

    /// Continuous updates. Dropping the stream cancels the platform subscription.
    fn watch_position(
        &self,
        request: &LocationRequest,
    ) -> Result<BoxStream<'static, Position>, CoreError>;
}

/// Location service fed by the host calling [`PushedLocation::push`] for every fix,
/// as the mobile bindings do.
pub struct PushedLocation {
    permission: Mutex<PermissionStatus>,
    last: Mutex<Option<Position>>,
    watchers: Mutex<Vec<mpsc::UnboundedSender<Position>>>,
}

impl PushedLocation {
    pub fn new(permission: PermissionStatus) -> Self {
        Self {
            permission: Mutex::new(permission),
            last: Mutex::new(None),
            watchers: Mutex::new(Vec::new()),
        }
    }

    pub fn set_permission(&self, status: PermissionStatus) {
        if let Ok(mut permission) = self.permission.lock() {
            *permission = status;
        }
    }

    fn permission(&self) -> PermissionStatus {
        self.permission
            .lock()
            .map(|p| *p)
            .unwrap_or(PermissionStatus::Denied)
    }

    /// Record a fix and hand it to every live watch. Watches whose stream was
    /// dropped are forgotten.
    pub fn push(&self, position: Position) {
        if let Ok(mut last) = self.last.lock() {
            *last = Some(position);
        }
        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.retain(|tx| tx.send(position).is_ok());
        }
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers
            .lock()
            .map(|watchers| watchers.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }
}

impl LocationService for PushedLocation {
    fn request_permission(&self) -> Pin<Box<dyn Future<Output = PermissionStatus> + Send + '_>> {
        let status = self.permission();
        Box::pin(async move { status })
    }

    fn current_position<'a>(
        &'a self,
        _request: &'a LocationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Position, CoreError>> + Send + 'a>> {
        let result = if self.permission().is_granted() {
            self.last
                .lock()
                .ok()
                .and_then(|last| *last)
                .ok_or_else(|| CoreError::Location("no position reported yet".into()))
        } else {
            Err(CoreError::PermissionDenied(Permission::Location))
        };
        Box::pin(async move { result })
    }

    fn watch_position(
        &self,
        _request: &LocationRequest,
    ) -> Result<BoxStream<'static, Position>, CoreError> {
        if !self.permission().is_granted() {
            return Err(CoreError::PermissionDenied(Permission::Location));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers
            .lock()
            .map_err(|_| CoreError::Location("watcher list poisoned".into()))?
            .push(tx);

        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|position| (position, rx))
        })
        .boxed())
    }
}
