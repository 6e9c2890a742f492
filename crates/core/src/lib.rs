//! Food bank finder core: site data, search, favorites, needs and proximity alerts.
//!
//! Platform services (location, notifications, opening links, storage) come in
//! through traits so the same logic runs on both mobile targets and in tests.

pub mod config;
pub mod error;
pub mod favorites;
pub mod filter;
pub mod links;
pub mod location;
pub mod needs;
pub mod notify;
pub mod proximity;
pub mod repository;
pub mod session;

// Re-export the site model crate
pub use larder_sites as sites;

pub use config::AppConfig;
pub use error::{CoreError, Permission};
pub use favorites::{FavoriteSet, FavoritesStore, Toggled};
pub use filter::{FilterSortPipeline, LocationFilter, NetworkFilter, RankedSite, SiteQuery};
pub use location::{LocationService, PermissionStatus, Position, PushedLocation};
pub use needs::ResolvedNeed;
pub use notify::{Notification, NotificationDispatcher, NotificationService};
pub use proximity::{ProximityAlert, ProximityMonitor, ProximityWatch};
pub use repository::{HttpFetcher, SiteRepository};
pub use session::{MapSession, Monitoring};
