//! # larder-sites
//!
//! Typed food bank data with geodesic helpers and pluggable I/O.
//!
//! ## Features
//!
//! - **Typed records**: Sites and need records normalized from the remote dataset
//! - **Geo math**: Haversine distance and initial bearing on a 6371 km sphere
//! - **In-memory catalog**: Name lookups over a fetched site set, duplicate names flagged
//! - **Pluggable I/O**: Implement your own data fetching and key-value persistence
//!
//! ## Example
//!
//! ```
//! use larder_sites::prelude::*;
//! use geo::Point;
//!
//! let site = Site::builder("Leith Community Pantry")
//!     .address("1 Shore Place, Edinburgh")
//!     .location(Point::new(-3.1700, 55.9760))
//!     .network(Network::parse("Independent"))
//!     .build();
//!
//! let catalog = SiteCatalog::from_sites(vec![site]);
//! let pantry = catalog
//!     .get_site(&SiteIdentifier::new("Leith Community Pantry"))
//!     .unwrap();
//!
//! let user = Point::new(-3.1883, 55.9533); // Edinburgh
//! let meters = distance_between(user, pantry.location.unwrap());
//! assert!(meters > 2_000.0 && meters < 3_500.0);
//! ```

pub mod identifiers;
pub mod models;
pub mod network;
pub mod provider;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::{traits::*, types::*};
    pub use crate::network::traits::*;
    pub use crate::provider::catalog::SiteCatalog;
    pub use crate::spatial::{
        bearing_degrees, distance_between, distance_meters, EARTH_RADIUS_METERS,
    };
}

pub use prelude::*;
