//! Food bank data models, types, and traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::SiteProvider;
pub use types::{KnownNetwork, NeedRecord, Network, Result, Site, SiteBuilder, SiteError};
