//! Site providers.

pub mod catalog;

pub use catalog::SiteCatalog;
