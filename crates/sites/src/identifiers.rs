//! Identifiers for food bank entities.
//!
//! The remote dataset has no stable ids, so a site is keyed by its display name.
//! Identifiers use Arc<str> so they clone cheaply into favorites and proximity state.

use std::fmt;
use std::sync::Arc;

/// A site's name used as its key.
///
/// Surrounding whitespace is not part of the name; case and inner spacing are.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteIdentifier(Arc<str>);

impl SiteIdentifier {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A provider record with no usable name.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SiteIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SiteIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for SiteIdentifier {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SiteIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
