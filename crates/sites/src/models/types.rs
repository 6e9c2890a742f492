//! Core data types and enums for food bank data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use geo::Point;
use strum::{EnumIter, EnumString, IntoStaticStr, IntoEnumIterator};

use crate::identifiers::*;

// ============================================================================
// Enums
// ============================================================================

/// Networks a food bank can be affiliated with that the app knows by name.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, IntoStaticStr, EnumIter, strum::Display,
)]
pub enum KnownNetwork {
    #[strum(serialize = "Trussell Trust")]
    TrussellTrust,
    Independent,
    #[strum(serialize = "IFAN")]
    Ifan,
}

/// Network affiliation as reported by the data provider.
///
/// Unknown affiliations are kept verbatim so they can still be matched by the
/// network filter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Known(KnownNetwork),
    Other(Arc<str>),
}

impl Network {
    pub fn parse(raw: &str) -> Self {
        raw.parse::<KnownNetwork>()
            .map(Network::Known)
            .unwrap_or_else(|_| Network::Other(raw.into()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Network::Known(known) => <&'static str>::from(*known),
            Network::Other(raw) => raw,
        }
    }

    /// Networks offered by the filter picker, in display order.
    pub fn known() -> impl Iterator<Item = Network> {
        KnownNetwork::iter().map(Network::Known)
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Other("".into())
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A food bank location.
///
/// `location` is `None` when the provider's coordinate string did not parse to two
/// finite numbers. Such sites still take part in name search but are skipped by
/// everything that needs a position.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    pub id: SiteIdentifier,
    pub address: Arc<str>,
    pub country: Arc<str>,
    pub location: Option<Point>,
    pub phone: Option<Arc<str>>,
    pub email: Option<Arc<str>>,
    pub homepage_url: Option<Arc<str>>,
    pub shopping_list_url: Option<Arc<str>>,
    pub network: Network,
    pub icon: Option<Arc<str>>,
}

impl Site {
    pub fn builder(name: impl AsRef<str>) -> SiteBuilder {
        SiteBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|p| p.y())
    }

    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|p| p.x())
    }

    /// True when the site has both coordinates.
    pub fn is_located(&self) -> bool {
        self.location.is_some()
    }
}

/// Incremental constructor for [`Site`], mostly for tests and fixtures.
#[derive(Clone, Debug)]
pub struct SiteBuilder {
    site: Site,
}

impl SiteBuilder {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            site: Site {
                id: SiteIdentifier::new(name),
                address: "".into(),
                country: "".into(),
                location: None,
                phone: None,
                email: None,
                homepage_url: None,
                shopping_list_url: None,
                network: Network::default(),
                icon: None,
            },
        }
    }

    pub fn address(mut self, address: impl AsRef<str>) -> Self {
        self.site.address = address.as_ref().into();
        self
    }

    pub fn country(mut self, country: impl AsRef<str>) -> Self {
        self.site.country = country.as_ref().into();
        self
    }

    pub fn location(mut self, location: Point) -> Self {
        self.site.location = Some(location);
        self
    }

    pub fn phone(mut self, phone: impl AsRef<str>) -> Self {
        self.site.phone = Some(phone.as_ref().into());
        self
    }

    pub fn email(mut self, email: impl AsRef<str>) -> Self {
        self.site.email = Some(email.as_ref().into());
        self
    }

    pub fn homepage_url(mut self, url: impl AsRef<str>) -> Self {
        self.site.homepage_url = Some(url.as_ref().into());
        self
    }

    pub fn shopping_list_url(mut self, url: impl AsRef<str>) -> Self {
        self.site.shopping_list_url = Some(url.as_ref().into());
        self
    }

    pub fn network(mut self, network: Network) -> Self {
        self.site.network = network;
        self
    }

    pub fn icon(mut self, icon: impl AsRef<str>) -> Self {
        self.site.icon = Some(icon.as_ref().into());
        self
    }

    pub fn build(self) -> Site {
        self.site
    }
}

/// A dated observation of what a food bank currently needs.
///
/// `found` is `None` when the provider's timestamp could not be read; such records
/// rank below every dated record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeedRecord {
    pub site_id: SiteIdentifier,
    pub needs: Option<Arc<str>>,
    pub found: Option<DateTime<Utc>>,
}

impl NeedRecord {
    pub fn new(
        site_id: SiteIdentifier,
        needs: Option<Arc<str>>,
        found: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            site_id,
            needs,
            found,
        }
    }

    /// Needs text, if the record carries a non-blank one.
    pub fn needs_text(&self) -> Option<&str> {
        self.needs.as_deref().filter(|text| !text.trim().is_empty())
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T, E = SiteError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_parse() {
        assert_eq!(
            Network::parse("Trussell Trust"),
            Network::Known(KnownNetwork::TrussellTrust)
        );
        assert_eq!(Network::parse("IFAN"), Network::Known(KnownNetwork::Ifan));
        assert_eq!(
            Network::parse("Independent"),
            Network::Known(KnownNetwork::Independent)
        );
        assert_eq!(Network::parse("Church Network"), Network::Other("Church Network".into()));
    }

    #[test]
    fn test_network_round_trips_to_provider_string() {
        for raw in ["Trussell Trust", "Independent", "IFAN", "Somewhere Else"] {
            assert_eq!(Network::parse(raw).as_str(), raw);
        }
    }

    #[test]
    fn test_known_networks_in_picker_order() {
        let names: Vec<String> = Network::known().map(|n| n.to_string()).collect();
        assert_eq!(names, ["Trussell Trust", "Independent", "IFAN"]);
    }

    #[test]
    fn test_site_builder() {
        let site = Site::builder("Aberdeen North Foodbank")
            .country("Scotland")
            .location(Point::new(-2.0943, 57.1497))
            .shopping_list_url("https://example.org/list")
            .build();

        assert_eq!(site.name(), "Aberdeen North Foodbank");
        assert_eq!(site.latitude(), Some(57.1497));
        assert_eq!(site.longitude(), Some(-2.0943));
        assert!(site.is_located());
        assert_eq!(site.shopping_list_url.as_deref(), Some("https://example.org/list"));
        assert!(site.phone.is_none());
    }

    #[test]
    fn test_blank_needs_text_is_absent() {
        let record = NeedRecord::new(SiteIdentifier::new("A"), Some("   ".into()), None);
        assert_eq!(record.needs_text(), None);

        let record = NeedRecord::new(SiteIdentifier::new("A"), Some("Tinned fish".into()), None);
        assert_eq!(record.needs_text(), Some("Tinned fish"));
    }
}
