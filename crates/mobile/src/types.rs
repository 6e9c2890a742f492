//! Records crossing the FFI boundary, and their conversions from core types.

use chrono::{DateTime, Utc};
use larder_core::config::{LocationRequest, MapRegion};
use larder_core::filter::{LocationFilter, NetworkFilter, SiteQuery};
use larder_core::links::{Link, LinkKind};
use larder_core::sites::prelude::*;
use larder_core::{
    FavoriteSet, Permission, Position, ProximityAlert, RankedSite, ResolvedNeed, Toggled,
};

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct SiteRecord {
    pub name: String,
    pub address: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub homepage_url: Option<String>,
    pub shopping_list_url: Option<String>,
    pub network: String,
    pub icon: Option<String>,
    pub is_favorite: bool,
}

impl SiteRecord {
    pub(crate) fn new(site: &Site, favorites: &FavoriteSet) -> Self {
        let owned = |value: &Option<std::sync::Arc<str>>| value.as_deref().map(str::to_owned);

        Self {
            name: site.name().to_owned(),
            address: site.address.to_string(),
            country: site.country.to_string(),
            latitude: site.latitude(),
            longitude: site.longitude(),
            phone: owned(&site.phone),
            email: owned(&site.email),
            homepage_url: owned(&site.homepage_url),
            shopping_list_url: owned(&site.shopping_list_url),
            network: site.network.to_string(),
            icon: owned(&site.icon),
            is_favorite: favorites.contains(&site.id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct RankedSiteRecord {
    pub site: SiteRecord,
    pub distance_m: Option<f64>,
}

impl RankedSiteRecord {
    pub(crate) fn new(ranked: &RankedSite, favorites: &FavoriteSet) -> Self {
        Self {
            site: SiteRecord::new(&ranked.site, favorites),
            distance_m: ranked.distance_m,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, uniffi::Enum)]
pub enum LocationFilterKind {
    None,
    NearestToUser,
    ExactCoordinate { latitude: f64, longitude: f64 },
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct SearchQuery {
    pub search_text: String,
    pub location: LocationFilterKind,
    /// Network name to keep, or `None` for every network.
    pub network: Option<String>,
}

impl From<SearchQuery> for SiteQuery {
    fn from(query: SearchQuery) -> Self {
        let location = match query.location {
            LocationFilterKind::None => LocationFilter::None,
            LocationFilterKind::NearestToUser => LocationFilter::NearestToUser,
            LocationFilterKind::ExactCoordinate { latitude, longitude } => {
                LocationFilter::ExactCoordinate { latitude, longitude }
            }
        };

        let network = match query.network.as_deref().map(str::trim) {
            None | Some("") => NetworkFilter::Any,
            Some(name) => NetworkFilter::Only(Network::parse(name)),
        };

        SiteQuery {
            search_text: query.search_text,
            location,
            network,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Enum)]
pub enum NeedsPanel {
    Current {
        needs: Option<String>,
        /// RFC 3339, when the provider dated the record.
        found: Option<String>,
    },
    ShoppingList {
        url: String,
    },
    NoInformation,
}

impl From<ResolvedNeed> for NeedsPanel {
    fn from(need: ResolvedNeed) -> Self {
        match need {
            ResolvedNeed::Current(record) => NeedsPanel::Current {
                needs: record.needs_text().map(str::to_owned),
                found: record.found.map(|found| found.to_rfc3339()),
            },
            ResolvedNeed::ShoppingList(url) => NeedsPanel::ShoppingList {
                url: url.to_string(),
            },
            ResolvedNeed::NoInformation => NeedsPanel::NoInformation,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum LinkKindRecord {
    Call,
    Email,
    Homepage,
    ShoppingList,
    Directions,
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct LinkRecord {
    pub kind: LinkKindRecord,
    pub url: String,
}

impl From<Link> for LinkRecord {
    fn from(link: Link) -> Self {
        let kind = match link.kind {
            LinkKind::Call => LinkKindRecord::Call,
            LinkKind::Email => LinkKindRecord::Email,
            LinkKind::Homepage => LinkKindRecord::Homepage,
            LinkKind::ShoppingList => LinkKindRecord::ShoppingList,
            LinkKind::Directions => LinkKindRecord::Directions,
        };
        Self { kind, url: link.url }
    }
}

impl From<LinkRecord> for Link {
    fn from(link: LinkRecord) -> Self {
        let kind = match link.kind {
            LinkKindRecord::Call => LinkKind::Call,
            LinkKindRecord::Email => LinkKind::Email,
            LinkKindRecord::Homepage => LinkKind::Homepage,
            LinkKindRecord::ShoppingList => LinkKind::ShoppingList,
            LinkKindRecord::Directions => LinkKind::Directions,
        };
        Self { kind, url: link.url }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct ToggleResult {
    pub favorited: bool,
    /// `false` when the change only lives in memory for this session.
    pub persisted: bool,
}

impl From<Toggled> for ToggleResult {
    fn from(t: Toggled) -> Self {
        Self {
            favorited: t.favorited,
            persisted: t.persisted,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct MapRegionRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl From<MapRegion> for MapRegionRecord {
    fn from(r: MapRegion) -> Self {
        Self {
            latitude: r.latitude,
            longitude: r.longitude,
            latitude_delta: r.latitude_delta,
            longitude_delta: r.longitude_delta,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct PositionRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: Option<i64>,
}

impl From<PositionRecord> for Position {
    fn from(p: PositionRecord) -> Self {
        Position {
            accuracy_m: p.accuracy_m,
            timestamp: p.timestamp_ms.and_then(DateTime::<Utc>::from_timestamp_millis),
            ..Position::new(p.latitude, p.longitude)
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct AlertRecord {
    pub site_name: String,
    pub distance_m: f64,
    pub bearing_deg: f64,
}

impl From<ProximityAlert> for AlertRecord {
    fn from(alert: ProximityAlert) -> Self {
        Self {
            site_name: alert.site.name().to_owned(),
            distance_m: alert.distance_m,
            bearing_deg: alert.bearing_deg,
        }
    }
}

/// How the host should configure its location requests.
#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct LocationRequestRecord {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub maximum_age_ms: u64,
    /// Only for watches.
    pub distance_filter_m: f64,
}

impl From<&LocationRequest> for LocationRequestRecord {
    fn from(request: &LocationRequest) -> Self {
        Self {
            high_accuracy: request.high_accuracy,
            timeout_ms: request.timeout().as_millis() as u64,
            maximum_age_ms: request.maximum_age().as_millis() as u64,
            distance_filter_m: request.distance_filter_m,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum PermissionKind {
    Location,
    Notifications,
}

impl From<Permission> for PermissionKind {
    fn from(permission: Permission) -> Self {
        match permission {
            Permission::Location => PermissionKind::Location,
            Permission::Notifications => PermissionKind::Notifications,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: u8,
    pub vibrate: bool,
}
