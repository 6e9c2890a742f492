//! Provider wire records and their normalization into typed records.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use geo::Point;
use serde::Deserialize;

use larder_sites::prelude::*;

#[derive(Debug, Deserialize)]
pub(crate) struct RawSite {
    name: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    lat_lng: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    urls: RawUrls,
}

#[derive(Debug, Default, Deserialize)]
struct RawUrls {
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    shopping_list: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNeed {
    foodbank: RawNeedSite,
    #[serde(default)]
    needs: Option<String>,
    #[serde(default)]
    found: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawNeedSite {
    name: String,
}

impl RawSite {
    pub(crate) fn country(&self) -> &str {
        self.country.as_deref().unwrap_or_default()
    }

    pub(crate) fn into_site(self) -> Site {
        let location = self.lat_lng.as_deref().and_then(parse_lat_lng);
        if location.is_none() {
            tracing::debug!(site = %self.name, lat_lng = ?self.lat_lng, "site has no usable coordinates");
        }

        Site {
            id: SiteIdentifier::new(&self.name),
            address: self.address.unwrap_or_default().into(),
            country: self.country.unwrap_or_default().into(),
            location,
            phone: non_blank(self.phone),
            email: non_blank(self.email),
            homepage_url: non_blank(self.urls.homepage),
            shopping_list_url: non_blank(self.urls.shopping_list),
            network: Network::parse(self.network.as_deref().unwrap_or_default()),
            icon: non_blank(self.icon),
        }
    }
}

impl RawNeed {
    pub(crate) fn into_record(self) -> NeedRecord {
        let found = self.found.as_deref().and_then(parse_found);
        NeedRecord::new(
            SiteIdentifier::new(&self.foodbank.name),
            self.needs.map(Into::into),
            found,
        )
    }
}

fn non_blank(value: Option<String>) -> Option<std::sync::Arc<str>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.into())
}

/// Split the provider's `"lat,lng"` string into a point (x = longitude).
///
/// Anything other than exactly two finite numbers yields `None`.
pub(crate) fn parse_lat_lng(raw: &str) -> Option<Point> {
    let (lat, lng) = raw.split_once(',')?;
    if lng.contains(',') {
        return None;
    }

    let lat: f64 = lat.trim().parse().ok()?;
    let lng: f64 = lng.trim().parse().ok()?;

    (lat.is_finite() && lng.is_finite()).then(|| Point::new(lng, lat))
}

/// Read a discovery timestamp. Offset-less times are taken as UTC.
pub(crate) fn parse_found(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
