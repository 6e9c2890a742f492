//! Outbound links from a site's detail view: call, email, website, shopping list
//! and directions.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use larder_sites::prelude::*;

use crate::error::CoreError;

const DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/?api=1&destination=";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Call,
    Email,
    Homepage,
    ShoppingList,
    Directions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    pub url: String,
}

/// `tel:` link. Spaces and punctuation the dialer does not need are dropped.
pub fn call_link(phone: &str) -> Option<String> {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    (!digits.is_empty()).then(|| format!("tel:{digits}"))
}

pub fn email_link(email: &str) -> Option<String> {
    let email = email.trim();
    email.contains('@').then(|| format!("mailto:{email}"))
}

/// Directions from wherever the user is to the given coordinate.
pub fn directions_link(latitude: f64, longitude: f64) -> Option<String> {
    (latitude.is_finite() && longitude.is_finite())
        .then(|| format!("{DIRECTIONS_BASE}{latitude},{longitude}"))
}

fn web_link(url: &str) -> Option<String> {
    let url = url.trim();
    (!url.is_empty()).then(|| url.to_string())
}

/// Every link the site has data for, in display order.
pub fn links_for(site: &Site) -> Vec<Link> {
    let candidates = [
        (LinkKind::Call, site.phone.as_deref().and_then(call_link)),
        (LinkKind::Email, site.email.as_deref().and_then(email_link)),
        (LinkKind::Homepage, site.homepage_url.as_deref().and_then(web_link)),
        (
            LinkKind::ShoppingList,
            site.shopping_list_url.as_deref().and_then(web_link),
        ),
        (
            LinkKind::Directions,
            site.latitude()
                .zip(site.longitude())
                .and_then(|(lat, lng)| directions_link(lat, lng)),
        ),
    ];

    candidates
        .into_iter()
        .filter_map(|(kind, url)| url.map(|url| Link { kind, url }))
        .collect()
}

/// Hands a URL to the platform (browser, dialer, mail app, maps).
pub trait LinkOpener: Send + Sync {
    fn open<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send + 'a>>;
}

/// Open a link without waiting on the result. Failures are only logged.
pub fn open_detached(opener: Arc<dyn LinkOpener>, link: Link) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = opener.open(&link.url).await {
            tracing::warn!(kind = ?link.kind, url = %link.url, error = %e, "could not open link");
        }
    })
}
