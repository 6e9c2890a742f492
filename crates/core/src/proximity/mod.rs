//! Proximity alerts for nearby food banks.
//!
//! [`ProximityMonitor`] is the pure transition logic: feed it positions and the
//! current sites, get back the sites the user has just come near.
//! [`ProximityWatch`] drives a monitor from a live position stream.

mod watch;

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use geo::Point;
use larder_sites::prelude::*;

use crate::location::Position;

pub use watch::ProximityWatch;

/// The user has just come within the radius of a site.
#[derive(Clone, Debug, PartialEq)]
pub struct ProximityAlert {
    pub site: Arc<Site>,
    pub distance_m: f64,
    /// Direction from the user to the site, degrees clockwise from north.
    pub bearing_deg: f64,
}

/// Per-site "near" flags for one monitoring session.
///
/// A site raises an alert only when it goes from not near to near. Staying inside
/// the radius is silent; leaving it re-arms the site.
#[derive(Clone, Debug)]
pub struct ProximityMonitor {
    radius_m: f64,
    near: HashMap<SiteIdentifier, bool>,
}

impl ProximityMonitor {
    pub fn new(radius_m: f64) -> Self {
        Self {
            radius_m,
            near: HashMap::new(),
        }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn is_near(&self, id: &SiteIdentifier) -> bool {
        self.near.get(id).copied().unwrap_or(false)
    }

    /// Apply one position update. Returns an alert for every site that just came
    /// within the radius, in site order.
    ///
    /// Sites sharing a name are one site, at the distance of its closest copy.
    /// Sites without coordinates, or whose distance is not a number, are skipped and
    /// keep their previous state. Flags of sites no longer in `sites` are dropped.
    pub fn observe(&mut self, position: &Position, sites: &[Arc<Site>]) -> Vec<ProximityAlert> {
        let present: HashSet<&SiteIdentifier> = sites.iter().map(|site| &site.id).collect();
        self.near.retain(|id, _| present.contains(id));

        let mut alerts = Vec::new();
        for (site, location, distance) in closest_by_name(position.location, sites) {
            let now_near = distance < self.radius_m;
            let was_near = self.near.insert(site.id.clone(), now_near).unwrap_or(false);

            if now_near && !was_near {
                tracing::info!(site = %site.id, distance_m = distance, "entered proximity radius");
                alerts.push(ProximityAlert {
                    site: site.clone(),
                    distance_m: distance,
                    bearing_deg: bearing_degrees(position.location, location),
                });
            } else if was_near && !now_near {
                tracing::debug!(site = %site.id, distance_m = distance, "left proximity radius");
            }
        }

        alerts
    }
}

/// Located sites with a known distance, one per name (the closest), in order of each
/// name's first appearance.
fn closest_by_name(from: Point, sites: &[Arc<Site>]) -> Vec<(&Arc<Site>, Point, f64)> {
    let mut closest: Vec<(&Arc<Site>, Point, f64)> = Vec::with_capacity(sites.len());
    let mut slots: HashMap<&SiteIdentifier, usize> = HashMap::with_capacity(sites.len());

    for site in sites {
        let Some(location) = site.location else {
            continue;
        };

        let distance = distance_between(from, location);
        if distance.is_nan() {
            continue;
        }

        match slots.entry(&site.id) {
            Entry::Occupied(slot) => {
                let entry = &mut closest[*slot.get()];
                if distance < entry.2 {
                    *entry = (site, location, distance);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(closest.len());
                closest.push((site, location, distance));
            }
        }
    }

    closest
}


#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::testing::*;
    use super::*;

    fn alert_count(monitor: &mut ProximityMonitor, sites: &[Arc<Site>], path: &[f64]) -> usize {
        path.iter()
            .map(|meters| monitor.observe(&user_at(*meters), sites).len())
            .sum()
    }

    #[test]
    fn test_test_positions_are_where_we_say() {
        let distance = distance_between(user_at(300.0).location, site_at_edinburgh("A").location.unwrap());
        assert_relative_eq!(distance, 300.0, epsilon = 1e-6);
    }

    #[test]
    fn test_entering_radius_alerts_once() {
        let sites = vec![site_at_edinburgh("Site A")];
        let mut monitor = ProximityMonitor::new(500.0);

        assert!(monitor.observe(&user_at(600.0), &sites).is_empty());
        let alerts = monitor.observe(&user_at(300.0), &sites);

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].site.name(), "Site A");
        assert_relative_eq!(alerts[0].distance_m, 300.0, epsilon = 1e-6);
        // User is due south, so the site is due north
        assert!(alerts[0].bearing_deg < 1e-6 || alerts[0].bearing_deg > 360.0 - 1e-6);
    }

    #[test]
    fn test_lingering_does_not_repeat() {
        let sites = vec![site_at_edinburgh("Site A")];
        let mut monitor = ProximityMonitor::new(500.0);

        assert_eq!(alert_count(&mut monitor, &sites, &[300.0, 300.0, 250.0]), 1);
        assert!(monitor.is_near(&SiteIdentifier::new("Site A")));
    }

    #[test]
    fn test_leaving_and_returning_alerts_again() {
        let sites = vec![site_at_edinburgh("Site A")];
        let mut monitor = ProximityMonitor::new(500.0);

        assert_eq!(alert_count(&mut monitor, &sites, &[300.0, 600.0, 300.0]), 2);
    }

    #[test]
    fn test_boundary_is_not_near() {
        let sites = vec![site_at_edinburgh("Site A")];
        let mut monitor = ProximityMonitor::new(500.0);

        assert_eq!(alert_count(&mut monitor, &sites, &[500.5, 501.0]), 0);
        assert!(!monitor.is_near(&SiteIdentifier::new("Site A")));
    }

    #[test]
    fn test_unlocated_sites_are_skipped() {
        let sites = vec![Arc::new(Site::builder("Nowhere").build()), site_at_edinburgh("Site A")];
        let mut monitor = ProximityMonitor::new(500.0);

        let alerts = monitor.observe(&user_at(100.0), &sites);
        assert_eq!(alerts.len(), 1);
        assert!(!monitor.is_near(&SiteIdentifier::new("Nowhere")));
    }

    #[test]
    fn test_nan_position_changes_nothing() {
        let sites = vec![site_at_edinburgh("Site A")];
        let mut monitor = ProximityMonitor::new(500.0);
        monitor.observe(&user_at(100.0), &sites);

        assert!(monitor.observe(&Position::new(f64::NAN, 0.0), &sites).is_empty());
        assert!(monitor.is_near(&SiteIdentifier::new("Site A")));
        // Still near, so coming back is not a new entry
        assert!(monitor.observe(&user_at(100.0), &sites).is_empty());
    }

    #[test]
    fn test_sites_are_tracked_independently() {
        let a = site_at_edinburgh("Site A");
        let far = Arc::new(
            Site::builder("Site B")
                .location(geo::Point::new(-4.2518, 55.8642))
                .build(),
        );
        let sites = vec![a, far];
        let mut monitor = ProximityMonitor::new(500.0);

        let alerts = monitor.observe(&user_at(200.0), &sites);
        assert_eq!(alerts.len(), 1);
        assert!(!monitor.is_near(&SiteIdentifier::new("Site B")));
    }

    #[test]
    fn test_shared_name_lingering_alerts_once() {
        let glasgow_twin = Arc::new(
            Site::builder("Twin")
                .location(Point::new(-4.2518, 55.8642))
                .build(),
        );
        let sites = vec![site_at_edinburgh("Twin"), glasgow_twin.clone()];
        let mut monitor = ProximityMonitor::new(500.0);

        let per_update: Vec<usize> = (0..3)
            .map(|_| monitor.observe(&user_at(300.0), &sites).len())
            .collect();
        assert_eq!(per_update, [1, 0, 0]);
        assert!(monitor.is_near(&SiteIdentifier::new("Twin")));

        // Far copy listed first; the near one still decides
        let mut monitor = ProximityMonitor::new(500.0);
        let reversed = vec![glasgow_twin, site_at_edinburgh("Twin")];
        let alerts = monitor.observe(&user_at(300.0), &reversed);
        assert_eq!(alerts.len(), 1);
        assert_relative_eq!(alerts[0].distance_m, 300.0, epsilon = 1e-6);
        assert!(monitor.observe(&user_at(300.0), &reversed).is_empty());
    }

    #[test]
    fn test_removed_sites_are_forgotten() {
        let sites = vec![site_at_edinburgh("Site A")];
        let mut monitor = ProximityMonitor::new(500.0);

        monitor.observe(&user_at(100.0), &sites);
        assert!(monitor.is_near(&SiteIdentifier::new("Site A")));

        // Refreshed set without the site
        monitor.observe(&user_at(100.0), &[site_at_edinburgh("Site B")]);
        assert!(!monitor.is_near(&SiteIdentifier::new("Site A")));
        assert_eq!(monitor.near.len(), 1);
    }
}
