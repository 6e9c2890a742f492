//! Turns the full site set into the ranked list shown to the user.
//!
//! Steps run in a fixed order: name search, location filter, network filter, then
//! favorites first. Sorting by distance to the user replaces the favorites step.

use std::sync::Arc;

use geo::Point;
use itertools::{Either, Itertools};
use larder_sites::prelude::*;

use crate::favorites::FavoriteSet;
use crate::location::Position;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LocationFilter {
    #[default]
    None,
    /// Order by distance from the user's position, nearest first.
    NearestToUser,
    /// Keep only sites at exactly this coordinate.
    ExactCoordinate { latitude: f64, longitude: f64 },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NetworkFilter {
    #[default]
    Any,
    Only(Network),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SiteQuery {
    pub search_text: String,
    pub location: LocationFilter,
    pub network: NetworkFilter,
}

/// A site in display order. `distance_m` is set when the list was ranked by
/// distance and the site's distance is known.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedSite {
    pub site: Arc<Site>,
    pub distance_m: Option<f64>,
}

/// Read-only inputs for one pipeline run.
pub struct FilterSortPipeline<'a> {
    pub favorites: &'a FavoriteSet,
    pub position: Option<&'a Position>,
}

impl<'a> FilterSortPipeline<'a> {
    pub fn new(favorites: &'a FavoriteSet, position: Option<&'a Position>) -> Self {
        Self {
            favorites,
            position,
        }
    }

    pub fn run(&self, sites: &[Arc<Site>], query: &SiteQuery) -> Vec<RankedSite> {
        let mut ranked: Vec<RankedSite> = matching_name(sites, &query.search_text)
            .map(|site| RankedSite {
                site: site.clone(),
                distance_m: None,
            })
            .collect();

        let mut sorted_by_distance = false;
        match query.location {
            LocationFilter::None => {}
            LocationFilter::NearestToUser => {
                if let Some(position) = self.position {
                    ranked = by_distance(ranked, position.location);
                    sorted_by_distance = true;
                } else {
                    tracing::debug!("no position yet, skipping distance sort");
                }
            }
            LocationFilter::ExactCoordinate {
                latitude,
                longitude,
            } => {
                let target = Point::new(longitude, latitude);
                ranked.retain(|r| r.site.location == Some(target));
            }
        }

        if let NetworkFilter::Only(network) = &query.network {
            ranked.retain(|r| &r.site.network == network);
        }

        if query.location != LocationFilter::NearestToUser {
            ranked = favorites_first(ranked, self.favorites);
        }

        tracing::trace!(count = ranked.len(), sorted_by_distance, "filtered sites");
        ranked
    }
}

fn matching_name<'s>(
    sites: &'s [Arc<Site>],
    search_text: &str,
) -> impl Iterator<Item = &'s Arc<Site>> {
    let needle = search_text.to_lowercase();
    sites
        .iter()
        .filter(move |site| needle.is_empty() || site.name().to_lowercase().contains(&needle))
}

/// Nearest first. Sites with no usable distance keep their order after the rest.
fn by_distance(ranked: Vec<RankedSite>, from: Point) -> Vec<RankedSite> {
    let (mut known, unknown): (Vec<RankedSite>, Vec<RankedSite>) =
        ranked.into_iter().partition_map(|r| {
            let distance = r
                .site
                .location
                .map(|location| distance_between(from, location))
                .filter(|d| d.is_finite());

            match distance {
                Some(d) => Either::Left(RankedSite {
                    distance_m: Some(d),
                    ..r
                }),
                None => Either::Right(r),
            }
        });

    known.sort_by(|a, b| {
        let (a, b) = (a.distance_m.unwrap_or(f64::MAX), b.distance_m.unwrap_or(f64::MAX));
        a.total_cmp(&b)
    });
    known.extend(unknown);
    known
}

/// Stable partition: favorites move to the front, both groups keep their order.
fn favorites_first(ranked: Vec<RankedSite>, favorites: &FavoriteSet) -> Vec<RankedSite> {
    if favorites.is_empty() {
        return ranked;
    }

    let (mut favored, rest): (Vec<RankedSite>, Vec<RankedSite>) = ranked
        .into_iter()
        .partition(|r| favorites.contains(&r.site.id));
    favored.extend(rest);
    favored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str, lat: f64, lon: f64, network: &str) -> Arc<Site> {
        Arc::new(
            Site::builder(name)
                .location(Point::new(lon, lat))
                .network(Network::parse(network))
                .build(),
        )
    }

    fn names(ranked: &[RankedSite]) -> Vec<&str> {
        ranked.iter().map(|r| r.site.name()).collect()
    }

    fn sample() -> Vec<Arc<Site>> {
        vec![
            site("Glasgow Community Larder", 55.8642, -4.2518, "Independent"),
            site("Dundee Foodbank", 56.4620, -2.9707, "Trussell Trust"),
            site("Leith Community Pantry", 55.9760, -3.1700, "IFAN"),
            Arc::new(Site::builder("Portree community shelf").network(Network::parse("Independent")).build()),
            site("Edinburgh Central", 55.9533, -3.1883, "Trussell Trust"),
        ]
    }

    #[test]
    fn test_search_text_is_case_insensitive_substring() {
        let favorites = FavoriteSet::new();
        let pipeline = FilterSortPipeline::new(&favorites, None);
        let query = SiteQuery {
            search_text: "Community".into(),
            ..Default::default()
        };

        let result = pipeline.run(&sample(), &query);
        assert_eq!(
            names(&result),
            ["Glasgow Community Larder", "Leith Community Pantry", "Portree community shelf"]
        );
    }

    #[test]
    fn test_empty_search_returns_everything() {
        let favorites = FavoriteSet::new();
        let pipeline = FilterSortPipeline::new(&favorites, None);

        let result = pipeline.run(&sample(), &SiteQuery::default());
        assert_eq!(result.len(), 5);
        assert!(result.iter().all(|r| r.distance_m.is_none()));
    }

    #[test]
    fn test_favorites_first_is_stable() {
        let sites = vec![
            site("Site B", 56.0, -3.0, "Independent"),
            site("Site A", 56.1, -3.1, "Independent"),
            site("Site C", 56.2, -3.2, "Independent"),
        ];
        let favorites: FavoriteSet = ["Site A"].into_iter().collect();
        let pipeline = FilterSortPipeline::new(&favorites, None);

        let result = pipeline.run(&sites, &SiteQuery::default());
        assert_eq!(names(&result), ["Site A", "Site B", "Site C"]);
    }

    #[test]
    fn test_multiple_favorites_keep_relative_order() {
        let favorites: FavoriteSet = ["Edinburgh Central", "Glasgow Community Larder"]
            .into_iter()
            .collect();
        let pipeline = FilterSortPipeline::new(&favorites, None);

        let result = pipeline.run(&sample(), &SiteQuery::default());
        assert_eq!(
            names(&result),
            [
                "Glasgow Community Larder",
                "Edinburgh Central",
                "Dundee Foodbank",
                "Leith Community Pantry",
                "Portree community shelf",
            ]
        );
    }

    #[test]
    fn test_nearest_to_user_sorts_by_distance_and_ignores_favorites() {
        let favorites: FavoriteSet = ["Dundee Foodbank"].into_iter().collect();
        let user = Position::new(55.9500, -3.1900);
        let pipeline = FilterSortPipeline::new(&favorites, Some(&user));
        let query = SiteQuery {
            location: LocationFilter::NearestToUser,
            ..Default::default()
        };

        let result = pipeline.run(&sample(), &query);
        assert_eq!(
            names(&result),
            [
                "Edinburgh Central",
                "Leith Community Pantry",
                "Dundee Foodbank",
                "Glasgow Community Larder",
                "Portree community shelf",
            ]
        );
        assert!(result[0].distance_m.unwrap() < 1_000.0);
        assert!(result[4].distance_m.is_none());
    }

    #[test]
    fn test_nearest_to_user_without_position_keeps_order() {
        let favorites: FavoriteSet = ["Dundee Foodbank"].into_iter().collect();
        let pipeline = FilterSortPipeline::new(&favorites, None);
        let query = SiteQuery {
            location: LocationFilter::NearestToUser,
            ..Default::default()
        };

        let result = pipeline.run(&sample(), &query);
        assert_eq!(
            names(&result),
            [
                "Glasgow Community Larder",
                "Dundee Foodbank",
                "Leith Community Pantry",
                "Portree community shelf",
                "Edinburgh Central",
            ]
        );
    }

    #[test]
    fn test_exact_coordinate_match() {
        let favorites = FavoriteSet::new();
        let pipeline = FilterSortPipeline::new(&favorites, None);
        let query = SiteQuery {
            location: LocationFilter::ExactCoordinate {
                latitude: 56.4620,
                longitude: -2.9707,
            },
            ..Default::default()
        };

        let result = pipeline.run(&sample(), &query);
        assert_eq!(names(&result), ["Dundee Foodbank"]);

        let nowhere = SiteQuery {
            location: LocationFilter::ExactCoordinate {
                latitude: 56.4621,
                longitude: -2.9707,
            },
            ..Default::default()
        };
        assert!(pipeline.run(&sample(), &nowhere).is_empty());
    }

    #[test]
    fn test_network_filter() {
        let favorites = FavoriteSet::new();
        let pipeline = FilterSortPipeline::new(&favorites, None);
        let query = SiteQuery {
            network: NetworkFilter::Only(Network::parse("Trussell Trust")),
            ..Default::default()
        };

        let result = pipeline.run(&sample(), &query);
        assert_eq!(names(&result), ["Dundee Foodbank", "Edinburgh Central"]);
    }

    #[test]
    fn test_filters_compose() {
        let favorites: FavoriteSet = ["Portree community shelf"].into_iter().collect();
        let pipeline = FilterSortPipeline::new(&favorites, None);
        let query = SiteQuery {
            search_text: "COMMUNITY".into(),
            network: NetworkFilter::Only(Network::parse("Independent")),
            ..Default::default()
        };

        let result = pipeline.run(&sample(), &query);
        assert_eq!(
            names(&result),
            ["Portree community shelf", "Glasgow Community Larder"]
        );
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let favorites = FavoriteSet::new();
        let pipeline = FilterSortPipeline::new(&favorites, None);
        let query = SiteQuery {
            search_text: "zzz".into(),
            ..Default::default()
        };

        assert!(pipeline.run(&sample(), &query).is_empty());
    }
}
