//! Place lookup options and categorization
//!
//! Every candidate lands in exactly one [`Category`]. Disallowed and
//! filtered-out candidates are dropped; the rest are ranked by how well
//! they match the preferred cities and zones.

use std::collections::HashSet;

use crate::directory::{LookupFlags, ResultAdjuster, Scored};
use crate::types::{Coord, NameError, NameKey, Place, Region};

/// Options accepted by place lookups. Names are display names and are
/// normalized when the options are resolved.
#[derive(Debug, Clone, Default)]
pub struct PlaceLookupOptions {
    /// Candidate's city must be one of these
    pub allowed_cities: Vec<String>,
    /// Candidate must be in at least one of these zones
    pub allowed_zones: Vec<String>,
    /// Candidate's city must be one of these
    pub required_cities: Vec<String>,
    /// Candidate must be in every one of these zones
    pub required_zones: Vec<String>,
    pub preferred_cities: Vec<String>,
    pub preferred_zones: Vec<String>,
    /// Center of the radius filter
    pub near: Option<Coord>,
    /// Radius around `near`, in kilometres
    pub radius_km: Option<f64>,
    pub region: Option<Region>,
    pub no_text_search: bool,
    pub no_exact_lookup: bool,
}

impl PlaceLookupOptions {
    pub fn flags(&self) -> LookupFlags {
        LookupFlags {
            no_exact_lookup: self.no_exact_lookup,
            no_text_search: self.no_text_search,
        }
    }

    /// Normalize every name in the options
    pub fn resolve(&self) -> Result<PlaceCriteria, NameError> {
        Ok(PlaceCriteria {
            allowed_cities: key_set(&self.allowed_cities)?,
            allowed_zones: key_set(&self.allowed_zones)?,
            required_cities: key_set(&self.required_cities)?,
            required_zones: key_set(&self.required_zones)?,
            preferred_cities: key_set(&self.preferred_cities)?.unwrap_or_default(),
            preferred_zones: key_set(&self.preferred_zones)?.unwrap_or_default(),
            near: match (self.near, self.radius_km) {
                (Some(center), Some(radius)) => Some((center, radius)),
                _ => None,
            },
            region: self.region,
        })
    }
}

// Empty lists mean "no constraint"
fn key_set(names: &[String]) -> Result<Option<HashSet<NameKey>>, NameError> {
    if names.is_empty() {
        return Ok(None);
    }
    Ok(Some(NameKey::normalize_all(names)?.into_iter().collect()))
}

/// Where a candidate ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Fails an allowed/required city or zone constraint
    Disallowed,
    /// Fails the geographic filters or the caller's predicate
    FilteredOut,
    Matched(MatchTier),
}

/// Ranking of an acceptable candidate, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    CityAndZone,
    City,
    Zone,
    Unmatched,
}

impl MatchTier {
    /// Multiplier applied to the candidate's lookup score
    pub fn score(&self) -> f64 {
        match self {
            MatchTier::CityAndZone => 1.0,
            MatchTier::City => 0.9,
            MatchTier::Zone => 0.8,
            MatchTier::Unmatched => 0.7,
        }
    }
}

/// Candidates sorted into categories, original order kept within each
#[derive(Debug)]
pub struct Categorized<T> {
    pub disallowed: Vec<Scored<T>>,
    pub filtered_out: Vec<Scored<T>>,
    /// Indexed by `MatchTier as usize`
    pub matched: [Vec<Scored<T>>; 4],
}

impl<T> Categorized<T> {
    pub fn tier(&self, tier: MatchTier) -> &[Scored<T>] {
        &self.matched[tier as usize]
    }
}

/// Resolved, normalized form of [`PlaceLookupOptions`]
#[derive(Debug, Clone, Default)]
pub struct PlaceCriteria {
    allowed_cities: Option<HashSet<NameKey>>,
    allowed_zones: Option<HashSet<NameKey>>,
    required_cities: Option<HashSet<NameKey>>,
    required_zones: Option<HashSet<NameKey>>,
    preferred_cities: HashSet<NameKey>,
    preferred_zones: HashSet<NameKey>,
    near: Option<(Coord, f64)>,
    region: Option<Region>,
}

impl PlaceCriteria {
    pub fn has_preferences(&self) -> bool {
        !self.preferred_cities.is_empty() || !self.preferred_zones.is_empty()
    }

    pub fn categorize<T: Place>(&self, place: &T, filter: Option<&dyn Fn(&T) -> bool>) -> Category {
        let city = place.city_key();
        let zones = place.zone_keys();

        let allowed = self.allowed_cities.as_ref().is_none_or(|c| c.contains(city))
            && self.required_cities.as_ref().is_none_or(|c| c.contains(city))
            && self
                .allowed_zones
                .as_ref()
                .is_none_or(|allowed| zones.iter().any(|z| allowed.contains(z)))
            && self
                .required_zones
                .as_ref()
                .is_none_or(|required| required.iter().all(|r| zones.contains(r)));
        if !allowed {
            return Category::Disallowed;
        }

        let coord = place.coord();
        let in_range = self
            .near
            .is_none_or(|(center, radius)| center.distance_km(coord) <= radius)
            && self.region.is_none_or(|region| region.contains(coord));
        if !in_range || filter.is_some_and(|f| !f(place)) {
            return Category::FilteredOut;
        }

        let city_match = self.preferred_cities.contains(city);
        let zone_match = zones.iter().any(|z| self.preferred_zones.contains(z));
        Category::Matched(match (city_match, zone_match) {
            (true, true) => MatchTier::CityAndZone,
            (true, false) => MatchTier::City,
            (false, true) => MatchTier::Zone,
            (false, false) => MatchTier::Unmatched,
        })
    }

    pub fn categorize_all<T: Place>(
        &self,
        candidates: Vec<Scored<T>>,
        filter: Option<&dyn Fn(&T) -> bool>,
    ) -> Categorized<T> {
        let mut result = Categorized {
            disallowed: Vec::new(),
            filtered_out: Vec::new(),
            matched: Default::default(),
        };
        for candidate in candidates {
            match self.categorize(candidate.item.as_ref(), filter) {
                Category::Disallowed => result.disallowed.push(candidate),
                Category::FilteredOut => result.filtered_out.push(candidate),
                Category::Matched(tier) => result.matched[tier as usize].push(candidate),
            }
        }
        result
    }

    /// Drop unacceptable candidates and fold the match tier into each score.
    ///
    /// Ties keep their original order. Without any preferred city or zone
    /// every candidate is in the same tier and scores are left as they are.
    pub fn rank<T: Place>(
        &self,
        candidates: Vec<Scored<T>>,
        filter: Option<&dyn Fn(&T) -> bool>,
    ) -> Vec<Scored<T>> {
        let weighted = self.has_preferences();
        let mut ranked: Vec<Scored<T>> = candidates
            .into_iter()
            .filter_map(|candidate| match self.categorize(candidate.item.as_ref(), filter) {
                Category::Matched(tier) if weighted => {
                    let score = candidate.score * tier.score();
                    Some(Scored::new(candidate.item, score))
                }
                Category::Matched(_) => Some(candidate),
                Category::Disallowed | Category::FilteredOut => None,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}

/// Plugs [`PlaceCriteria::rank`] into directory lookups
pub struct PlaceAdjuster<'a, T> {
    pub criteria: &'a PlaceCriteria,
    pub filter: Option<&'a dyn Fn(&T) -> bool>,
}

impl<T: Place> ResultAdjuster<T> for PlaceAdjuster<'_, T> {
    fn adjust(&self, candidates: Vec<Scored<T>>) -> Vec<Scored<T>> {
        self.criteria.rank(candidates, self.filter)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::types::Poi;

    fn poi(name: &str, city: &str, zones: &[&str], lat: f64, lon: f64) -> Scored<Poi> {
        let none: [&str; 0] = [];
        let poi = Poi::new(name, &none, city, zones, Coord::new(lat, lon).unwrap()).unwrap();
        Scored::exact(Rc::new(poi))
    }

    fn candidates() -> Vec<Scored<Poi>> {
        vec![
            poi("Unmatched", "City C", &["Zone 3"], 47.0, -122.0),
            poi("Zone Only", "City B", &["Zone 1"], 47.1, -122.1),
            poi("City Only", "City A", &["Zone 2"], 47.2, -122.2),
            poi("Both", "City A", &["Zone 1", "Zone 2"], 47.3, -122.3),
        ]
    }

    fn names(results: &[Scored<Poi>]) -> Vec<String> {
        use crate::types::Named;
        results.iter().map(|r| r.item.name().to_string()).collect()
    }

    #[test]
    fn test_preferred_tiers_rank_strictly() {
        let options = PlaceLookupOptions {
            preferred_cities: vec!["City A".to_string()],
            preferred_zones: vec!["Zone 1".to_string()],
            ..Default::default()
        };
        let ranked = options.resolve().unwrap().rank(candidates(), None);

        assert_eq!(
            names(&ranked),
            vec!["Both", "City Only", "Zone Only", "Unmatched"]
        );
        assert!(ranked.windows(2).all(|w| w[0].score > w[1].score));
        assert_eq!(ranked[0].score, 1.0);
        assert_eq!(ranked[3].score, 0.7);
    }

    #[test]
    fn test_tier_composes_with_match_score() {
        let options = PlaceLookupOptions {
            preferred_cities: vec!["City A".to_string()],
            ..Default::default()
        };
        let mut input = candidates();
        input[3].score = 0.5; // "Both" was a weak fuzzy match
        let ranked = options.resolve().unwrap().rank(input, None);

        assert_eq!(names(&ranked)[0], "City Only");
        assert_eq!(ranked.last().map(|r| r.score), Some(0.45));
    }

    #[test]
    fn test_no_preferences_keeps_scores_and_order() {
        let ranked = PlaceLookupOptions::default().resolve().unwrap().rank(candidates(), None);

        assert_eq!(
            names(&ranked),
            vec!["Unmatched", "Zone Only", "City Only", "Both"]
        );
        assert!(ranked.iter().all(|r| r.score == 1.0));
    }

    #[test]
    fn test_allowed_and_required() {
        let options = PlaceLookupOptions {
            allowed_cities: vec!["city a".to_string(), "City B".to_string()],
            required_zones: vec!["Zone 1".to_string()],
            ..Default::default()
        };
        let criteria = options.resolve().unwrap();
        let categorized = criteria.categorize_all(candidates(), None);

        assert_eq!(
            names(&categorized.disallowed),
            vec!["Unmatched", "City Only"]
        );
        assert_eq!(
            names(categorized.tier(MatchTier::Unmatched)),
            vec!["Zone Only", "Both"]
        );
    }

    #[test]
    fn test_allowed_zones_needs_one_overlap() {
        let options = PlaceLookupOptions {
            allowed_zones: vec!["Zone 2".to_string()],
            ..Default::default()
        };
        let ranked = options.resolve().unwrap().rank(candidates(), None);

        assert_eq!(names(&ranked), vec!["City Only", "Both"]);
    }

    #[test]
    fn test_geographic_filters() {
        let options = PlaceLookupOptions {
            near: Some(Coord::new(47.0, -122.0).unwrap()),
            radius_km: Some(20.0),
            ..Default::default()
        };
        let categorized = options.resolve().unwrap().categorize_all(candidates(), None);
        assert_eq!(
            names(categorized.tier(MatchTier::Unmatched)),
            vec!["Unmatched", "Zone Only"]
        );
        assert_eq!(categorized.filtered_out.len(), 2);

        let options = PlaceLookupOptions {
            region: Some(
                Region::new(
                    Coord::new(47.15, -122.5).unwrap(),
                    Coord::new(47.5, -122.0).unwrap(),
                )
                .unwrap(),
            ),
            ..Default::default()
        };
        let ranked = options.resolve().unwrap().rank(candidates(), None);
        assert_eq!(names(&ranked), vec!["City Only", "Both"]);
    }

    #[test]
    fn test_predicate_filters_out() {
        use crate::types::Named;
        let criteria = PlaceLookupOptions::default().resolve().unwrap();
        let not_both = |p: &Poi| p.name() != "Both";
        let categorized = criteria.categorize_all(candidates(), Some(&not_both));

        assert_eq!(names(&categorized.filtered_out), vec!["Both"]);
        assert!(categorized.disallowed.is_empty());
    }

    #[test]
    fn test_resolve_rejects_blank_names() {
        let options = PlaceLookupOptions {
            preferred_zones: vec![" ".to_string()],
            ..Default::default()
        };
        assert_eq!(options.resolve().unwrap_err(), NameError::Empty);
    }
}
