//! Points of interest

use thiserror::Error;

use super::geo::{Coord, GeoError};
use super::name::{NameError, NameKey, Named};
use crate::directory::{ALTERNATE_NAMES_FIELD, Keyed, NAME_FIELD};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoiError {
    #[error("Invalid name: {0}")]
    Name(#[from] NameError),

    #[error("Invalid coordinates: {0}")]
    Geo(#[from] GeoError),

    #[error("Point of interest {0:?} must belong to at least one zone")]
    NoZones(String),
}

/// Something located in a city, in one or more zones, at a coordinate
pub trait Place: Named {
    fn city(&self) -> &str;

    fn city_key(&self) -> &NameKey;

    fn zones(&self) -> &[String];

    fn zone_keys(&self) -> &[NameKey];

    fn coord(&self) -> &Coord;
}

/// A named, geolocated place. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    name: String,
    key: NameKey,
    alternate_names: Vec<String>,
    alternate_keys: Vec<NameKey>,
    city: String,
    city_key: NameKey,
    zones: Vec<String>,
    zone_keys: Vec<NameKey>,
    coord: Coord,
}

impl Poi {
    pub fn new<S: AsRef<str>>(
        name: &str,
        alternate_names: &[S],
        city: &str,
        zones: &[S],
        coord: Coord,
    ) -> Result<Self, PoiError> {
        let key = NameKey::normalize(name)?;
        let alternate_keys = NameKey::normalize_all(alternate_names)?;
        let city_key = NameKey::normalize(city)?;
        if zones.is_empty() {
            return Err(PoiError::NoZones(name.to_string()));
        }
        let zone_keys = NameKey::normalize_all(zones)?;
        // Validate even if the caller built the coord by hand
        let coord = Coord::new(coord.latitude, coord.longitude)?;

        Ok(Self {
            name: name.trim().to_string(),
            key,
            alternate_names: alternate_names
                .iter()
                .map(|n| n.as_ref().trim().to_string())
                .collect(),
            alternate_keys,
            city: city.trim().to_string(),
            city_key,
            zones: zones.iter().map(|z| z.as_ref().trim().to_string()).collect(),
            zone_keys,
            coord,
        })
    }

    pub fn alternate_names(&self) -> &[String] {
        &self.alternate_names
    }

    pub fn alternate_keys(&self) -> &[NameKey] {
        &self.alternate_keys
    }
}

impl Named for Poi {
    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> &NameKey {
        &self.key
    }
}

impl Place for Poi {
    fn city(&self) -> &str {
        &self.city
    }

    fn city_key(&self) -> &NameKey {
        &self.city_key
    }

    fn zones(&self) -> &[String] {
        &self.zones
    }

    fn zone_keys(&self) -> &[NameKey] {
        &self.zone_keys
    }

    fn coord(&self) -> &Coord {
        &self.coord
    }
}

impl Keyed for Poi {
    fn field_keys(&self, field: &str) -> &[NameKey] {
        match field {
            NAME_FIELD => std::slice::from_ref(&self.key),
            ALTERNATE_NAMES_FIELD => &self.alternate_keys,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> Coord {
        Coord::new(47.61, -122.34).unwrap()
    }

    #[test]
    fn test_new_poi() {
        let poi = Poi::new(
            "Pike Place Market ",
            &["The Market"],
            "Seattle",
            &["Downtown"],
            coord(),
        )
        .unwrap();

        assert_eq!(poi.name(), "Pike Place Market");
        assert_eq!(poi.key().as_str(), "pikeplacemarket");
        assert_eq!(poi.city_key().as_str(), "seattle");
        assert_eq!(poi.zone_keys()[0].as_str(), "downtown");
        assert_eq!(
            poi.field_keys(ALTERNATE_NAMES_FIELD)[0].as_str(),
            "themarket"
        );
        assert!(poi.field_keys("nickname").is_empty());
    }

    #[test]
    fn test_poi_rejects_blank_names() {
        let none: [&str; 0] = [];
        assert!(matches!(
            Poi::new("  ", &none, "Seattle", &none, coord()),
            Err(PoiError::Name(NameError::Empty))
        ));
        assert!(matches!(
            Poi::new("Gym", &[""], "Seattle", &["Downtown"], coord()),
            Err(PoiError::Name(_))
        ));
        assert!(matches!(
            Poi::new("Gym", &none, "Seattle", &none, coord()),
            Err(PoiError::NoZones(_))
        ));
    }

    #[test]
    fn test_poi_rejects_bad_coord() {
        let bad = Coord {
            latitude: 123.0,
            longitude: 0.0,
        };
        let result = Poi::new("Gym", &["Alt"], "Seattle", &["Downtown"], bad);

        assert_eq!(
            result,
            Err(PoiError::Geo(GeoError::LatitudeOutOfRange(123.0)))
        );
    }
}
