//! Gyms

use raidbook_records::{GymRecord, parse_gym_record};
use serde_json::Value;

use super::geo::Coord;
use super::name::{NameKey, Named};
use super::poi::{Place, Poi, PoiError};
use crate::directory::Keyed;

/// A raid-hosting point of interest
#[derive(Debug, Clone, PartialEq)]
pub struct Gym {
    poi: Poi,
    is_ex_eligible: bool,
}

impl Gym {
    pub fn new(poi: Poi, is_ex_eligible: bool) -> Self {
        Self { poi, is_ex_eligible }
    }

    /// Build from a parsed record, validating names and coordinates
    pub fn from_record(record: &GymRecord) -> Result<Self, PoiError> {
        let coord = Coord::new(record.latitude, record.longitude)?;
        let poi = Poi::new(
            record.name(),
            record.alternate_names(),
            &record.city,
            record.zones.as_slice(),
            coord,
        )?;
        Ok(Self::new(poi, record.is_ex_eligible))
    }

    pub fn to_record(&self) -> GymRecord {
        let mut names = vec![self.poi.name().to_string()];
        names.extend(self.poi.alternate_names().iter().cloned());
        GymRecord {
            names,
            city: self.poi.city().to_string(),
            zones: self.poi.zones().to_vec(),
            latitude: self.poi.coord().latitude,
            longitude: self.poi.coord().longitude,
            is_ex_eligible: self.is_ex_eligible,
        }
    }

    /// Parse the positional array form
    pub fn from_array(value: &Value) -> anyhow::Result<Self> {
        Self::from_value(value)
    }

    /// Parse the object form
    pub fn from_json(value: &Value) -> anyhow::Result<Self> {
        Self::from_value(value)
    }

    fn from_value(value: &Value) -> anyhow::Result<Self> {
        let record = parse_gym_record(value)?;
        Ok(Self::from_record(&record)?)
    }

    pub fn to_array(&self) -> Value {
        self.to_record().to_array()
    }

    pub fn to_json(&self) -> Value {
        self.to_record().to_json()
    }

    pub fn poi(&self) -> &Poi {
        &self.poi
    }

    pub fn is_ex_eligible(&self) -> bool {
        self.is_ex_eligible
    }

    pub fn alternate_names(&self) -> &[String] {
        self.poi.alternate_names()
    }
}

impl Named for Gym {
    fn name(&self) -> &str {
        self.poi.name()
    }

    fn key(&self) -> &NameKey {
        self.poi.key()
    }
}

impl Place for Gym {
    fn city(&self) -> &str {
        self.poi.city()
    }

    fn city_key(&self) -> &NameKey {
        self.poi.city_key()
    }

    fn zones(&self) -> &[String] {
        self.poi.zones()
    }

    fn zone_keys(&self) -> &[NameKey] {
        self.poi.zone_keys()
    }

    fn coord(&self) -> &Coord {
        self.poi.coord()
    }
}

impl Keyed for Gym {
    fn field_keys(&self, field: &str) -> &[NameKey] {
        self.poi.field_keys(field)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Gym {
        Gym::from_json(&json!({
            "zones": ["Downtown", "Belltown"],
            "city": "Seattle",
            "name": "Space Needle",
            "alternateNames": ["Needle"],
            "coord": { "latitude": 47.6205, "longitude": -122.3493 },
            "isExEligible": true
        }))
        .unwrap()
    }

    #[test]
    fn test_from_json() {
        let gym = sample();

        assert_eq!(gym.name(), "Space Needle");
        assert_eq!(gym.key().as_str(), "spaceneedle");
        assert_eq!(gym.zones().len(), 2);
        assert!(gym.is_ex_eligible());
    }

    #[test]
    fn test_array_round_trip() {
        let gym = sample();
        assert_eq!(Gym::from_array(&gym.to_array()).unwrap(), gym);
    }

    #[test]
    fn test_json_round_trip() {
        let gym = sample();
        assert_eq!(Gym::from_json(&gym.to_json()).unwrap(), gym);
    }

    #[test]
    fn test_from_record_rejects_bad_coord() {
        let result = Gym::from_array(&json!(["Downtown", "Seattle", "Broken", 95.0, 0.0, false]));
        let err = result.unwrap_err();

        assert!(matches!(err.downcast_ref::<PoiError>(), Some(PoiError::Geo(_))));
    }
}
