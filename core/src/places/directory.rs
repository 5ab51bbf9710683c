use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use super::categorize::{PlaceAdjuster, PlaceLookupOptions};
use crate::directory::{Directory, DirectoryConfig, DirectoryError, Keyed, Scored};
use crate::types::{NameKey, Place};

/// A city and what the loaded places say about it
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    name: String,
    key: NameKey,
    zones: BTreeSet<NameKey>,
    places: Vec<NameKey>,
}

impl City {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &NameKey {
        &self.key
    }

    /// Zones that contain at least one place in this city
    pub fn zones(&self) -> impl Iterator<Item = &NameKey> {
        self.zones.iter()
    }

    /// Keys of the places in this city, in load order
    pub fn places(&self) -> &[NameKey] {
        &self.places
    }
}

/// A zone and the places in it. Zones may span cities.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    name: String,
    key: NameKey,
    cities: BTreeSet<NameKey>,
    places: Vec<NameKey>,
}

impl Zone {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &NameKey {
        &self.key
    }

    pub fn cities(&self) -> impl Iterator<Item = &NameKey> {
        self.cities.iter()
    }

    pub fn places(&self) -> &[NameKey] {
        &self.places
    }
}

/// A [`Directory`] of places that also tracks the cities and zones seen
pub struct PlaceDirectory<T> {
    directory: Directory<T>,
    cities: BTreeMap<NameKey, City>,
    zones: BTreeMap<NameKey, Zone>,
}

impl<T: Keyed + Place> PlaceDirectory<T> {
    pub fn new(config: DirectoryConfig) -> Self {
        Self {
            directory: Directory::new(config),
            cities: BTreeMap::new(),
            zones: BTreeMap::new(),
        }
    }

    /// The underlying directory, for key and field lookups
    pub fn directory(&self) -> &Directory<T> {
        &self.directory
    }

    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<T>> {
        self.directory.iter()
    }

    pub fn get(&self, name: &str) -> Result<Option<Rc<T>>, DirectoryError> {
        self.directory.get(name)
    }

    pub fn add(&mut self, place: T) -> Result<Rc<T>, DirectoryError> {
        let place = self.directory.add(place)?;
        self.register(&place);
        Ok(place)
    }

    /// Add all places or none
    pub fn add_range(&mut self, places: Vec<T>) -> Result<Vec<Rc<T>>, DirectoryError> {
        let places = self.directory.add_range(places)?;
        for place in &places {
            self.register(place);
        }
        Ok(places)
    }

    fn register(&mut self, place: &T) {
        let city_key = place.city_key();
        let city = self.cities.entry(city_key.clone()).or_insert_with(|| City {
            name: place.city().to_string(),
            key: city_key.clone(),
            zones: BTreeSet::new(),
            places: Vec::new(),
        });
        city.places.push(place.key().clone());
        city.zones.extend(place.zone_keys().iter().cloned());

        for (zone_name, zone_key) in place.zones().iter().zip(place.zone_keys()) {
            let zone = self.zones.entry(zone_key.clone()).or_insert_with(|| Zone {
                name: zone_name.clone(),
                key: zone_key.clone(),
                cities: BTreeSet::new(),
                places: Vec::new(),
            });
            zone.cities.insert(city_key.clone());
            zone.places.push(place.key().clone());
        }
    }

    /// Exact-then-fuzzy lookup, filtered and ranked by place criteria.
    ///
    /// `filter` runs after the city, zone and geographic checks; rejected
    /// places are dropped as filtered out.
    pub fn lookup(
        &self,
        name: &str,
        options: &PlaceLookupOptions,
        filter: Option<&dyn Fn(&T) -> bool>,
    ) -> Result<Vec<Scored<T>>, DirectoryError> {
        let criteria = options.resolve()?;
        let adjuster = PlaceAdjuster {
            criteria: &criteria,
            filter,
        };
        self.directory.lookup(name, &options.flags(), &adjuster)
    }

    pub fn city(&self, name: &str) -> Option<&City> {
        let key = NameKey::normalize(name).ok()?;
        self.cities.get(&key)
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        let key = NameKey::normalize(name).ok()?;
        self.zones.get(&key)
    }

    /// Cities ordered by key
    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }
}

impl<T: Keyed + Place> Default for PlaceDirectory<T> {
    fn default() -> Self {
        Self::new(DirectoryConfig::default())
    }
}
