use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::raid::Raid;
use super::state::{DEFAULT_EGG_WINDOW, RaidState};
use crate::places::ExFilter;
use crate::types::{Gym, NameError, NameKey, Named, Tier};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RaidMapError {
    #[error("Raid already exists at {0}")]
    AlreadyExists(NameKey),

    #[error("No raid at {0}")]
    NotFound(String),

    #[error("Invalid gym name: {0}")]
    Name(#[from] NameError),
}

/// Anything that identifies a raid's gym
#[derive(Debug, Clone, Copy)]
pub enum RaidTarget<'a> {
    Name(&'a str),
    Gym(&'a Gym),
    Raid(&'a Raid),
}

impl RaidTarget<'_> {
    fn key(&self) -> Result<NameKey, NameError> {
        match self {
            RaidTarget::Name(name) => NameKey::normalize(name),
            RaidTarget::Gym(gym) => Ok(gym.key().clone()),
            RaidTarget::Raid(raid) => Ok(raid.key().clone()),
        }
    }

    fn describe(&self) -> String {
        match self {
            RaidTarget::Name(name) => name.to_string(),
            RaidTarget::Gym(gym) => gym.name().to_string(),
            RaidTarget::Raid(raid) => raid.gym().name().to_string(),
        }
    }
}

impl<'a> From<&'a str> for RaidTarget<'a> {
    fn from(name: &'a str) -> Self {
        RaidTarget::Name(name)
    }
}

impl<'a> From<&'a Gym> for RaidTarget<'a> {
    fn from(gym: &'a Gym) -> Self {
        RaidTarget::Gym(gym)
    }
}

impl<'a> From<&'a Raid> for RaidTarget<'a> {
    fn from(raid: &'a Raid) -> Self {
        RaidTarget::Raid(raid)
    }
}

/// Filters for raid queries. Empty `states` means any state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaidLookupOptions {
    pub ex_filter: ExFilter,
    pub tier: Option<Tier>,
    pub states: Vec<RaidState>,
}

impl RaidLookupOptions {
    pub fn accepts(&self, raid: &Raid, now: DateTime<Utc>, egg_window: Duration) -> bool {
        self.ex_filter.accepts(raid.gym())
            && self.tier.is_none_or(|tier| raid.tier() == tier)
            && (self.states.is_empty()
                || self
                    .states
                    .contains(&raid.state_with_window(now, egg_window)))
    }
}

/// At most one raid per gym, keyed by the gym's normalized name
#[derive(Debug, Clone)]
pub struct RaidMap {
    raids: BTreeMap<NameKey, Raid>,
    egg_window: Duration,
}

impl RaidMap {
    pub fn new(egg_window: Duration) -> Self {
        Self {
            raids: BTreeMap::new(),
            egg_window,
        }
    }

    pub fn egg_window(&self) -> Duration {
        self.egg_window
    }

    /// Insert a raid at a gym that has none
    pub fn add(&mut self, raid: Raid) -> Result<&Raid, RaidMapError> {
        match self.raids.entry(raid.key().clone()) {
            Entry::Occupied(entry) => Err(RaidMapError::AlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => Ok(&*entry.insert(raid)),
        }
    }

    /// Insert or replace; returns the raid that was there before
    pub fn swap(&mut self, raid: Raid) -> Option<Raid> {
        self.raids.insert(raid.key().clone(), raid)
    }

    pub fn add_or_update(&mut self, raid: Raid) -> Option<Raid> {
        self.swap(raid)
    }

    pub fn get<'a>(&self, target: impl Into<RaidTarget<'a>>) -> Option<&Raid> {
        let key = target.into().key().ok()?;
        self.raids.get(&key)
    }

    pub fn get_mut<'a>(&mut self, target: impl Into<RaidTarget<'a>>) -> Option<&mut Raid> {
        let key = target.into().key().ok()?;
        self.raids.get_mut(&key)
    }

    pub fn contains<'a>(&self, target: impl Into<RaidTarget<'a>>) -> bool {
        self.get(target).is_some()
    }

    pub fn remove<'a>(&mut self, target: impl Into<RaidTarget<'a>>) -> Result<Raid, RaidMapError> {
        let target = target.into();
        let key = target.key()?;
        self.raids
            .remove(&key)
            .ok_or_else(|| RaidMapError::NotFound(target.describe()))
    }

    /// Raids at the given gyms, in the order the gyms were given.
    /// Gyms without a raid are skipped.
    pub fn get_raids_at_gyms(
        &self,
        gyms: &[Rc<Gym>],
        options: &RaidLookupOptions,
        now: DateTime<Utc>,
    ) -> Vec<&Raid> {
        gyms.iter()
            .filter_map(|gym| self.raids.get(gym.key()))
            .filter(|raid| options.accepts(raid, now, self.egg_window))
            .collect()
    }

    /// Every raid matching `options`, in schedule order
    pub fn scheduled(&self, options: &RaidLookupOptions, now: DateTime<Utc>) -> Vec<&Raid> {
        let mut raids: Vec<&Raid> = self
            .raids
            .values()
            .filter(|raid| options.accepts(raid, now, self.egg_window))
            .collect();
        raids.sort_by(|a, b| a.cmp_schedule(b));
        raids
    }

    pub fn keys(&self) -> impl Iterator<Item = &NameKey> {
        self.raids.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Raid> {
        self.raids.values()
    }

    pub fn len(&self) -> usize {
        self.raids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raids.is_empty()
    }
}

impl Default for RaidMap {
    fn default() -> Self {
        Self::new(DEFAULT_EGG_WINDOW)
    }
}
