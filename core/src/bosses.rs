//! Boss directory and tier-grouped loading
//!
//! Bosses are loaded one tier group at a time. Each group is built in two
//! phases: every boss is constructed inactive, then the group's status
//! entries are reconciled onto that list. Nothing reaches the directory
//! until the whole group (or the whole file, for [`BossDirectory::from_tier_groups`])
//! has validated.

use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use raidbook_records::TierGroupRecord;
use thiserror::Error;

use crate::directory::{Directory, DirectoryConfig, DirectoryError, LookupFlags, Scored};
use crate::types::{Boss, BossActivity, BossError, NameError, NameKey, Named, Tier};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BossLoadError {
    #[error("Invalid tier {0}")]
    InvalidTier(u8),

    #[error("Invalid boss {name:?}: {source}")]
    Boss { name: String, source: BossError },

    #[error("Invalid boss name in status: {0}")]
    StatusName(#[from] NameError),

    #[error("Status for {tier} references unknown boss {name:?}")]
    UnknownBoss { tier: Tier, name: String },

    #[error("Status for boss {0:?} is set more than once")]
    DuplicateStatus(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Domain filters for boss lookups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BossLookupOptions {
    pub tier: Option<Tier>,
    /// `Some(true)` keeps only bosses active at the lookup time,
    /// `Some(false)` only inactive ones.
    pub is_active: Option<bool>,
    pub flags: LookupFlags,
}

pub struct BossDirectory {
    directory: Directory<Boss>,
}

impl BossDirectory {
    pub fn new(config: DirectoryConfig) -> Self {
        Self {
            directory: Directory::new(config),
        }
    }

    /// Build a directory from a parsed boss file, all groups or nothing
    pub fn from_tier_groups(
        groups: &[TierGroupRecord],
        config: DirectoryConfig,
    ) -> Result<Self, BossLoadError> {
        let mut bosses = Vec::new();
        for group in groups {
            bosses.extend(build_tier(group)?);
        }

        let mut directory = Self::new(config);
        directory.directory.add_range(bosses)?;
        tracing::debug!(groups = groups.len(), bosses = directory.len(), "loaded boss directory");
        Ok(directory)
    }

    /// Add one tier group. On error the directory is unchanged.
    pub fn load_tier(&mut self, group: &TierGroupRecord) -> Result<Vec<Rc<Boss>>, BossLoadError> {
        let bosses = self.directory.add_range(build_tier(group)?)?;
        tracing::debug!(tier = group.tier, bosses = bosses.len(), "loaded boss tier");
        Ok(bosses)
    }

    pub fn add(&mut self, boss: Boss) -> Result<Rc<Boss>, DirectoryError> {
        self.directory.add(boss)
    }

    pub fn directory(&self) -> &Directory<Boss> {
        &self.directory
    }

    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Boss>> {
        self.directory.iter()
    }

    pub fn get(&self, name: &str) -> Result<Option<Rc<Boss>>, DirectoryError> {
        self.directory.get(name)
    }

    pub fn lookup(
        &self,
        name: &str,
        options: &BossLookupOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<Scored<Boss>>, DirectoryError> {
        let keep = |boss: &Boss| {
            options.tier.is_none_or(|tier| boss.tier() == tier)
                && options.is_active.is_none_or(|active| boss.is_active_at(now) == active)
        };
        let adjust = |candidates: Vec<Scored<Boss>>| -> Vec<Scored<Boss>> {
            candidates.into_iter().filter(|c| keep(c.item.as_ref())).collect()
        };
        self.directory.lookup(name, &options.flags, &adjust)
    }

    /// Bosses of `tier` in rotation at `now`, in load order
    pub fn active_bosses(&self, tier: Tier, now: DateTime<Utc>) -> Vec<Rc<Boss>> {
        self.directory
            .iter()
            .filter(|boss| boss.tier() == tier && boss.is_active_at(now))
            .cloned()
            .collect()
    }
}

impl Default for BossDirectory {
    fn default() -> Self {
        Self::new(DirectoryConfig::default())
    }
}

fn build_tier(group: &TierGroupRecord) -> Result<Vec<Boss>, BossLoadError> {
    let tier = Tier::from_number(group.tier).ok_or(BossLoadError::InvalidTier(group.tier))?;

    let bosses = group
        .bosses
        .iter()
        .map(|record| {
            Boss::from_record(record, tier).map_err(|source| BossLoadError::Boss {
                name: record.name.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let positions: HashMap<&NameKey, usize> = bosses
        .iter()
        .enumerate()
        .map(|(i, b)| (b.key(), i))
        .collect();
    let mut statuses: Vec<Option<BossActivity>> = vec![None; bosses.len()];
    for status in &group.status {
        let active =
            BossActivity::from_record(&status.active).map_err(|source| BossLoadError::Boss {
                name: status.bosses.join(", "),
                source,
            })?;
        for name in &status.bosses {
            let key = NameKey::normalize(name)?;
            let &index = positions.get(&key).ok_or_else(|| BossLoadError::UnknownBoss {
                tier,
                name: name.clone(),
            })?;
            if statuses[index].replace(active).is_some() {
                return Err(BossLoadError::DuplicateStatus(name.clone()));
            }
        }
    }

    Ok(bosses
        .into_iter()
        .zip(statuses)
        .map(|(boss, status)| match status {
            Some(active) => boss.with_active(active),
            None => boss,
        })
        .collect())
}
