//! Raid bosses

use chrono::{DateTime, Utc};
use raidbook_records::{ActiveRecord, BossRecord};
use thiserror::Error;

use super::name::{NameError, NameKey, Named};
use super::pokemon_type::PokemonType;
use super::tier::Tier;
use crate::directory::{ALTERNATE_NAMES_FIELD, Keyed, NAME_FIELD};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BossError {
    #[error("Invalid boss name: {0}")]
    Name(#[from] NameError),

    #[error("Unknown pokemon type {0:?}")]
    UnknownType(String),

    #[error("Invalid CP range {min}-{max}")]
    InvalidCpRange { min: u32, max: u32 },

    #[error("Date range starts after it ends")]
    InvertedDateRange,
}

/// Inclusive window of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, BossError> {
        if start > end {
            return Err(BossError::InvertedDateRange);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Whether a boss is in rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossActivity {
    Flag(bool),
    During(DateRange),
}

impl BossActivity {
    pub fn from_record(record: &ActiveRecord) -> Result<Self, BossError> {
        match record {
            ActiveRecord::Flag(active) => Ok(BossActivity::Flag(*active)),
            ActiveRecord::Window { start, end } => {
                Ok(BossActivity::During(DateRange::new(*start, *end)?))
            }
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            BossActivity::Flag(active) => *active,
            BossActivity::During(range) => range.contains(now),
        }
    }
}

impl Default for BossActivity {
    fn default() -> Self {
        BossActivity::Flag(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpRange {
    pub min: u32,
    pub max: u32,
}

impl CpRange {
    pub fn new(min: u32, max: u32) -> Result<Self, BossError> {
        if min > max {
            return Err(BossError::InvalidCpRange { min, max });
        }
        Ok(Self { min, max })
    }
}

/// A raid boss. Built once from a record, then only its activity may be
/// replaced while the tier it belongs to is being loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    name: String,
    key: NameKey,
    display_name: String,
    alternate_names: Vec<String>,
    alternate_keys: Vec<NameKey>,
    tier: Tier,
    pokedex_number: u16,
    cp_range: CpRange,
    boosted_cp_range: CpRange,
    types: Vec<PokemonType>,
    active: BossActivity,
}

impl Boss {
    /// Build an inactive boss from a record
    pub fn from_record(record: &BossRecord, tier: Tier) -> Result<Self, BossError> {
        let key = NameKey::normalize(&record.name)?;
        let alternate_keys = NameKey::normalize_all(record.alternate_names.as_slice())?;
        let types = record
            .types
            .iter()
            .map(|t| PokemonType::from_name(t).ok_or_else(|| BossError::UnknownType(t.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: record.name.trim().to_string(),
            key,
            display_name: record
                .display_name
                .clone()
                .unwrap_or_else(|| record.name.trim().to_string()),
            alternate_names: record.alternate_names.clone(),
            alternate_keys,
            tier,
            pokedex_number: record.pokedex_number,
            cp_range: CpRange::new(record.cp_range[0], record.cp_range[1])?,
            boosted_cp_range: CpRange::new(record.boosted_cp_range[0], record.boosted_cp_range[1])?,
            types,
            active: BossActivity::default(),
        })
    }

    /// Same boss with a different activity
    pub fn with_active(self, active: BossActivity) -> Self {
        Self { active, ..self }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn alternate_names(&self) -> &[String] {
        &self.alternate_names
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn pokedex_number(&self) -> u16 {
        self.pokedex_number
    }

    pub fn cp_range(&self) -> CpRange {
        self.cp_range
    }

    pub fn boosted_cp_range(&self) -> CpRange {
        self.boosted_cp_range
    }

    pub fn types(&self) -> &[PokemonType] {
        &self.types
    }

    pub fn active(&self) -> BossActivity {
        self.active
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.active.is_active_at(now)
    }
}

impl Named for Boss {
    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> &NameKey {
        &self.key
    }
}

impl Keyed for Boss {
    fn field_keys(&self, field: &str) -> &[NameKey] {
        match field {
            NAME_FIELD => std::slice::from_ref(&self.key),
            ALTERNATE_NAMES_FIELD => &self.alternate_keys,
            _ => &[],
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;

    pub(crate) fn boss_record(name: &str) -> BossRecord {
        BossRecord {
            name: name.to_string(),
            display_name: None,
            alternate_names: Vec::new(),
            pokedex_number: 150,
            cp_range: [2275, 2387],
            boosted_cp_range: [2844, 2984],
            types: vec!["Psychic".to_string()],
        }
    }

    #[test]
    fn test_from_record() {
        let mut record = boss_record("Mewtwo");
        record.alternate_names = vec!["M2".to_string()];
        let boss = Boss::from_record(&record, Tier::Five).unwrap();

        assert_eq!(boss.key().as_str(), "mewtwo");
        assert_eq!(boss.display_name(), "Mewtwo");
        assert_eq!(boss.types(), &[PokemonType::Psychic]);
        assert_eq!(boss.field_keys(ALTERNATE_NAMES_FIELD)[0].as_str(), "m2");
        assert_eq!(boss.active(), BossActivity::Flag(false));
    }

    #[test]
    fn test_unknown_type() {
        let mut record = boss_record("Shadow Lugia");
        record.types = vec!["Shadow".to_string()];

        assert_eq!(
            Boss::from_record(&record, Tier::Five),
            Err(BossError::UnknownType("Shadow".to_string()))
        );
    }

    #[test]
    fn test_activity_window() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let boss = Boss::from_record(&boss_record("Lugia"), Tier::Five)
            .unwrap()
            .with_active(BossActivity::During(DateRange::new(start, end).unwrap()));

        assert!(boss.is_active_at(Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()));
        assert!(boss.is_active_at(end));
        assert!(!boss.is_active_at(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_inverted_date_range() {
        let start = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(
            DateRange::new(start, end),
            Err(BossError::InvertedDateRange)
        );
    }
}
