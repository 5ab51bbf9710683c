//! Raid snapshot records
//!
//! A snapshot is a JSON array of raids. Each raid is either positional,
//! `[hatch, gym, bossOrTier, type]`, or an object
//! `{ "gym", "boss"?, "tier"?, "hatch", "type" }`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{ParseError, invalid_value};

/// Kind of raid, which fixes its total duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RaidType {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "raid-hour")]
    RaidHour,
}

impl RaidType {
    /// Parse from the snapshot spelling (case-insensitive)
    pub fn from_record(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(RaidType::Normal),
            "raid-hour" | "raidhour" | "raid hour" => Some(RaidType::RaidHour),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RaidType::Normal => "normal",
            RaidType::RaidHour => "raid-hour",
        }
    }

    /// Minutes between hatch and expiry
    pub fn duration_minutes(&self) -> i64 {
        match self {
            RaidType::Normal => 45,
            RaidType::RaidHour => 60,
        }
    }
}

impl std::fmt::Display for RaidType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One persisted raid
#[derive(Debug, Clone, PartialEq)]
pub struct RaidRecord {
    pub hatch: DateTime<Utc>,
    /// Gym key (normalized name)
    pub gym: String,
    /// Boss key, when a boss has been assigned
    pub boss: Option<String>,
    /// Tier, required when there is no boss
    pub tier: Option<u8>,
    pub raid_type: RaidType,
}

impl RaidRecord {
    /// Positional form; the third element is the boss key if known, otherwise the tier.
    pub fn to_array(&self) -> Value {
        let boss_or_tier = match (&self.boss, self.tier) {
            (Some(boss), _) => json!(boss),
            (None, Some(tier)) => json!(tier),
            (None, None) => Value::Null,
        };
        json!([
            self.hatch.to_rfc3339(),
            self.gym,
            boss_or_tier,
            self.raid_type.as_str()
        ])
    }

    pub fn to_json(&self) -> Value {
        let mut obj = json!({
            "gym": self.gym,
            "hatch": self.hatch.to_rfc3339(),
            "type": self.raid_type.as_str(),
        });
        if let Some(boss) = &self.boss {
            obj["boss"] = json!(boss);
        }
        if let Some(tier) = self.tier {
            obj["tier"] = json!(tier);
        }
        obj
    }
}

/// Parse a whole snapshot file.
pub fn parse_raid_snapshot(contents: &str) -> Result<Vec<RaidRecord>> {
    let value: Value = serde_json::from_str(contents).map_err(ParseError::from)?;
    let items = value.as_array().ok_or_else(|| {
        ParseError::InvalidFormat("raid snapshot must contain an array".to_string())
    })?;

    items.iter().map(parse_raid_record).collect()
}

/// Serialize raids as a snapshot file, one positional record per raid.
pub fn write_raid_snapshot(records: &[RaidRecord]) -> Result<String> {
    let values: Vec<Value> = records.iter().map(RaidRecord::to_array).collect();
    Ok(serde_json::to_string_pretty(&values)?)
}

/// Parse a single raid record in either form.
pub fn parse_raid_record(value: &Value) -> Result<RaidRecord> {
    match value {
        Value::Array(parts) => parse_array(parts),
        Value::Object(_) => parse_object(value),
        other => Err(ParseError::InvalidFormat(format!("unexpected raid record {other}")).into()),
    }
}

fn parse_array(parts: &[Value]) -> Result<RaidRecord> {
    // [hatch, gym, bossOrTier, type?]
    if parts.len() < 3 {
        return Err(
            ParseError::MissingField("raid array needs at least 3 elements".to_string()).into(),
        );
    }

    let hatch = timestamp(&parts[0])?;
    let gym = string(&parts[1], "gym")?;
    let (boss, tier) = match &parts[2] {
        Value::String(boss) => (Some(boss.trim().to_string()), None),
        Value::Number(_) => (None, Some(tier(&parts[2])?)),
        other => return Err(invalid_value("bossOrTier", other).into()),
    };
    let raid_type = match parts.get(3) {
        Some(v) => raid_type(v)?,
        None => RaidType::default(),
    };

    Ok(RaidRecord {
        hatch,
        gym,
        boss,
        tier,
        raid_type,
    })
}

fn parse_object(value: &Value) -> Result<RaidRecord> {
    let hatch = timestamp(
        value
            .get("hatch")
            .ok_or_else(|| ParseError::MissingField("hatch".to_string()))?,
    )?;
    let gym = string(
        value
            .get("gym")
            .ok_or_else(|| ParseError::MissingField("gym".to_string()))?,
        "gym",
    )?;
    let boss = value.get("boss").map(|b| string(b, "boss")).transpose()?;
    let tier = value.get("tier").map(tier).transpose()?;
    if boss.is_none() && tier.is_none() {
        return Err(ParseError::MissingField("boss or tier".to_string()).into());
    }
    let raid_type = match value.get("type") {
        Some(v) => raid_type(v)?,
        None => RaidType::default(),
    };

    Ok(RaidRecord {
        hatch,
        gym,
        boss,
        tier,
        raid_type,
    })
}

fn timestamp(value: &Value) -> Result<DateTime<Utc>, ParseError> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| invalid_value("hatch", value))
}

fn string(value: &Value, field: &str) -> Result<String, ParseError> {
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid_value(field, value))
}

fn tier(value: &Value) -> Result<u8, ParseError> {
    value
        .as_u64()
        .and_then(|t| u8::try_from(t).ok())
        .ok_or_else(|| invalid_value("tier", value))
}

fn raid_type(value: &Value) -> Result<RaidType, ParseError> {
    value
        .as_str()
        .and_then(RaidType::from_record)
        .ok_or_else(|| invalid_value("type", value))
}
