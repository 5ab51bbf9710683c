//! Tier-grouped boss files
//!
//! ```text
//! [
//!   {
//!     "tier": 5,
//!     "status": [{ "bosses": ["mewtwo"], "active": { "start": "...", "end": "..." } }],
//!     "bosses": [{ "name": "Mewtwo", "pokedexNumber": 150, ... }]
//!   }
//! ]
//! ```

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ParseError;

/// All bosses sharing one tier, plus status overrides for them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierGroupRecord {
    pub tier: u8,
    #[serde(default)]
    pub status: Vec<StatusRecord>,
    pub bosses: Vec<BossRecord>,
}

/// Marks the listed bosses as active (or active during a window)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub bosses: Vec<String>,
    pub active: ActiveRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActiveRecord {
    Flag(bool),
    Window {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_names: Vec<String>,
    pub pokedex_number: u16,
    pub cp_range: [u32; 2],
    pub boosted_cp_range: [u32; 2],
    #[serde(default)]
    pub types: Vec<String>,
}

/// Parse a boss file into its tier groups.
pub fn parse_boss_file(contents: &str) -> Result<Vec<TierGroupRecord>> {
    let groups: Vec<TierGroupRecord> = serde_json::from_str(contents).map_err(ParseError::from)?;

    for group in &groups {
        for boss in &group.bosses {
            if boss.cp_range[0] > boss.cp_range[1]
                || boss.boosted_cp_range[0] > boss.boosted_cp_range[1]
            {
                return Err(ParseError::InvalidValue {
                    field: "cpRange".to_string(),
                    value: boss.name.clone(),
                }
                .into());
            }
        }
    }

    Ok(groups)
}
