//! File and snapshot record formats for raidbook.
//!
//! Everything here is "property bag" level: records are parsed from JSON
//! values and validated for shape only. Turning a record into a domain
//! object (a `Gym`, a `Boss`, a `Raid`) is the job of `raidbook-core`.

use thiserror::Error;

pub mod boss;
pub mod gym;
pub mod raid;

pub use boss::{ActiveRecord, BossRecord, StatusRecord, TierGroupRecord, parse_boss_file};
pub use gym::{GymRecord, parse_gym_record, parse_gyms};
pub use raid::{RaidRecord, RaidType, parse_raid_record, parse_raid_snapshot, write_raid_snapshot};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid record format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read a string-or-array-of-strings field.
///
/// Comma separated strings are split, so `"Zone A, Zone B"` and
/// `["Zone A", "Zone B"]` produce the same list.
pub(crate) fn string_list(
    value: &serde_json::Value,
    field: &str,
) -> Result<Vec<String>, ParseError> {
    match value {
        serde_json::Value::String(s) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| invalid_value(field, item))
            })
            .collect(),
        other => Err(invalid_value(field, other)),
    }
}

pub(crate) fn invalid_value(field: &str, value: &serde_json::Value) -> ParseError {
    ParseError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}
