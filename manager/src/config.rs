use std::path::PathBuf;
use std::time::Duration;

use raidbook_core::{DEFAULT_EGG_WINDOW, DirectoryConfig, FuzzyOptions};
use serde::{Deserialize, Serialize};

/// Settings for a [`RaidManager`](crate::RaidManager)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagerConfig {
    pub bosses_path: PathBuf,
    pub gyms_path: PathBuf,
    /// Raid snapshot file; `None` disables persistence
    pub raids_path: Option<PathBuf>,
    /// Refuse to replace an existing raid when adding one
    pub strict_mode: bool,
    /// Save the snapshot after every change
    pub auto_save: bool,
    #[serde(with = "seconds")]
    pub refresh_interval: Duration,
    #[serde(with = "minutes")]
    pub egg_window: chrono::Duration,
    pub fuzzy: FuzzyOptions,
}

impl ManagerConfig {
    pub fn directory_config(&self) -> DirectoryConfig {
        DirectoryConfig::with_alternate_names(self.fuzzy)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            bosses_path: PathBuf::from("data/bosses.json"),
            gyms_path: PathBuf::from("data/gyms.json"),
            raids_path: Some(PathBuf::from("state/raids.json")),
            strict_mode: false,
            auto_save: true,
            refresh_interval: Duration::from_secs(60),
            egg_window: DEFAULT_EGG_WINDOW,
            fuzzy: FuzzyOptions::default(),
        }
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod minutes {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_minutes())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u32::deserialize(deserializer).map(|m| Duration::minutes(i64::from(m)))
    }
}
