//! Raids: lifecycle state, the raid itself, and the per-gym raid map

mod map;
mod raid;
mod state;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::types::Tier;

pub use map::{RaidLookupOptions, RaidMap, RaidMapError, RaidTarget};
pub use raid::{Raid, RaidUpdate, StartTime};
pub use state::{DEFAULT_EGG_WINDOW, MAX_EGG_TIMER, MAX_FUTURE_LOOKAHEAD, RaidState, RaidTimes};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RaidError {
    #[error("Egg timer out of range: {0} minutes")]
    EggTimerOutOfRange(i64),

    #[error("Raid timer out of range: {0} minutes")]
    RaidTimerOutOfRange(i64),

    #[error("Hatch time {0} is in the past")]
    HatchInPast(DateTime<Utc>),

    #[error("Hatch time {0} is too far in the future")]
    TooFarInFuture(DateTime<Utc>),

    #[error("Invalid raid duration {}", .0)]
    InvalidDuration(Duration),

    #[error("Cannot change tier once boss is assigned")]
    TierLocked,

    #[error("Cannot assign boss to a future raid")]
    BossOnFutureRaid,

    #[error("Boss is {boss} but raid is {raid}")]
    TierMismatch { boss: Tier, raid: Tier },

    #[error("Unknown gym {0:?}")]
    UnknownGym(String),

    #[error("Unknown boss {0:?}")]
    UnknownBoss(String),

    #[error("Invalid tier {0}")]
    InvalidTier(u8),

    #[error("Raid record has neither boss nor tier")]
    MissingTier,
}
