use chrono::{DateTime, Duration, Utc};
use raidbook_records::RaidType;

use super::RaidError;

/// How long before hatch an egg becomes visible
pub const DEFAULT_EGG_WINDOW: Duration = Duration::minutes(60);

/// Longest egg countdown, in minutes
pub const MAX_EGG_TIMER: i64 = 60;

/// How far ahead an absolute hatch time may be
pub const MAX_FUTURE_LOOKAHEAD: Duration = Duration::minutes(120);

/// Where a raid is in its lifecycle. Always derived from [`RaidTimes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RaidState {
    /// Hatches more than the egg window from now
    Future,
    /// Hatches within the egg window
    Egg,
    Hatched,
    Expired,
}

impl RaidState {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "future" => Some(RaidState::Future),
            "egg" | "upcoming" => Some(RaidState::Egg),
            "hatched" | "active" => Some(RaidState::Hatched),
            "expired" => Some(RaidState::Expired),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RaidState::Future => "future",
            RaidState::Egg => "egg",
            RaidState::Hatched => "hatched",
            RaidState::Expired => "expired",
        }
    }

    /// Whether a boss may be assigned in this state
    pub fn has_hatched(&self) -> bool {
        matches!(self, RaidState::Hatched | RaidState::Expired)
    }

    /// State at `now` with the default egg window
    pub fn derive(times: &RaidTimes, now: DateTime<Utc>) -> Self {
        Self::derive_with_window(times, now, DEFAULT_EGG_WINDOW)
    }

    pub fn derive_with_window(times: &RaidTimes, now: DateTime<Utc>, egg_window: Duration) -> Self {
        if now >= times.end() {
            RaidState::Expired
        } else if now >= times.hatch() {
            RaidState::Hatched
        } else if times.hatch() - now <= egg_window {
            RaidState::Egg
        } else {
            RaidState::Future
        }
    }
}

impl std::fmt::Display for RaidState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hatch and expiry of a raid. The span always matches a [`RaidType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaidTimes {
    hatch: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl RaidTimes {
    pub fn new(hatch: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RaidError> {
        let minutes = (end - hatch).num_minutes();
        let exact = end - hatch == Duration::minutes(minutes);
        let known = [RaidType::Normal, RaidType::RaidHour]
            .iter()
            .any(|t| t.duration_minutes() == minutes);
        if !exact || !known {
            return Err(RaidError::InvalidDuration(end - hatch));
        }
        Ok(Self { hatch, end })
    }

    pub fn for_type(hatch: DateTime<Utc>, raid_type: RaidType) -> Self {
        Self {
            hatch,
            end: hatch + Duration::minutes(raid_type.duration_minutes()),
        }
    }

    pub fn hatch(&self) -> DateTime<Utc> {
        self.hatch
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.hatch
    }

    /// The raid type whose duration this span has
    pub fn raid_type(&self) -> RaidType {
        if self.duration() == Duration::minutes(RaidType::RaidHour.duration_minutes()) {
            RaidType::RaidHour
        } else {
            RaidType::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn hatch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_state_is_a_function_of_time() {
        let times = RaidTimes::for_type(hatch(), RaidType::Normal);
        let at = |minutes: i64| RaidState::derive(&times, hatch() + Duration::minutes(minutes));

        assert_eq!(at(-90), RaidState::Future);
        assert_eq!(at(-60), RaidState::Egg);
        assert_eq!(at(-30), RaidState::Egg);
        assert_eq!(at(0), RaidState::Hatched);
        assert_eq!(at(10), RaidState::Hatched);
        assert_eq!(at(45), RaidState::Expired);
        assert_eq!(at(50), RaidState::Expired);
    }

    #[test]
    fn test_custom_egg_window() {
        let times = RaidTimes::for_type(hatch(), RaidType::RaidHour);
        let now = hatch() - Duration::minutes(50);

        assert_eq!(
            RaidState::derive_with_window(&times, now, Duration::minutes(45)),
            RaidState::Future
        );
        assert_eq!(RaidState::derive(&times, now), RaidState::Egg);
        assert_eq!(
            RaidState::derive(&times, hatch() + Duration::minutes(50)),
            RaidState::Hatched
        );
    }

    #[test]
    fn test_invalid_duration() {
        assert_eq!(
            RaidTimes::new(hatch(), hatch() + Duration::minutes(30)),
            Err(RaidError::InvalidDuration(Duration::minutes(30)))
        );
        assert!(RaidTimes::new(hatch(), hatch() + Duration::seconds(45 * 60 + 1)).is_err());

        let times = RaidTimes::new(hatch(), hatch() + Duration::minutes(60)).unwrap();
        assert_eq!(times.raid_type(), RaidType::RaidHour);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(RaidState::from_name("Upcoming"), Some(RaidState::Egg));
        assert_eq!(RaidState::from_name("active"), Some(RaidState::Hatched));
        assert_eq!(RaidState::from_name("hatching"), None);
        assert_eq!(RaidState::Expired.to_string(), "expired");
    }
}
