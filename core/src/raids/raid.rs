use std::cmp::Ordering;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use raidbook_records::{RaidRecord, RaidType};
use serde_json::Value;

use super::RaidError;
use super::state::{MAX_EGG_TIMER, MAX_FUTURE_LOOKAHEAD, RaidState, RaidTimes};
use crate::bosses::BossDirectory;
use crate::places::GymDirectory;
use crate::types::{Boss, Gym, NameKey, Named, Tier};

/// When a future raid hatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTime {
    At(DateTime<Utc>),
    /// Egg countdown in minutes
    InMinutes(i64),
}

#[derive(Debug, Clone)]
pub enum RaidUpdate {
    Boss(Rc<Boss>),
    Tier(Tier),
}

/// A raid at one gym.
///
/// The lifecycle state is never stored authoritatively; it is derived from
/// the raid's times on every call. The last observed state is kept only so
/// a refresh can tell which raids changed.
#[derive(Debug, Clone)]
pub struct Raid {
    gym: Rc<Gym>,
    tier: Tier,
    boss: Option<Rc<Boss>>,
    times: RaidTimes,
    raid_type: RaidType,
    observed: RaidState,
}

impl Raid {
    /// An egg reported by hatch time or countdown
    pub fn create_future_raid(
        start: StartTime,
        gym: Rc<Gym>,
        tier: Tier,
        raid_type: RaidType,
        now: DateTime<Utc>,
    ) -> Result<Self, RaidError> {
        let hatch = match start {
            StartTime::InMinutes(minutes) => {
                if !(1..=MAX_EGG_TIMER).contains(&minutes) {
                    return Err(RaidError::EggTimerOutOfRange(minutes));
                }
                now + Duration::minutes(minutes)
            }
            StartTime::At(hatch) => {
                if hatch < now {
                    return Err(RaidError::HatchInPast(hatch));
                }
                if hatch - now > MAX_FUTURE_LOOKAHEAD {
                    return Err(RaidError::TooFarInFuture(hatch));
                }
                hatch
            }
        };
        let times = RaidTimes::for_type(hatch, raid_type);
        Ok(Self::build(gym, tier, None, times, now))
    }

    /// A hatched raid with `time_left` minutes until it ends
    pub fn create_active_raid(
        time_left: i64,
        gym: Rc<Gym>,
        boss: Rc<Boss>,
        raid_type: RaidType,
        now: DateTime<Utc>,
    ) -> Result<Self, RaidError> {
        let duration = raid_type.duration_minutes();
        if !(1..=duration).contains(&time_left) {
            return Err(RaidError::RaidTimerOutOfRange(time_left));
        }
        let hatch = now + Duration::minutes(time_left - duration);
        let tier = boss.tier();
        let times = RaidTimes::for_type(hatch, raid_type);
        Ok(Self::build(gym, tier, Some(boss), times, now))
    }

    /// Rebuild a raid from stored parts, checking only structural invariants.
    ///
    /// A stored raid without a boss was last seen as an egg, so one that
    /// hatched in the meantime still reports the hatch on its next refresh.
    pub fn restore(
        gym: Rc<Gym>,
        tier: Tier,
        boss: Option<Rc<Boss>>,
        times: RaidTimes,
        now: DateTime<Utc>,
    ) -> Result<Self, RaidError> {
        if let Some(boss) = &boss {
            check_tier(boss, tier)?;
        }
        let mut raid = Self::build(gym, tier, boss, times, now);
        if raid.boss.is_none() && raid.observed == RaidState::Hatched {
            raid.observed = RaidState::Egg;
        }
        Ok(raid)
    }

    fn build(
        gym: Rc<Gym>,
        tier: Tier,
        boss: Option<Rc<Boss>>,
        times: RaidTimes,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            gym,
            tier,
            boss,
            raid_type: times.raid_type(),
            observed: RaidState::derive(&times, now),
            times,
        }
    }

    /// Apply a reported boss or tier. Returns the boss that was replaced.
    pub fn update(
        &mut self,
        update: RaidUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Rc<Boss>>, RaidError> {
        match update {
            RaidUpdate::Tier(tier) => {
                if self.boss.is_some() {
                    return Err(RaidError::TierLocked);
                }
                self.tier = tier;
                Ok(None)
            }
            RaidUpdate::Boss(boss) => {
                if !self.state(now).has_hatched() {
                    return Err(RaidError::BossOnFutureRaid);
                }
                check_tier(&boss, self.tier)?;
                Ok(self.boss.replace(boss))
            }
        }
    }

    pub fn gym(&self) -> &Rc<Gym> {
        &self.gym
    }

    /// Raids are keyed by their gym
    pub fn key(&self) -> &NameKey {
        self.gym.key()
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn boss(&self) -> Option<&Rc<Boss>> {
        self.boss.as_ref()
    }

    pub fn times(&self) -> RaidTimes {
        self.times
    }

    pub fn hatch(&self) -> DateTime<Utc> {
        self.times.hatch()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.times.end()
    }

    pub fn raid_type(&self) -> RaidType {
        self.raid_type
    }

    pub fn state(&self, now: DateTime<Utc>) -> RaidState {
        RaidState::derive(&self.times, now)
    }

    pub fn state_with_window(&self, now: DateTime<Utc>, egg_window: Duration) -> RaidState {
        RaidState::derive_with_window(&self.times, now, egg_window)
    }

    /// State as of the last refresh
    pub fn observed_state(&self) -> RaidState {
        self.observed
    }

    /// Recompute the state; returns it if it differs from the last observation.
    pub fn refresh_state(
        &mut self,
        now: DateTime<Utc>,
        egg_window: Duration,
    ) -> Option<RaidState> {
        let state = self.state_with_window(now, egg_window);
        if state == self.observed {
            return None;
        }
        self.observed = state;
        Some(state)
    }

    /// Display ordering: hatch time, then gym name
    pub fn cmp_schedule(&self, other: &Raid) -> Ordering {
        self.hatch()
            .cmp(&other.hatch())
            .then_with(|| self.gym.key().cmp(other.gym.key()))
    }

    pub fn to_record(&self) -> RaidRecord {
        RaidRecord {
            hatch: self.hatch(),
            gym: self.gym.key().to_string(),
            boss: self.boss.as_ref().map(|b| b.key().to_string()),
            tier: match self.boss {
                Some(_) => None,
                None => Some(self.tier.number()),
            },
            raid_type: self.raid_type,
        }
    }

    pub fn to_array(&self) -> Value {
        self.to_record().to_array()
    }

    pub fn to_json(&self) -> Value {
        self.to_record().to_json()
    }

    /// Resolve a stored record against the loaded gyms and bosses
    pub fn from_record(
        record: &RaidRecord,
        gyms: &GymDirectory,
        bosses: &BossDirectory,
        now: DateTime<Utc>,
    ) -> Result<Self, RaidError> {
        let gym = gyms
            .get(&record.gym)
            .ok()
            .flatten()
            .ok_or_else(|| RaidError::UnknownGym(record.gym.clone()))?;

        let boss = match &record.boss {
            Some(name) => Some(
                bosses
                    .get(name)
                    .ok()
                    .flatten()
                    .ok_or_else(|| RaidError::UnknownBoss(name.clone()))?,
            ),
            None => None,
        };

        let tier = match (record.tier, &boss) {
            (Some(n), _) => Tier::from_number(n).ok_or(RaidError::InvalidTier(n))?,
            (None, Some(boss)) => boss.tier(),
            (None, None) => return Err(RaidError::MissingTier),
        };

        let times = RaidTimes::for_type(record.hatch, record.raid_type);
        Self::restore(gym, tier, boss, times, now)
    }
}

/// Two raids are equal when they describe the same raid, regardless of
/// when their state was last observed.
impl PartialEq for Raid {
    fn eq(&self, other: &Self) -> bool {
        self.gym.key() == other.gym.key()
            && self.tier == other.tier
            && self.boss.as_ref().map(|b| b.key()) == other.boss.as_ref().map(|b| b.key())
            && self.times == other.times
    }
}

fn check_tier(boss: &Boss, tier: Tier) -> Result<(), RaidError> {
    if boss.tier() != tier {
        return Err(RaidError::TierMismatch {
            boss: boss.tier(),
            raid: tier,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use raidbook_records::parse_raid_record;
    use serde_json::json;

    use super::*;
    use crate::directory::DirectoryConfig;
    use crate::places::gym_directory;
    use crate::raids::DEFAULT_EGG_WINDOW;
    use crate::types::boss_record;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 18, 0, 0).unwrap()
    }

    fn minutes(n: i64) -> Duration {
        Duration::minutes(n)
    }

    fn gym() -> Rc<Gym> {
        gym_directory().get("Harbor Mural").unwrap().unwrap()
    }

    fn boss(name: &str, tier: Tier) -> Rc<Boss> {
        Rc::new(Boss::from_record(&boss_record(name), tier).unwrap())
    }

    fn egg(hatch_in: i64) -> Raid {
        let start = StartTime::InMinutes(hatch_in);
        Raid::create_future_raid(start, gym(), Tier::Five, RaidType::Normal, now()).unwrap()
    }

    fn mewtwo_raid(time_left: i64, raid_type: RaidType) -> Result<Raid, RaidError> {
        let mewtwo = boss("Mewtwo", Tier::Five);
        Raid::create_active_raid(time_left, gym(), mewtwo, raid_type, now())
    }

    #[test]
    fn test_future_raid_from_countdown() {
        let raid = egg(30);

        assert_eq!(raid.hatch(), now() + minutes(30));
        assert_eq!(raid.end(), now() + minutes(75));
        assert_eq!(raid.state(now()), RaidState::Egg);
        assert_eq!(raid.observed_state(), RaidState::Egg);
        assert!(raid.boss().is_none());
    }

    #[test]
    fn test_future_raid_validation() {
        let create =
            |start| Raid::create_future_raid(start, gym(), Tier::Three, RaidType::Normal, now());

        assert_eq!(
            create(StartTime::InMinutes(0)).unwrap_err(),
            RaidError::EggTimerOutOfRange(0)
        );
        assert_eq!(
            create(StartTime::InMinutes(61)).unwrap_err(),
            RaidError::EggTimerOutOfRange(61)
        );

        let past = now() - minutes(1);
        assert_eq!(
            create(StartTime::At(past)).unwrap_err(),
            RaidError::HatchInPast(past)
        );

        let far = now() + minutes(121);
        assert_eq!(
            create(StartTime::At(far)).unwrap_err(),
            RaidError::TooFarInFuture(far)
        );

        let raid = create(StartTime::At(now() + minutes(90))).unwrap();
        assert_eq!(raid.state(now()), RaidState::Future);
    }

    #[test]
    fn test_active_raid() {
        let raid = mewtwo_raid(20, RaidType::Normal).unwrap();

        assert_eq!(raid.end(), now() + minutes(20));
        assert_eq!(raid.hatch(), now() - minutes(25));
        assert_eq!(raid.tier(), Tier::Five);
        assert_eq!(raid.state(now()), RaidState::Hatched);

        let hour = mewtwo_raid(60, RaidType::RaidHour).unwrap();
        assert_eq!(hour.hatch(), now());

        assert_eq!(
            mewtwo_raid(46, RaidType::Normal).unwrap_err(),
            RaidError::RaidTimerOutOfRange(46)
        );
    }

    #[test]
    fn test_boss_requires_hatched_raid() {
        let mut raid = egg(30);
        let mewtwo = boss("Mewtwo", Tier::Five);

        assert_eq!(
            raid.update(RaidUpdate::Boss(Rc::clone(&mewtwo)), now()),
            Err(RaidError::BossOnFutureRaid)
        );
        assert!(raid.boss().is_none());

        let later = now() + minutes(31);
        assert_eq!(
            raid.update(RaidUpdate::Boss(Rc::clone(&mewtwo)), later),
            Ok(None)
        );

        let lugia = boss("Lugia", Tier::Five);
        let prior = raid.update(RaidUpdate::Boss(lugia), later).unwrap();
        assert_eq!(
            prior.map(|b| b.name().to_string()),
            Some("Mewtwo".to_string())
        );
        assert_eq!(raid.boss().map(|b| b.tier()), Some(raid.tier()));

        // Still allowed once the raid has ended
        let after = now() + minutes(80);
        assert!(raid.update(RaidUpdate::Boss(mewtwo), after).is_ok());
    }

    #[test]
    fn test_boss_and_tier_stay_consistent() {
        let mut raid = egg(30);
        let later = now() + minutes(40);

        assert_eq!(
            raid.update(RaidUpdate::Boss(boss("Machamp", Tier::Three)), later),
            Err(RaidError::TierMismatch {
                boss: Tier::Three,
                raid: Tier::Five
            })
        );

        assert_eq!(raid.update(RaidUpdate::Tier(Tier::Three), later), Ok(None));
        raid.update(RaidUpdate::Boss(boss("Machamp", Tier::Three)), later).unwrap();
        assert_eq!(
            raid.update(RaidUpdate::Tier(Tier::Five), later),
            Err(RaidError::TierLocked)
        );
        assert_eq!(raid.tier(), Tier::Three);
    }

    #[test]
    fn test_refresh_state_reports_changes() {
        let mut raid = egg(30);

        assert_eq!(raid.refresh_state(now() + minutes(10), minutes(60)), None);
        assert_eq!(
            raid.refresh_state(now() + minutes(30), minutes(60)),
            Some(RaidState::Hatched)
        );
        assert_eq!(raid.refresh_state(now() + minutes(31), minutes(60)), None);
        assert_eq!(
            raid.refresh_state(now() + minutes(75), minutes(60)),
            Some(RaidState::Expired)
        );
    }

    #[test]
    fn test_restore_keeps_unreported_hatch() {
        let times = RaidTimes::for_type(now() - minutes(5), RaidType::Normal);

        let mut hatched_egg = Raid::restore(gym(), Tier::Five, None, times, now()).unwrap();
        assert_eq!(hatched_egg.state(now()), RaidState::Hatched);
        assert_eq!(hatched_egg.observed_state(), RaidState::Egg);
        assert_eq!(
            hatched_egg.refresh_state(now(), DEFAULT_EGG_WINDOW),
            Some(RaidState::Hatched)
        );

        let mewtwo = boss("Mewtwo", Tier::Five);
        let with_boss = Raid::restore(gym(), Tier::Five, Some(mewtwo), times, now()).unwrap();
        assert_eq!(with_boss.observed_state(), RaidState::Hatched);
    }

    #[test]
    fn test_schedule_order() {
        let gyms = gym_directory();
        let at = |name: &str, hatch_in: i64| {
            let gym = gyms.get(name).unwrap().unwrap();
            let start = StartTime::InMinutes(hatch_in);
            Raid::create_future_raid(start, gym, Tier::One, RaidType::Normal, now()).unwrap()
        };
        let early = at("Harbor Mural", 10);
        let tie_a = at("Central Park Fountain", 20);
        let tie_b = at("Central Plaza Statue", 20);

        assert_eq!(early.cmp_schedule(&tie_a), Ordering::Less);
        assert_eq!(tie_a.cmp_schedule(&tie_b), Ordering::Less);
        assert_eq!(tie_b.cmp_schedule(&tie_b.clone()), Ordering::Equal);
    }

    #[test]
    fn test_record_round_trip() {
        let gyms = gym_directory();
        let mut bosses = BossDirectory::new(DirectoryConfig::default());
        let mewtwo = Boss::from_record(&boss_record("Mewtwo"), Tier::Five).unwrap();
        let mewtwo = bosses.add(mewtwo).unwrap();

        let active =
            Raid::create_active_raid(20, gym(), mewtwo, RaidType::RaidHour, now()).unwrap();
        let array = active.to_array();
        assert_eq!(array[1], json!("harbormural"));
        assert_eq!(array[2], json!("mewtwo"));

        let record = parse_raid_record(&array).unwrap();
        let restored = Raid::from_record(&record, &gyms, &bosses, now()).unwrap();
        assert_eq!(restored, active);
        assert_eq!(restored.raid_type(), RaidType::RaidHour);

        let future = egg(15);
        let record = parse_raid_record(&future.to_json()).unwrap();
        let restored = Raid::from_record(&record, &gyms, &bosses, now()).unwrap();
        assert_eq!(restored, future);
    }

    #[test]
    fn test_record_with_unknown_references() {
        let gyms = gym_directory();
        let bosses = BossDirectory::default();
        let record =
            parse_raid_record(&json!(["2026-05-01T18:30:00Z", "nowhere", 5, "normal"])).unwrap();
        assert_eq!(
            Raid::from_record(&record, &gyms, &bosses, now()),
            Err(RaidError::UnknownGym("nowhere".to_string()))
        );

        let record = parse_raid_record(&json!([
            "2026-05-01T18:30:00Z",
            "harbormural",
            "missingno",
            "normal",
        ]))
        .unwrap();
        assert_eq!(
            Raid::from_record(&record, &gyms, &bosses, now()),
            Err(RaidError::UnknownBoss("missingno".to_string()))
        );

        let record = parse_raid_record(&json!([
            "2026-05-01T18:30:00Z",
            "harbormural",
            9,
            "normal",
        ]))
        .unwrap();
        assert_eq!(
            Raid::from_record(&record, &gyms, &bosses, now()),
            Err(RaidError::InvalidTier(9))
        );
    }
}
