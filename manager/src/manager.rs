use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use raidbook_core::{
    Boss, BossDirectory, BossLookupOptions, Gym, GymDirectory, GymLookupOptions, NameKey, Named,
    Raid, RaidLookupOptions, RaidMap, RaidState, RaidType, RaidUpdate, Scored, StartTime, Tier,
};

use crate::ManagerError;
use crate::clock::{Clock, SystemClock};
use crate::config::ManagerConfig;
use crate::listener::{ChangeType, RaidListener};
use crate::snapshot::{load_bosses, load_gyms, load_snapshot, save_snapshot};
use crate::timer::RefreshTimer;

/// A gym given by name (resolved by lookup) or already resolved
#[derive(Debug, Clone)]
pub enum GymRef<'a> {
    Name(&'a str),
    Gym(Rc<Gym>),
}

impl<'a> From<&'a str> for GymRef<'a> {
    fn from(name: &'a str) -> Self {
        GymRef::Name(name)
    }
}

impl From<Rc<Gym>> for GymRef<'_> {
    fn from(gym: Rc<Gym>) -> Self {
        GymRef::Gym(gym)
    }
}

impl From<&Rc<Gym>> for GymRef<'_> {
    fn from(gym: &Rc<Gym>) -> Self {
        GymRef::Gym(Rc::clone(gym))
    }
}

/// A boss given by name (resolved by lookup) or already resolved
#[derive(Debug, Clone)]
pub enum BossRef<'a> {
    Name(&'a str),
    Boss(Rc<Boss>),
}

impl<'a> From<&'a str> for BossRef<'a> {
    fn from(name: &'a str) -> Self {
        BossRef::Name(name)
    }
}

impl From<Rc<Boss>> for BossRef<'_> {
    fn from(boss: Rc<Boss>) -> Self {
        BossRef::Boss(boss)
    }
}

impl From<&Rc<Boss>> for BossRef<'_> {
    fn from(boss: &Rc<Boss>) -> Self {
        BossRef::Boss(Rc::clone(boss))
    }
}

/// One raid that changed during a refresh pass
#[derive(Debug, Clone, PartialEq)]
pub struct RaidChange {
    pub gym: NameKey,
    pub change: ChangeType,
    pub state: RaidState,
    /// Boss assigned automatically on hatch
    pub assigned_boss: Option<Rc<Boss>>,
}

/// What a refresh pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub changes: Vec<RaidChange>,
}

impl RefreshReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn hatched(&self) -> impl Iterator<Item = &RaidChange> {
        self.changes.iter().filter(|c| c.change == ChangeType::Hatched)
    }

    pub fn ended(&self) -> impl Iterator<Item = &RaidChange> {
        self.changes.iter().filter(|c| c.change == ChangeType::Ended)
    }
}

/// Owns the gym and boss directories and the raid map
pub struct RaidManager {
    config: ManagerConfig,
    clock: Box<dyn Clock>,
    gyms: GymDirectory,
    bosses: BossDirectory,
    raids: RaidMap,
    listeners: Vec<Box<dyn RaidListener>>,
    timer: Option<RefreshTimer>,
}

impl RaidManager {
    /// Load bosses, gyms and any saved raids from the configured paths
    pub fn new(config: ManagerConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }

    pub fn with_clock(config: ManagerConfig, clock: impl Clock + 'static) -> Result<Self> {
        let bosses = load_bosses(&config.bosses_path, config.directory_config())?;
        let gyms = load_gyms(&config.gyms_path, config.directory_config())?;

        let mut manager = Self::from_parts(config, gyms, bosses, clock);
        manager.restore();
        Ok(manager)
    }

    /// Assemble a manager from loaded directories, with no raids
    pub fn from_parts(
        config: ManagerConfig,
        gyms: GymDirectory,
        bosses: BossDirectory,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            raids: RaidMap::new(config.egg_window),
            config,
            clock: Box::new(clock),
            gyms,
            bosses,
            listeners: Vec::new(),
            timer: None,
        }
    }

    // A missing or unreadable snapshot leaves the raid map empty
    fn restore(&mut self) {
        let Some(path) = self.config.raids_path.clone() else {
            return;
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No raid snapshot to restore");
            return;
        }

        match load_snapshot(&path, &self.gyms, &self.bosses, self.now()) {
            Ok(raids) => {
                for raid in raids {
                    self.raids.swap(raid);
                }
                tracing::info!(path = %path.display(), raids = self.raids.len(), "Restored raids");
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %format!("{e:#}"),
                    "Ignoring raid snapshot"
                );
            }
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn gyms(&self) -> &GymDirectory {
        &self.gyms
    }

    pub fn bosses(&self) -> &BossDirectory {
        &self.bosses
    }

    pub fn raid_map(&self) -> &RaidMap {
        &self.raids
    }

    pub fn add_listener(&mut self, listener: impl RaidListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn lookup_gyms(
        &self,
        name: &str,
        options: &GymLookupOptions,
    ) -> Result<Vec<Scored<Gym>>, ManagerError> {
        Ok(self.gyms.lookup_gyms(name, options)?)
    }

    pub fn lookup_bosses(
        &self,
        name: &str,
        options: &BossLookupOptions,
    ) -> Result<Vec<Scored<Boss>>, ManagerError> {
        Ok(self.bosses.lookup(name, options, self.now())?)
    }

    /// Resolve to exactly one gym
    pub fn resolve_gym<'a>(&self, gym: impl Into<GymRef<'a>>) -> Result<Rc<Gym>, ManagerError> {
        match gym.into() {
            GymRef::Gym(gym) => Ok(gym),
            GymRef::Name(name) => {
                let results = self.lookup_gyms(name, &GymLookupOptions::default())?;
                single(name, results)
            }
        }
    }

    /// Resolve to exactly one boss
    pub fn resolve_boss<'a>(&self, boss: impl Into<BossRef<'a>>) -> Result<Rc<Boss>, ManagerError> {
        match boss.into() {
            BossRef::Boss(boss) => Ok(boss),
            BossRef::Name(name) => {
                let results = self.lookup_bosses(name, &BossLookupOptions::default())?;
                single(name, results)
            }
        }
    }

    pub fn get_raid<'a>(&self, gym: impl Into<GymRef<'a>>) -> Result<&Raid, ManagerError> {
        let gym = self.resolve_gym(gym)?;
        self.raids
            .get(&*gym)
            .ok_or_else(|| ManagerError::NotFound(format!("Raid at {}", gym.name())))
    }

    /// Raids at every gym matching `name`, in gym lookup order
    pub fn get_raids(
        &self,
        name: &str,
        gym_options: &GymLookupOptions,
        raid_options: &RaidLookupOptions,
    ) -> Result<Vec<&Raid>, ManagerError> {
        let gyms: Vec<Rc<Gym>> = self
            .lookup_gyms(name, gym_options)?
            .into_iter()
            .map(|s| s.item)
            .collect();
        Ok(self.raids.get_raids_at_gyms(&gyms, raid_options, self.now()))
    }

    /// All raids matching `options`, by hatch time then gym
    pub fn raids(&self, options: &RaidLookupOptions) -> Vec<&Raid> {
        self.raids.scheduled(options, self.now())
    }

    pub fn add_future_raid<'a>(
        &mut self,
        gym: impl Into<GymRef<'a>>,
        start: StartTime,
        tier: Tier,
        raid_type: RaidType,
    ) -> Result<Raid, ManagerError> {
        let gym = self.resolve_gym(gym)?;
        let raid = Raid::create_future_raid(start, gym, tier, raid_type, self.now())?;
        self.insert(raid)
    }

    pub fn add_active_raid<'a, 'b>(
        &mut self,
        gym: impl Into<GymRef<'a>>,
        boss: impl Into<BossRef<'b>>,
        time_left: i64,
        raid_type: RaidType,
    ) -> Result<Raid, ManagerError> {
        let gym = self.resolve_gym(gym)?;
        let boss = self.resolve_boss(boss)?;
        let raid = Raid::create_active_raid(time_left, gym, boss, raid_type, self.now())?;
        self.insert(raid)
    }

    fn insert(&mut self, raid: Raid) -> Result<Raid, ManagerError> {
        if self.config.strict_mode && self.raids.contains(&raid) {
            return Err(ManagerError::AlreadyExists(raid.gym().name().to_string()));
        }

        let prior = self.raids.swap(raid.clone());
        let change = match prior {
            Some(_) => ChangeType::Updated,
            None => ChangeType::Added,
        };
        tracing::debug!(gym = %raid.key(), tier = %raid.tier(), %change, "Raid reported");
        self.notify_raid(&raid, change, prior.as_ref());
        self.auto_save();
        Ok(raid)
    }

    /// Assign a boss to an existing raid. Returns the updated raid.
    pub fn update_raid<'a, 'b>(
        &mut self,
        gym: impl Into<GymRef<'a>>,
        boss: impl Into<BossRef<'b>>,
    ) -> Result<Raid, ManagerError> {
        let boss = self.resolve_boss(boss)?;
        self.apply(gym.into(), RaidUpdate::Boss(boss))
    }

    /// Change the tier of a raid that has no boss yet
    pub fn update_raid_tier<'a>(
        &mut self,
        gym: impl Into<GymRef<'a>>,
        tier: Tier,
    ) -> Result<Raid, ManagerError> {
        self.apply(gym.into(), RaidUpdate::Tier(tier))
    }

    fn apply(&mut self, gym: GymRef<'_>, update: RaidUpdate) -> Result<Raid, ManagerError> {
        let gym = self.resolve_gym(gym)?;
        let now = self.now();
        let raid = self
            .raids
            .get_mut(&*gym)
            .ok_or_else(|| ManagerError::NotFound(format!("Raid at {}", gym.name())))?;

        let prior = raid.clone();
        raid.update(update, now)?;
        let raid = raid.clone();

        self.notify_raid(&raid, ChangeType::Updated, Some(&prior));
        self.auto_save();
        Ok(raid)
    }

    pub fn remove_raid<'a>(&mut self, gym: impl Into<GymRef<'a>>) -> Result<Raid, ManagerError> {
        let gym = self.resolve_gym(gym)?;
        let raid = self.raids.remove(&*gym)?;

        self.notify_raid(&raid, ChangeType::Deleted, None);
        self.auto_save();
        Ok(raid)
    }

    /// Recompute every raid's state.
    ///
    /// Raids that hatch get the tier's boss when exactly one is active;
    /// raids that have ended are removed. Listeners hear about the pass
    /// once, and only if something changed.
    pub fn refresh_raid_list(&mut self) -> RefreshReport {
        let now = self.now();
        let egg_window = self.config.egg_window;
        let mut report = RefreshReport::default();

        let keys: Vec<NameKey> = self.raids.keys().cloned().collect();
        for key in keys {
            let Some(raid) = self.raids.get_mut(key.as_str()) else {
                continue;
            };
            let changed = raid.refresh_state(now, egg_window);
            let state = raid.observed_state();

            if state == RaidState::Expired {
                if self.raids.remove(key.as_str()).is_ok() {
                    tracing::debug!(gym = %key, "Raid ended");
                    report.changes.push(RaidChange {
                        gym: key,
                        change: ChangeType::Ended,
                        state,
                        assigned_boss: None,
                    });
                }
                continue;
            }

            let Some(state) = changed else {
                continue;
            };
            let mut assigned_boss = None;
            let change = if state == RaidState::Hatched {
                if raid.boss().is_none() {
                    let active = self.bosses.active_bosses(raid.tier(), now);
                    if let [boss] = active.as_slice()
                        && raid.update(RaidUpdate::Boss(Rc::clone(boss)), now).is_ok()
                    {
                        tracing::info!(gym = %key, boss = %boss.name(), "Assigned boss on hatch");
                        assigned_boss = Some(Rc::clone(boss));
                    }
                }
                tracing::debug!(gym = %key, "Raid hatched");
                ChangeType::Hatched
            } else {
                ChangeType::Updated
            };
            report.changes.push(RaidChange {
                gym: key,
                change,
                state,
                assigned_boss,
            });
        }

        if !report.is_empty() {
            self.notify_raid_list();
            self.auto_save();
        }
        report
    }

    /// Start refreshing every `period`. A zero period does nothing and
    /// returns `Ok(false)`.
    pub fn start_refresh_timer(&mut self, period: Duration) -> Result<bool, ManagerError> {
        if self.timer.is_some() {
            return Err(ManagerError::TimerAlreadyRunning);
        }
        self.timer = RefreshTimer::new(period);
        Ok(self.timer.is_some())
    }

    /// Start refreshing at the configured `refresh_interval`
    pub fn start_configured_refresh_timer(&mut self) -> Result<bool, ManagerError> {
        self.start_refresh_timer(self.config.refresh_interval)
    }

    pub fn stop_refresh_timer(&mut self) -> Result<(), ManagerError> {
        self.timer.take().map(|_| ()).ok_or(ManagerError::NoTimerRunning)
    }

    pub fn is_refresh_timer_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Wait for the next timer tick and refresh.
    ///
    /// Returns `false` right away when no timer is running. Cancel safe:
    /// dropping the future before the tick leaves the schedule unchanged.
    pub async fn next_refresh(&mut self) -> bool {
        let Some(timer) = self.timer.as_mut() else {
            return false;
        };
        timer.tick().await;
        self.refresh_raid_list();
        true
    }

    /// Refresh if the timer's tick has come, without waiting
    pub fn refresh_if_due(&mut self) -> Option<RefreshReport> {
        let now = tokio::time::Instant::now();
        let timer = self.timer.as_mut()?;
        if !timer.is_due(now) {
            return None;
        }
        timer.advance(now);
        Some(self.refresh_raid_list())
    }

    /// Write the raid snapshot, if persistence is configured
    pub fn save(&self) -> Result<()> {
        match &self.config.raids_path {
            Some(path) => save_snapshot(path, self.raids.iter()),
            None => Ok(()),
        }
    }

    fn auto_save(&self) {
        if !self.config.auto_save {
            return;
        }
        if let Err(e) = self.save() {
            tracing::warn!(error = %format!("{e:#}"), "Failed to save raids");
        }
    }

    fn notify_raid(&mut self, raid: &Raid, change: ChangeType, prior: Option<&Raid>) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            listener.raid_updated(self, raid, change, prior);
        }
        self.listeners = listeners;
    }

    fn notify_raid_list(&mut self) {
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            listener.raid_list_updated(self);
        }
        self.listeners = listeners;
    }
}

// Exactly one best candidate, or NotFound / Ambiguous
fn single<T: Named>(name: &str, results: Vec<Scored<T>>) -> Result<Rc<T>, ManagerError> {
    let mut results = results.into_iter();
    let Some(best) = results.next() else {
        return Err(ManagerError::NotFound(name.to_string()));
    };

    let tied: Vec<Scored<T>> = results.take_while(|r| r.score == best.score).collect();
    if !tied.is_empty() {
        let candidates = std::iter::once(&best)
            .chain(&tied)
            .map(|r| r.item.name().to_string())
            .collect();
        return Err(ManagerError::Ambiguous {
            name: name.to_string(),
            candidates,
        });
    }
    Ok(best.item)
}
