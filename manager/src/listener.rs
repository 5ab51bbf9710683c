use raidbook_core::Raid;

use crate::RaidManager;

/// What happened to a raid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Added,
    Updated,
    Hatched,
    Ended,
    Deleted,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Updated => "updated",
            ChangeType::Hatched => "hatched",
            ChangeType::Ended => "ended",
            ChangeType::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receives raid change notifications.
///
/// All methods have default no-op implementations, so you only need to
/// implement the events you care about. Notifications are delivered
/// synchronously, in registration order, before the mutating call returns.
/// Listeners must not call back into the manager from a notification.
///
/// # Example
///
/// ```ignore
/// struct Announcer {
///     channel: ChannelId,
/// }
///
/// impl RaidListener for Announcer {
///     fn raid_updated(
///         &mut self,
///         _: &RaidManager,
///         raid: &Raid,
///         change: ChangeType,
///         _: Option<&Raid>,
///     ) {
///         let gym = raid.gym().name();
///         self.channel.say(format!("{} raid at {gym}: {change}", raid.tier()));
///     }
/// }
/// ```
pub trait RaidListener {
    /// Called after a single raid is added, updated or deleted.
    /// `prior` is the raid that was replaced, if any.
    fn raid_updated(
        &mut self,
        manager: &RaidManager,
        raid: &Raid,
        change: ChangeType,
        prior: Option<&Raid>,
    ) {
        let _ = (manager, raid, change, prior);
    }

    /// Called once per refresh pass that changed anything.
    fn raid_list_updated(&mut self, manager: &RaidManager) {
        let _ = manager;
    }
}
