//! Raid manager for a raid-tracking bot.
//!
//! [`RaidManager`] owns the gym and boss directories and the raid map. It
//! loads them at construction, notifies [`RaidListener`]s of every change,
//! refreshes raid lifecycles on a timer and persists raids to a snapshot
//! file.
//!
//! Everything here runs on one logical thread. The refresh timer is an
//! owned handle that the embedding event loop drives:
//!
//! ```ignore
//! let mut manager = RaidManager::new(ManagerConfig::default())?;
//! manager.start_refresh_timer(Duration::from_secs(60))?;
//!
//! loop {
//!     tokio::select! {
//!         _ = manager.next_refresh() => {}
//!         Some(command) = commands.recv() => handle(&mut manager, command),
//!     }
//! }
//! ```

mod clock;
mod config;
mod listener;
mod manager;
mod snapshot;
mod timer;

use raidbook_core::{DirectoryError, RaidError, RaidMapError};
use thiserror::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ManagerConfig;
pub use listener::{ChangeType, RaidListener};
pub use manager::{BossRef, GymRef, RaidChange, RaidManager, RefreshReport};
pub use snapshot::{load_bosses, load_gyms, load_snapshot, save_snapshot};
pub use timer::RefreshTimer;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ManagerError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{name:?} is ambiguous: {}", .candidates.join(", "))]
    Ambiguous { name: String, candidates: Vec<String> },

    #[error("Raid already exists at {0}")]
    AlreadyExists(String),

    #[error("Timer already running")]
    TimerAlreadyRunning,

    #[error("No timer is running")]
    NoTimerRunning,

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Raid(#[from] RaidError),

    #[error(transparent)]
    RaidMap(#[from] RaidMapError),
}
