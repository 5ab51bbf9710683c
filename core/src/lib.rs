//! Directories, lookup and raid lifecycle for a raid-tracking bot.
//!
//! # Overview
//!
//! `raidbook-core` sits between `raidbook-records` (file formats) and the
//! raid manager:
//!
//! ```text
//! raidbook-records (gym/boss/raid records)
//!        │
//!        ▼
//! raidbook-core (domain types + directories + raids) ← THIS CRATE
//!        │
//!        └─> raidbook-manager (raid manager, listeners, persistence)
//! ```
//!
//! # Main Types
//!
//! ## Domain Types
//! - [`NameKey`] - Normalized lookup key; the only way keys are derived
//! - [`Coord`], [`Region`] - Coordinates and bounding boxes
//! - [`Poi`], [`Gym`] - Named, geolocated places
//! - [`Boss`], [`Tier`], [`PokemonType`] - Raid bosses
//!
//! ## Directories
//! - [`Directory`] - Generic indexed collection with exact and fuzzy lookup
//! - [`PlaceDirectory`] / [`GymDirectory`] - Place lookup ranked by preferred
//!   cities and zones, with city and zone aggregation
//! - [`BossDirectory`] - Bosses loaded by tier, filterable by tier and activity
//!
//! ## Raids
//! - [`Raid`] - A raid at a gym, with state derived from its times
//! - [`RaidState`] - `Future`, `Egg`, `Hatched`, `Expired`
//! - [`RaidMap`] - One raid per gym
//!
//! # Example Usage
//!
//! ```ignore
//! use raidbook_core::{GymDirectory, GymLookupOptions, PlaceLookupOptions};
//!
//! let results = gyms.lookup_gyms(
//!     "central fountain",
//!     &GymLookupOptions {
//!         place: PlaceLookupOptions {
//!             preferred_cities: vec!["Springfield".to_string()],
//!             ..Default::default()
//!         },
//!         ..Default::default()
//!     },
//! )?;
//!
//! if let Some(best) = results.first() {
//!     println!("{} ({:.2})", best.item.name(), best.score);
//! }
//! ```

pub mod bosses;
pub mod directory;
pub mod places;
pub mod raids;
pub mod types;

// Re-export main types at crate root for convenience
pub use bosses::{BossDirectory, BossLoadError, BossLookupOptions};
pub use directory::{
    Directory, DirectoryConfig, DirectoryError, FuzzyOptions, Keyed, LookupFlags, NoAdjustment,
    ResultAdjuster, Scored,
};
pub use places::{
    City, ExFilter, GymDirectory, GymLookupOptions, MatchTier, PlaceDirectory, PlaceLookupOptions,
    Zone,
};
pub use raids::{
    DEFAULT_EGG_WINDOW, Raid, RaidError, RaidLookupOptions, RaidMap, RaidMapError, RaidState,
    RaidTarget, RaidTimes, RaidUpdate, StartTime,
};
pub use types::{
    Boss, BossActivity, Coord, Gym, NameError, NameKey, Named, Place, Poi, PoiError, PokemonType,
    Region, Tier,
};

// Re-export record types the domain API speaks in
pub use raidbook_records::{RaidRecord, RaidType};
