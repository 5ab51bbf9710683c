//! Place directories: categorized lookup plus city and zone aggregation

mod categorize;
mod directory;
mod gyms;

pub use categorize::{
    Categorized, Category, MatchTier, PlaceAdjuster, PlaceCriteria, PlaceLookupOptions,
};
pub use directory::{City, PlaceDirectory, Zone};
pub use gyms::{ExFilter, GymDirectory, GymLookupOptions};

#[cfg(test)]
pub(crate) use gyms::tests::gym_directory;
