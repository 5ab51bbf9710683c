use serde::{Deserialize, Serialize};

use super::categorize::PlaceLookupOptions;
use super::directory::PlaceDirectory;
use crate::directory::{DirectoryError, Scored};
use crate::types::Gym;

pub type GymDirectory = PlaceDirectory<Gym>;

/// Restrict results by EX raid eligibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExFilter {
    #[default]
    Any,
    ExOnly,
    NonExOnly,
}

impl ExFilter {
    pub fn accepts(&self, gym: &Gym) -> bool {
        match self {
            ExFilter::Any => true,
            ExFilter::ExOnly => gym.is_ex_eligible(),
            ExFilter::NonExOnly => !gym.is_ex_eligible(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GymLookupOptions {
    pub place: PlaceLookupOptions,
    pub ex_filter: ExFilter,
}

impl PlaceDirectory<Gym> {
    pub fn lookup_gyms(
        &self,
        name: &str,
        options: &GymLookupOptions,
    ) -> Result<Vec<Scored<Gym>>, DirectoryError> {
        let ex_filter = options.ex_filter;
        let accepts = move |gym: &Gym| ex_filter.accepts(gym);
        self.lookup(name, &options.place, Some(&accepts))
    }
}
