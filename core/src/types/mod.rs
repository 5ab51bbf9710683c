//! Domain types: names, places, gyms and bosses

mod boss;
mod geo;
mod gym;
mod name;
mod pokemon_type;
mod poi;
mod tier;

pub use boss::{Boss, BossActivity, BossError, CpRange, DateRange};
pub use geo::{Coord, EARTH_RADIUS_KM, GeoError, Region, is_valid_latitude, is_valid_longitude};
pub use gym::Gym;
pub use name::{NameError, NameKey, Named};
pub use poi::{Place, Poi, PoiError};
pub use pokemon_type::PokemonType;
pub use tier::Tier;

#[cfg(test)]
pub(crate) use boss::tests::boss_record;
