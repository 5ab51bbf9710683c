//! Coordinates, great-circle distance and rectangular regions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean earth radius used for distance calculations
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("Region minimum must not exceed its maximum")]
    InvertedRegion,
}

pub fn is_valid_latitude(latitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude)
}

pub fn is_valid_longitude(longitude: f64) -> bool {
    (-180.0..=180.0).contains(&longitude)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coord {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !is_valid_latitude(latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !is_valid_longitude(longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance in kilometres (haversine)
    pub fn distance_km(&self, other: &Coord) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

/// Axis-aligned latitude/longitude rectangle, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min: Coord,
    pub max: Coord,
}

impl Region {
    pub fn new(min: Coord, max: Coord) -> Result<Self, GeoError> {
        if min.latitude > max.latitude || min.longitude > max.longitude {
            return Err(GeoError::InvertedRegion);
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, point: &Coord) -> bool {
        point.latitude >= self.min.latitude
            && point.latitude <= self.max.latitude
            && point.longitude >= self.min.longitude
            && point.longitude <= self.max.longitude
    }
}
