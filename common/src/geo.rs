//! Search window calculation
//!
//! Turns a centre point and a radius into the lat/lon box sent to the
//! occurrence search. The longitude span is widened by 1/|cos(lat)|, so it
//! diverges towards the poles; no guard is applied there.

use crate::types::SearchQuery;
use serde::{Deserialize, Serialize};

/// Kilometres per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.32;

/// Rectangular lat/lon window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box around `(latitude, longitude)` reaching `radius_km` in each direction
    pub fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let lat_offset = radius_km / KM_PER_DEGREE;
        let lon_offset = radius_km / (KM_PER_DEGREE * latitude.to_radians().cos().abs());

        Self {
            min_lat: latitude - lat_offset,
            max_lat: latitude + lat_offset,
            min_lon: longitude - lon_offset,
            max_lon: longitude + lon_offset,
        }
    }

    pub fn for_query(query: &SearchQuery) -> Self {
        Self::around(query.latitude, query.longitude, query.radius_km)
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lon..=self.max_lon).contains(&longitude)
    }

    /// `min,max` latitude range in the occurrence API's format
    pub fn latitude_range(&self) -> String {
        format!("{},{}", self.min_lat, self.max_lat)
    }

    /// `min,max` longitude range in the occurrence API's format
    pub fn longitude_range(&self) -> String {
        format!("{},{}", self.min_lon, self.max_lon)
    }

    pub fn lat_half_width(&self) -> f64 {
        (self.max_lat - self.min_lat) / 2.0
    }

    pub fn lon_half_width(&self) -> f64 {
        (self.max_lon - self.min_lon) / 2.0
    }
}
