use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Degree-to-kilometre factor used for the bounding box prefilter.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Coarse rectangular prefilter around a search point.
///
/// The box circumscribes the search circle, so everything inside the radius
/// is inside the box. The corners are removed later by the exact distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        let lng_delta = radius_km / (KM_PER_DEGREE * latitude.to_radians().cos());

        Self {
            min_lat: latitude - lat_delta,
            max_lat: latitude + lat_delta,
            min_lng: longitude - lng_delta,
            max_lng: longitude + lng_delta,
        }
    }
}

#[cfg(test)]
impl BoundingBox {
    /// Inclusive on both axes, matching the store's gte/lte filters.
    pub(crate) fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude >= self.min_lng
            && longitude <= self.max_lng
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 100.0).round() / 100.0
}
