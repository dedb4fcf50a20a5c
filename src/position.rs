use serde::{Deserialize, Serialize};

/// One radar (or predicted-track) position report for an aircraft.
/// Ephemeral - produced once per update cycle and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub latitude: f64,
    pub longitude: f64,
    /// Pressure altitude (or flight level converted to feet) from Mode C
    pub altitude_ft: i32,
    pub vertical_speed_fpm: i32,
    pub ground_speed_kts: i32,
}

/// Mean earth radius in nautical miles
const EARTH_RADIUS_NM: f64 = 3440.065;

/// Great-circle distance between two coordinates in nautical miles
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_NM * c
}

impl PositionSample {
    /// Distance from this sample to a named coordinate, in nautical miles
    pub fn distance_to_nm(&self, latitude: f64, longitude: f64) -> f64 {
        distance_nm(self.latitude, self.longitude, latitude, longitude)
    }
}
