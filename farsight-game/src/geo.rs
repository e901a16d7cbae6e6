//! Great-circle distance for the viewpoint catalog.
use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS_M;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance in meters on a spherical Earth.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().clamp(0.0, 1.0).asin();
        EARTH_RADIUS_M * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero_apart() {
        let point = Coordinate::new(35.7101, 139.8107);
        assert!(point.distance_to(point).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let d = a.distance_to(b);
        assert!((d - 111_194.9).abs() < 1.0, "got {d}");
        assert!((b.distance_to(a) - d).abs() < 1e-9);
    }

    #[test]
    fn same_latitude_neighbours_match_known_value() {
        // Azuma bridge sits on the tower's latitude, 0.01 degrees west.
        let tower = Coordinate::new(35.7101, 139.8107);
        let bridge = Coordinate::new(35.7101, 139.8007);
        let d = tower.distance_to(bridge);
        assert!((d - 902.0).abs() < 2.0, "got {d}");
    }
}
