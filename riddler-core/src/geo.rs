use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

// Radians, no range enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn central_angle_to(&self, other: &GeoPoint) -> f64 {
        let cos_angle = self.lat.sin() * other.lat.sin()
            + self.lat.cos() * other.lat.cos() * (self.lon - other.lon).abs().cos();
        // Rounding can push the cosine past ±1 on coincident points.
        cos_angle.clamp(-1.0, 1.0).acos()
    }

    /// Uses `|lon1 - lon2|`, so the result always lies east of `self.lon`.
    /// That is exact when `other.lon >= self.lon`; otherwise the midpoint is
    /// taken towards `other` mirrored across `self.lon`. The operation is not
    /// commutative.
    pub fn midpoint(&self, other: &GeoPoint) -> GeoPoint {
        let dlon = (self.lon - other.lon).abs();
        let bx = other.lat.cos() * dlon.cos();
        let by = other.lat.cos() * dlon.sin();
        let lat = (self.lat.sin() + other.lat.sin())
            .atan2(((self.lat.cos() + bx).powi(2) + by.powi(2)).sqrt());
        let lon = self.lon + by.atan2(self.lat.cos() + bx);
        GeoPoint::new(lat, lon)
    }

    pub fn lat_over_pi(&self) -> f64 {
        self.lat / PI
    }

    pub fn lon_over_pi(&self) -> f64 {
        self.lon / PI
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat: {}π, lon: {}π", self.lat_over_pi(), self.lon_over_pi())
    }
}
