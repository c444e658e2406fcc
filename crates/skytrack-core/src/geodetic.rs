//! Earth-fixed Cartesian ↔ WGS84 geodetic coordinates

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::wrap_deg_180;

/// WGS84 equatorial radius (km)
pub const WGS84_SEMI_MAJOR_AXIS_KM: f64 = 6_378.137;
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;
pub const WGS84_ECCENTRICITY_SQUARED: f64 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);

const MAX_ITERATIONS: usize = 10;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    /// [-180, 180)
    pub longitude_deg: f64,
    /// Height above the ellipsoid
    pub altitude_km: f64,
}

fn prime_vertical_radius(sin_lat: f64) -> f64 {
    WGS84_SEMI_MAJOR_AXIS_KM / (1.0 - WGS84_ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt()
}

/// ECEF position (km) → geodetic latitude, longitude and height.
///
/// Fixed-point iteration on `φ = atan2(z + e²·N·sin φ, p)` starting from
/// the geocentric guess. Longitude is 0 on the polar axis.
pub fn ecef_to_geodetic(position: &Vector3<f64>) -> GeodeticPosition {
    let (x, y, z) = (position.x, position.y, position.z);
    let p = (x * x + y * y).sqrt();

    let longitude_deg = if p == 0.0 {
        0.0
    } else {
        wrap_deg_180(y.atan2(x).to_degrees())
    };

    let mut lat = z.atan2(p * (1.0 - WGS84_ECCENTRICITY_SQUARED));
    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let sin_lat = lat.sin();
        let next = (z + WGS84_ECCENTRICITY_SQUARED * prime_vertical_radius(sin_lat) * sin_lat).atan2(p);
        let delta = (next - lat).abs();
        lat = next;
        if delta < LATITUDE_TOLERANCE_RAD {
            converged = true;
            break;
        }
    }
    if !converged {
        debug!(x, y, z, latitude = lat, "geodetic latitude iteration hit its cap");
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    // valid at the poles, unlike p / cos φ - N
    let altitude_km = p * cos_lat + z * sin_lat
        - WGS84_SEMI_MAJOR_AXIS_KM * (1.0 - WGS84_ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt();

    GeodeticPosition {
        latitude_deg: lat.to_degrees(),
        longitude_deg,
        altitude_km,
    }
}

/// Geodetic position → ECEF position (km).
pub fn geodetic_to_ecef(position: &GeodeticPosition) -> Vector3<f64> {
    let (sin_lat, cos_lat) = position.latitude_deg.to_radians().sin_cos();
    let (sin_lon, cos_lon) = position.longitude_deg.to_radians().sin_cos();
    let n = prime_vertical_radius(sin_lat);
    let h = position.altitude_km;

    Vector3::new(
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_ECCENTRICITY_SQUARED) + h) * sin_lat,
    )
}
