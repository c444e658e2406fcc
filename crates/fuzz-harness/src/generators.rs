//! proptest strategies for sky-tracking inputs
//!
//! Angles in degrees, lengths in km, epochs as UTC instants.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

/// Mean equatorial radius used to turn altitudes into semi-major axes (km)
pub const EARTH_RADIUS_KM: f64 = 6_378.137;

// ============================================================================
// Angle Generators
// ============================================================================

/// Latitude (-90 to 90 deg)
pub fn latitude_deg() -> impl Strategy<Value = f64> {
    -90.0..=90.0f64
}

/// Latitude away from the poles, where azimuth and hour angle stay well defined
pub fn latitude_mid_deg() -> impl Strategy<Value = f64> {
    -80.0..=80.0f64
}

/// Longitude (-180 to 180 deg)
pub fn longitude_deg() -> impl Strategy<Value = f64> {
    -180.0..180.0f64
}

/// Right ascension (0-360 deg)
pub fn right_ascension_deg() -> impl Strategy<Value = f64> {
    0.0..360.0f64
}

/// Declination (-90 to 90 deg)
pub fn declination_deg() -> impl Strategy<Value = f64> {
    -89.0..=89.0f64
}

/// Any finite angle, including several turns either way
pub fn any_angle_deg() -> impl Strategy<Value = f64> {
    -3600.0..3600.0f64
}

// ============================================================================
// Orbital Domain Generators
// ============================================================================

/// Altitude in km (LEO to GEO)
pub fn altitude_km() -> impl Strategy<Value = f64> {
    200.0..=36_000.0f64
}

/// LEO altitude (ISS-like shells)
pub fn altitude_leo() -> impl Strategy<Value = f64> {
    300.0..=2_000.0f64
}

/// Eccentricity of a closed orbit whose perigee stays above the surface
/// for LEO-to-GEO altitudes
pub fn eccentricity() -> impl Strategy<Value = f64> {
    0.0..0.3f64
}

/// Near-circular eccentricity (0-0.01)
pub fn eccentricity_circular() -> impl Strategy<Value = f64> {
    0.0..0.01f64
}

/// Inclination in degrees, avoiding the equatorial singularity
pub fn inclination_deg() -> impl Strategy<Value = f64> {
    1.0..179.0f64
}

pub fn raan_deg() -> impl Strategy<Value = f64> {
    0.0..360.0f64
}

pub fn arg_perigee_deg() -> impl Strategy<Value = f64> {
    0.0..360.0f64
}

pub fn mean_anomaly_deg() -> impl Strategy<Value = f64> {
    0.0..360.0f64
}

// ============================================================================
// Time Generators
// ============================================================================

/// UTC instant between 1990 and 2050, millisecond resolution
pub fn epoch() -> impl Strategy<Value = DateTime<Utc>> {
    // 1990-01-01 .. 2050-01-01
    (631_152_000_000i64..2_524_608_000_000i64)
        .prop_filter_map("out of chrono range", |ms| Utc.timestamp_millis_opt(ms).single())
}

/// Propagation span in seconds (up to two days either way)
pub fn propagation_seconds() -> impl Strategy<Value = i64> {
    -172_800i64..=172_800
}

// ============================================================================
// Composite Generators
// ============================================================================

/// Classical elements of a bound Earth orbit, in degrees and km
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitCase {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
}

/// Closed orbit with perigee altitude in the LEO-to-GEO range
pub fn orbit_case() -> impl Strategy<Value = OrbitCase> {
    (
        altitude_km(),
        eccentricity(),
        inclination_deg(),
        raan_deg(),
        arg_perigee_deg(),
        mean_anomaly_deg(),
    )
        .prop_map(|(perigee_alt, e, i, raan, argp, m)| OrbitCase {
            semi_major_axis_km: (EARTH_RADIUS_KM + perigee_alt) / (1.0 - e),
            eccentricity: e,
            inclination_deg: i,
            raan_deg: raan,
            arg_perigee_deg: argp,
            mean_anomaly_deg: m,
        })
}

/// Near-circular LEO orbit, the regime of the tracked station
pub fn orbit_case_leo() -> impl Strategy<Value = OrbitCase> {
    (
        altitude_leo(),
        eccentricity_circular(),
        inclination_deg(),
        raan_deg(),
        arg_perigee_deg(),
        mean_anomaly_deg(),
    )
        .prop_map(|(alt, e, i, raan, argp, m)| OrbitCase {
            semi_major_axis_km: EARTH_RADIUS_KM + alt,
            eccentricity: e,
            inclination_deg: i,
            raan_deg: raan,
            arg_perigee_deg: argp,
            mean_anomaly_deg: m,
        })
}

/// Ground observer (longitude, latitude)
pub fn observer() -> impl Strategy<Value = (f64, f64)> {
    (longitude_deg(), latitude_mid_deg())
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_orbit_case_bounds(orbit in orbit_case()) {
            prop_assert!(orbit.eccentricity < 1.0);
            let perigee = orbit.semi_major_axis_km * (1.0 - orbit.eccentricity);
            prop_assert!(perigee >= EARTH_RADIUS_KM + 200.0 - 1e-6);
        }

        #[test]
        fn test_epoch_bounds(t in epoch()) {
            prop_assert!(t >= Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap());
            prop_assert!(t < Utc.with_ymd_and_hms(2050, 1, 1, 0, 0, 0).unwrap());
        }

        #[test]
        fn test_latitude_bounds(v in latitude_deg()) {
            prop_assert!((-90.0..=90.0).contains(&v));
        }
    }
}
