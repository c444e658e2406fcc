//! Greenwich mean and apparent sidereal time

use std::f64::consts::TAU;

use crate::nutation::nutation_terms;
use crate::time::{julian_centuries, JulianDate};
use crate::{normalize_deg, SECONDS_PER_DAY};

/// Ratio of sidereal to solar day rates
pub const SIDEREAL_RATE: f64 = 1.002_737_909_350_795;

/// Earth rotation rate in inertial space (rad/s)
pub const EARTH_ROTATION_RATE_RAD_S: f64 = 1.002_737_909_35 * TAU / SECONDS_PER_DAY;

/// 0h UT boundary and UT hours elapsed since it, with hours in [0, 24).
fn day_boundary(jd: &JulianDate) -> (f64, f64) {
    let boundary = (jd.time - 0.5).floor() + 0.5;
    let hours = (24.0 * (jd.time - boundary)).clamp(0.0, 24.0 - f64::EPSILON * 24.0);
    (boundary, hours)
}

/// GMST at the 0h UT boundary (degrees, not reduced)
fn gmst_at_boundary(boundary: f64) -> f64 {
    let t = julian_centuries(boundary);
    100.460_618_375 + 36_000.770_053_608_34 * t + 3.879_333_333_333_333e-4 * t * t
        - 2.583_333_333_333_333e-8 * t * t * t
}

/// Greenwich Mean Sidereal Time in degrees, [0, 360).
pub fn greenwich_mean_sidereal_time(jd: &JulianDate) -> f64 {
    let (boundary, hours) = day_boundary(jd);
    normalize_deg(gmst_at_boundary(boundary) + SIDEREAL_RATE * 15.0 * hours)
}

/// Local apparent sidereal time in degrees, [0, 360).
///
/// GMST plus the equation of the equinoxes (nutation evaluated at the
/// centuries of the day boundary) plus the east longitude of the observer.
/// `sidereal_time(0.0, jd)` is GAST.
pub fn sidereal_time(longitude_deg: f64, jd: &JulianDate) -> f64 {
    let (boundary, hours) = day_boundary(jd);
    let nutation = nutation_terms(julian_centuries(boundary));

    normalize_deg(
        gmst_at_boundary(boundary)
            + SIDEREAL_RATE * 15.0 * hours
            + nutation.equation_of_equinoxes_deg()
            + longitude_deg,
    )
}
