//! Low-precision Sun and Moon ephemerides
//!
//! Both bodies are evaluated by the same secular-element model: six
//! elements that vary linearly with Julian centuries, an unperturbed Kepler
//! orbit, and a rotation from the mean ecliptic to the equator by a fixed
//! obliquity. No perturbation terms are applied, so the Moon can be off by
//! a degree or two. That is fine for altitude and rise/set estimates.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::kepler::{perifocal_rotation, KeplerSolver};
use crate::time::{degrees_to_hms, julian_centuries, Hms};
use crate::normalize_deg;

/// Mean obliquity used to rotate ecliptic positions to the equator (degrees)
pub const ECLIPTIC_OBLIQUITY_DEG: f64 = 23.436_88;

/// One orbital element: value at J2000.0 plus a linear rate per Julian century.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecularElement {
    pub value: f64,
    pub rate_per_century: f64,
}

impl SecularElement {
    pub const fn new(value: f64, rate_per_century: f64) -> Self {
        Self {
            value,
            rate_per_century,
        }
    }

    pub fn at(&self, centuries: f64) -> f64 {
        self.value + self.rate_per_century * centuries
    }
}

/// Which body sits at the focus of an element set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Centre {
    /// Elements describe the Earth around the Sun; the geocentric position
    /// of the Sun is the negated result.
    Sun,
    /// Elements describe a body around the Earth.
    Earth,
}

/// Secular orbital elements of one body.
///
/// Angles in degrees; `semi_major_axis` in the set's native length unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElementSet {
    pub semi_major_axis: SecularElement,
    pub eccentricity: SecularElement,
    pub inclination: SecularElement,
    pub ascending_node: SecularElement,
    pub perihelion_longitude: SecularElement,
    pub mean_longitude: SecularElement,
    /// Added to the Julian Time before evaluation, for element sets whose
    /// reference epoch is not J2000.0 noon.
    pub epoch_offset_days: f64,
    pub centre: Centre,
}

/// Earth around the Sun, in AU, from the J2000 mean elements.
pub const EARTH_HELIOCENTRIC: OrbitalElementSet = OrbitalElementSet {
    semi_major_axis: SecularElement::new(1.000_000_11, -0.000_000_05),
    eccentricity: SecularElement::new(0.016_710_22, -0.000_038_04),
    inclination: SecularElement::new(0.000_05, -46.94 / 3600.0),
    ascending_node: SecularElement::new(-11.260_64, -18_228.25 / 3600.0),
    perihelion_longitude: SecularElement::new(102.947_19, 1_198.28 / 3600.0),
    mean_longitude: SecularElement::new(100.464_36, 0.985_609_10 * 36_525.0),
    epoch_offset_days: 0.0,
    centre: Centre::Sun,
};

/// Moon around the Earth, in Earth radii.
///
/// The element values refer to 1999-12-31 0h UT, 1.5 days before J2000.0.
pub const MOON_GEOCENTRIC: OrbitalElementSet = OrbitalElementSet {
    semi_major_axis: SecularElement::new(60.2666, 0.0),
    eccentricity: SecularElement::new(0.0549, 0.0),
    inclination: SecularElement::new(5.1454, 0.0),
    ascending_node: SecularElement::new(125.1228, -1_934.137_848_157_5),
    perihelion_longitude: SecularElement::new(83.1862, 4_069.013_348_85),
    mean_longitude: SecularElement::new(198.5516, 13.176_396_464_9 * 36_525.0),
    epoch_offset_days: 1.5,
    centre: Centre::Earth,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
}

impl Body {
    pub fn elements(&self) -> &'static OrbitalElementSet {
        match self {
            Body::Sun => &EARTH_HELIOCENTRIC,
            Body::Moon => &MOON_GEOCENTRIC,
        }
    }

    /// Apparent angular radius (degrees); its negative is the rise/set threshold altitude.
    pub fn angular_radius_deg(&self) -> f64 {
        match self {
            Body::Sun => 0.265,
            Body::Moon => 0.259,
        }
    }
}

/// Right ascension, declination and distance of a body as seen from the
/// Earth's centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialCoordinates {
    /// [0, 360)
    pub right_ascension_deg: f64,
    pub declination_deg: f64,
    /// AU for the Sun, Earth radii for the Moon
    pub distance: f64,
}

impl EquatorialCoordinates {
    pub fn from_cartesian(v: &Vector3<f64>) -> Self {
        let rho = (v.x * v.x + v.y * v.y).sqrt();
        Self {
            right_ascension_deg: normalize_deg(v.y.atan2(v.x).to_degrees()),
            declination_deg: v.z.atan2(rho).to_degrees(),
            distance: v.norm(),
        }
    }

    pub fn right_ascension_hms(&self) -> Hms {
        degrees_to_hms(self.right_ascension_deg)
    }
}

/// Mean-ecliptic Cartesian position of the body described by `set`, centred
/// on the set's focus, at Julian Time `julian_time`.
pub fn ecliptic_position(set: &OrbitalElementSet, julian_time: f64) -> Vector3<f64> {
    let t = julian_centuries(julian_time + set.epoch_offset_days);

    let a = set.semi_major_axis.at(t);
    let e = set.eccentricity.at(t);
    let node = set.ascending_node.at(t);
    let perihelion = set.perihelion_longitude.at(t);
    let mean_anomaly = (set.mean_longitude.at(t) - perihelion).to_radians();

    let ecc_anomaly = KeplerSolver::default().eccentric_anomaly(mean_anomaly, e);
    let (sin_e, cos_e) = ecc_anomaly.sin_cos();
    let perifocal = Vector3::new(a * (cos_e - e), a * (1.0 - e * e).sqrt() * sin_e, 0.0);

    perifocal_rotation(node, set.inclination.at(t), perihelion - node) * perifocal
}

/// Geocentric equatorial coordinates of `body` at Julian Time `julian_time`.
pub fn equatorial_position(body: Body, julian_time: f64) -> EquatorialCoordinates {
    let set = body.elements();
    let position = match set.centre {
        Centre::Sun => -ecliptic_position(set, julian_time),
        Centre::Earth => ecliptic_position(set, julian_time),
    };

    let to_equator = Rotation3::from_axis_angle(&Vector3::x_axis(), ECLIPTIC_OBLIQUITY_DEG.to_radians());
    EquatorialCoordinates::from_cartesian(&(to_equator * position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::J2000_JD;

    #[test]
    fn test_sun_at_j2000() {
        let sun = equatorial_position(Body::Sun, J2000_JD);
        assert!((sun.right_ascension_deg - 281.29).abs() < 0.1, "RA = {}", sun.right_ascension_deg);
        assert!((sun.declination_deg + 23.03).abs() < 0.1, "dec = {}", sun.declination_deg);
        assert!((sun.distance - 0.9833).abs() < 0.001);
    }

    #[test]
    fn test_sun_near_equinox() {
        // 2000-03-20 07:35 UTC: Sun crosses the equator at RA 0
        let sun = equatorial_position(Body::Sun, 2_451_623.816);
        assert!(sun.declination_deg.abs() < 0.05, "dec = {}", sun.declination_deg);
        let ra = sun.right_ascension_deg.min(360.0 - sun.right_ascension_deg);
        assert!(ra < 0.1, "RA = {}", sun.right_ascension_deg);
    }

    #[test]
    fn test_moon_meeus_example() {
        // Meeus example 47.a, 1992 April 12 0h: RA 134.69°, dec 13.77°, 57.76 Earth radii
        let moon = equatorial_position(Body::Moon, 2_448_724.5);
        assert!((moon.right_ascension_deg - 134.69).abs() < 3.0, "RA = {}", moon.right_ascension_deg);
        assert!((moon.declination_deg - 13.77).abs() < 1.5, "dec = {}", moon.declination_deg);
        assert!((55.5..64.5).contains(&moon.distance), "distance = {}", moon.distance);
    }

    #[test]
    fn test_moon_mean_longitude_offset() {
        let set = &MOON_GEOCENTRIC;
        let t = julian_centuries(2_448_724.5 + set.epoch_offset_days);
        let mean_longitude = normalize_deg(set.mean_longitude.at(t));
        assert!((mean_longitude - 134.290).abs() < 0.01);
    }

    #[test]
    fn test_right_ascension_range() {
        for step in 0..400 {
            let jt = J2000_JD + step as f64 * 1.37;
            for body in [Body::Sun, Body::Moon] {
                let eq = equatorial_position(body, jt);
                assert!((0.0..360.0).contains(&eq.right_ascension_deg));
                assert!(eq.declination_deg.abs() <= 29.0);
            }
        }
    }

    #[test]
    fn test_right_ascension_hms() {
        let eq = EquatorialCoordinates::from_cartesian(&Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(eq.right_ascension_hms().hours, 18);
        assert_eq!(eq.declination_deg, 0.0);
    }
}
