//! Reference frame transforms
//!
//! J2000 → true equator of date (IAU 1976 precession, IAU 1980 nutation) →
//! Earth-fixed (rotation by GAST). Rotation matrices are written as active
//! rotations; the passive `R1/R2/R3(a)` of the astronomical literature is
//! the active rotation by `-a`.

use nalgebra::{Rotation3, Vector3};
use tracing::trace;

use crate::nutation::{nutation_terms, NutationParameters};
use crate::sidereal::{sidereal_time, EARTH_ROTATION_RATE_RAD_S};
use crate::time::JulianDate;
use crate::{Frame, OrbitalError, Result, StateVector};

fn rot_x(angle_deg: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle_deg.to_radians())
}

fn rot_y(angle_deg: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle_deg.to_radians())
}

fn rot_z(angle_deg: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle_deg.to_radians())
}

/// IAU 1976 precession angles (ζ, z, θ) in degrees for `t` centuries since J2000.0.
pub fn precession_angles(t: f64) -> (f64, f64, f64) {
    let t2 = t * t;
    let t3 = t2 * t;
    let zeta = 0.640_616_138_8 * t + 8.385_555_555_5e-5 * t2 + 4.999_444_444_4e-6 * t3;
    let z = 0.640_616_138_8 * t + 3.040_777_777_7e-4 * t2 + 5.056_388_888_8e-6 * t3;
    let theta = 0.556_753_027_7 * t - 1.185_138_888_8e-4 * t2 - 1.162_027_777_7e-5 * t3;
    (zeta, z, theta)
}

/// Mean equator of J2000.0 → mean equator of date, `R3(-z)·R2(θ)·R3(-ζ)`.
pub fn precession_matrix(t: f64) -> Rotation3<f64> {
    let (zeta, z, theta) = precession_angles(t);
    rot_z(z) * rot_y(-theta) * rot_z(zeta)
}

/// Mean equator of date → true equator of date, `R1(-ε-Δε)·R3(-Δψ)·R1(ε)`.
pub fn nutation_matrix(nutation: &NutationParameters) -> Rotation3<f64> {
    rot_x(nutation.true_obliquity_deg())
        * rot_z(nutation.delta_psi_deg)
        * rot_x(-nutation.mean_obliquity_deg)
}

/// Combined J2000 → true-of-date rotation at `jd`.
fn true_equator_rotation(jd: &JulianDate) -> Rotation3<f64> {
    let t = jd.centuries();
    nutation_matrix(&nutation_terms(t)) * precession_matrix(t)
}

/// GAST (degrees) at the state's epoch and the matching Earth rotation.
fn earth_rotation(state: &StateVector) -> (f64, Rotation3<f64>) {
    let gast = sidereal_time(0.0, &JulianDate::from_datetime(&state.epoch()));
    (gast, rot_z(-gast))
}

fn expect_frame(state: &StateVector, expected: Frame) -> Result<()> {
    if state.frame() == expected {
        Ok(())
    } else {
        Err(OrbitalError::InvalidFrame {
            expected,
            actual: state.frame(),
        })
    }
}

/// J2000 → true equator and equinox of date.
///
/// Position and velocity receive the same rotation; precession and
/// nutation rates are neglected.
pub fn to_true_equator(state: &StateVector) -> Result<StateVector> {
    expect_frame(state, Frame::J2000)?;
    let rotation = true_equator_rotation(&JulianDate::from_datetime(&state.epoch()));

    Ok(StateVector::derived(
        rotation * state.position(),
        rotation * state.velocity(),
        state.epoch(),
        Frame::TrueEquator,
    ))
}

/// True equator of date → J2000.
pub fn from_true_equator(state: &StateVector) -> Result<StateVector> {
    expect_frame(state, Frame::TrueEquator)?;
    let rotation = true_equator_rotation(&JulianDate::from_datetime(&state.epoch())).inverse();

    Ok(StateVector::derived(
        rotation * state.position(),
        rotation * state.velocity(),
        state.epoch(),
        Frame::J2000,
    ))
}

/// J2000 or true-of-date → Earth-fixed.
///
/// `r_ecef = R3(GAST)·r_tod` and
/// `v_ecef = R3(GAST)·v_tod + ω·[-sinθ·x + cosθ·y, -cosθ·x - sinθ·y, 0]`
/// with `x, y` the true-of-date position, which equals `R·v - ω×r_ecef`.
pub fn to_ecef(state: &StateVector) -> Result<StateVector> {
    let tod = match state.frame() {
        Frame::J2000 => to_true_equator(state)?,
        Frame::TrueEquator => *state,
        Frame::Ecef => {
            return Err(OrbitalError::InvalidFrame {
                expected: Frame::TrueEquator,
                actual: Frame::Ecef,
            })
        }
    };

    let (gast, rotation) = earth_rotation(&tod);
    let (sin_t, cos_t) = gast.to_radians().sin_cos();
    let r = tod.position();
    let transport = EARTH_ROTATION_RATE_RAD_S
        * Vector3::new(-sin_t * r.x + cos_t * r.y, -cos_t * r.x - sin_t * r.y, 0.0);

    let ecef = StateVector::derived(
        rotation * r,
        rotation * tod.velocity() + transport,
        tod.epoch(),
        Frame::Ecef,
    );
    trace!(epoch = %ecef.epoch(), x = ecef.position().x, y = ecef.position().y, z = ecef.position().z, "ECEF state");
    Ok(ecef)
}

/// Earth-fixed → true equator of date, the exact inverse of [`to_ecef`].
pub fn from_ecef(state: &StateVector) -> Result<StateVector> {
    expect_frame(state, Frame::Ecef)?;
    let inverse = earth_rotation(state).1.inverse();
    let omega = Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE_RAD_S);
    let r = state.position();

    Ok(StateVector::derived(
        inverse * r,
        inverse * (state.velocity() + omega.cross(&r)),
        state.epoch(),
        Frame::TrueEquator,
    ))
}

/// Express `state` in `target`, routing through J2000 when needed.
pub fn convert_frame(state: &StateVector, target: Frame) -> Result<StateVector> {
    if state.frame() == target {
        return Ok(*state);
    }
    trace!(from = ?state.frame(), to = ?target, "frame conversion");

    let j2000 = match state.frame() {
        Frame::J2000 => *state,
        Frame::TrueEquator => from_true_equator(state)?,
        Frame::Ecef => from_true_equator(&from_ecef(state)?)?,
    };

    match target {
        Frame::J2000 => Ok(j2000),
        Frame::TrueEquator => to_true_equator(&j2000),
        Frame::Ecef => to_ecef(&j2000),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn iss_state() -> StateVector {
        let epoch = Utc.with_ymd_and_hms(2021, 11, 22, 0, 43, 0).unwrap();
        StateVector::j2000(
            [-2_478.064, 5_765.348, 2_693.120],
            [-4.944_203, -4.075_330, 4.163_486],
            epoch,
        )
        .unwrap()
    }

    #[test]
    fn test_precession_identity_at_j2000() {
        let p = precession_matrix(0.0);
        assert!((p.matrix() - nalgebra::Matrix3::identity()).norm() < 1e-14);
    }

    #[test]
    fn test_precession_moves_pole() {
        // J2000 pole seen in the frame of date: dec = 90 - θ, RA = 180 + z
        let t = 1.0;
        let (_, z, theta) = precession_angles(t);
        let pole = precession_matrix(t) * Vector3::z();
        let dec = pole.z.asin().to_degrees();
        let ra = crate::normalize_deg(pole.y.atan2(pole.x).to_degrees());
        assert!((dec - (90.0 - theta)).abs() < 1e-9);
        assert!((ra - (180.0 + z)).abs() < 1e-6);
    }

    #[test]
    fn test_nutation_matrix_identity_without_nutation() {
        let n = NutationParameters {
            mean_obliquity_deg: 23.44,
            delta_psi_deg: 0.0,
            delta_eps_deg: 0.0,
        };
        assert!((nutation_matrix(&n).matrix() - nalgebra::Matrix3::identity()).norm() < 1e-14);
    }

    #[test]
    fn test_true_equator_preserves_norms() {
        let state = iss_state();
        let tod = to_true_equator(&state).unwrap();
        assert_eq!(tod.frame(), Frame::TrueEquator);
        assert!((tod.radius() - state.radius()).abs() < 1e-9);
        assert!((tod.speed() - state.speed()).abs() < 1e-12);
        // ~22 years of precession moves the vector by roughly 0.3 deg
        let angle = tod.position().angle(&state.position()).to_degrees();
        assert!(angle > 0.05 && angle < 0.5, "angle = {}", angle);
    }

    #[test]
    fn test_ecef_round_trip() {
        let state = iss_state();
        let ecef = convert_frame(&state, Frame::Ecef).unwrap();
        assert_eq!(ecef.frame(), Frame::Ecef);
        assert!((ecef.radius() - state.radius()).abs() < 1e-9);

        let back = convert_frame(&ecef, Frame::J2000).unwrap();
        assert_eq!(back.frame(), Frame::J2000);
        assert!((back.position() - state.position()).norm() < 1e-8);
        assert!((back.velocity() - state.velocity()).norm() < 1e-11);
    }

    #[test]
    fn test_transport_term_earth_fixed_point() {
        let epoch = Utc.with_ymd_and_hms(2021, 3, 20, 9, 37, 0).unwrap();
        let r = Vector3::new(3_000.0, -4_500.0, 3_200.0);
        let omega = Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE_RAD_S);
        let tod = StateVector::new(r, omega.cross(&r), epoch, Frame::TrueEquator).unwrap();

        let ecef = to_ecef(&tod).unwrap();
        assert!(ecef.speed() < 1e-12, "residual speed {}", ecef.speed());
        assert!((ecef.position().z - r.z).abs() < 1e-12);
    }

    #[test]
    fn test_transport_term_matches_cross_product() {
        let ecef = to_ecef(&iss_state()).unwrap();
        let tod = to_true_equator(&iss_state()).unwrap();
        let omega = Vector3::new(0.0, 0.0, EARTH_ROTATION_RATE_RAD_S);
        let (_, rotation) = earth_rotation(&tod);
        let expected = rotation * tod.velocity() - omega.cross(&ecef.position());
        assert!((ecef.velocity() - expected).norm() < 1e-12);
        // inertial ISS speed ~7.66 km/s, Earth-relative slightly less for a prograde orbit
        assert!(ecef.speed() < tod.speed());
    }

    #[test]
    fn test_frame_mismatch_rejected() {
        let state = iss_state();
        let err = from_ecef(&state).unwrap_err();
        assert_eq!(
            err,
            OrbitalError::InvalidFrame {
                expected: Frame::Ecef,
                actual: Frame::J2000
            }
        );
        assert!(to_true_equator(&to_ecef(&state).unwrap()).is_err());
    }
}
