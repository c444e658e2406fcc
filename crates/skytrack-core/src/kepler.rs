//! Two-body orbit determination and propagation
//!
//! Classical elements are recovered from a Cartesian state with the usual
//! angular-momentum / eccentricity-vector algebra and propagated by advancing
//! the mean anomaly and solving Kepler's equation.
//!
//! Near-equatorial or near-circular orbits are not special-cased. Every angle
//! comes from `atan2`, so the elements stay finite, but the split between
//! RAAN, argument of perigee and mean anomaly becomes arbitrary as `i → 0` or
//! `e → 0`. Their sum (and therefore the propagated state) is still correct.

use std::f64::consts::{PI, TAU};

use chrono::{DateTime, Utc};
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{normalize_deg, Frame, OrbitalError, Result, StateVector};

/// Newton-Raphson solver for Kepler's equation `M = E - e·sin E`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerSolver {
    /// Convergence threshold on the Newton step (radians)
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 10,
        }
    }
}

impl KeplerSolver {
    /// Eccentric anomaly (radians, [0, 2π)) for mean anomaly `mean_anomaly`
    /// (radians) and eccentricity `e < 1`.
    ///
    /// Returns the last iterate if the cap is reached before convergence.
    pub fn eccentric_anomaly(&self, mean_anomaly: f64, e: f64) -> f64 {
        let m = mean_anomaly.rem_euclid(TAU);
        let mut ecc_anomaly = if e > 0.8 { PI } else { m + e * m.sin() };

        for _ in 0..self.max_iterations {
            let step = (ecc_anomaly - e * ecc_anomaly.sin() - m) / (1.0 - e * ecc_anomaly.cos());
            ecc_anomaly -= step;
            if step.abs() < self.tolerance {
                return ecc_anomaly;
            }
        }

        debug!(
            mean_anomaly = m,
            eccentricity = e,
            estimate = ecc_anomaly,
            iterations = self.max_iterations,
            "Kepler iteration did not converge, using best estimate"
        );
        ecc_anomaly
    }
}

/// Osculating classical elements of a closed two-body orbit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerianElements {
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub mu_km3_s2: f64,
    pub epoch: DateTime<Utc>,
    /// Inertial frame the elements are referred to
    pub frame: Frame,
}

impl KeplerianElements {
    /// Mean motion (rad/s)
    pub fn mean_motion(&self) -> f64 {
        (self.mu_km3_s2 / self.semi_major_axis_km.powi(3)).sqrt()
    }

    pub fn period_seconds(&self) -> f64 {
        period(self.semi_major_axis_km, self.mu_km3_s2)
    }

    pub fn perigee_radius_km(&self) -> f64 {
        self.semi_major_axis_km * (1.0 - self.eccentricity)
    }

    pub fn apogee_radius_km(&self) -> f64 {
        self.semi_major_axis_km * (1.0 + self.eccentricity)
    }
}

/// Orbital period in seconds, `2π·√(a³/μ)`.
pub fn period(semi_major_axis_km: f64, mu_km3_s2: f64) -> f64 {
    TAU * (semi_major_axis_km.powi(3) / mu_km3_s2).sqrt()
}

/// Classical elements of `state` under gravitational parameter `mu`.
///
/// The state must be in an inertial frame. Fails on a non-positive `mu`, a
/// zero position vector or an open (e ≥ 1) trajectory.
pub fn state_to_elements(state: &StateVector, mu: f64) -> Result<KeplerianElements> {
    if state.frame() == Frame::Ecef {
        return Err(OrbitalError::InvalidFrame {
            expected: Frame::J2000,
            actual: Frame::Ecef,
        });
    }
    if !(mu.is_finite() && mu > 0.0) {
        return Err(OrbitalError::InvalidMu(mu));
    }

    let r = state.position();
    let v = state.velocity();
    let r_mag = r.norm();
    if r_mag == 0.0 {
        return Err(OrbitalError::ZeroPosition);
    }

    let h = r.cross(&v);
    let h_mag = h.norm();
    let e_vec = v.cross(&h) / mu - r / r_mag;
    let e = e_vec.norm();

    let energy = v.norm_squared() / 2.0 - mu / r_mag;
    let a = -mu / (2.0 * energy);
    if e >= 1.0 || !(a.is_finite() && a > 0.0) {
        return Err(OrbitalError::UnboundOrbit { eccentricity: e });
    }

    let inclination = (h.x * h.x + h.y * h.y).sqrt().atan2(h.z);
    let raan = h.x.atan2(-h.y);

    // argument of latitude, measured in the orbit plane from the ascending node
    let node = Vector3::new(raan.cos(), raan.sin(), 0.0);
    let in_plane = h.normalize().cross(&node);
    let arg_latitude = r.dot(&in_plane).atan2(r.dot(&node));

    let p = h_mag * h_mag / mu;
    let true_anomaly = (h_mag * r.dot(&v) / (mu * r_mag)).atan2(p / r_mag - 1.0);

    let ecc_anomaly = ((1.0 - e * e).sqrt() * true_anomaly.sin()).atan2(e + true_anomaly.cos());
    let mean_anomaly = ecc_anomaly - e * ecc_anomaly.sin();

    Ok(KeplerianElements {
        semi_major_axis_km: a,
        eccentricity: e,
        inclination_deg: inclination.to_degrees(),
        raan_deg: normalize_deg(raan.to_degrees()),
        arg_perigee_deg: normalize_deg((arg_latitude - true_anomaly).to_degrees()),
        mean_anomaly_deg: normalize_deg(mean_anomaly.to_degrees()),
        mu_km3_s2: mu,
        epoch: state.epoch(),
        frame: state.frame(),
    })
}

/// Perifocal → inertial rotation `R3(-Ω)·R1(-i)·R3(-ω)`.
pub(crate) fn perifocal_rotation(raan_deg: f64, inclination_deg: f64, arg_perigee_deg: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), raan_deg.to_radians())
        * Rotation3::from_axis_angle(&Vector3::x_axis(), inclination_deg.to_radians())
        * Rotation3::from_axis_angle(&Vector3::z_axis(), arg_perigee_deg.to_radians())
}

/// State at `target` on the conic described by `elements`, using the
/// default [`KeplerSolver`].
pub fn propagate(elements: &KeplerianElements, target: DateTime<Utc>) -> Result<StateVector> {
    propagate_with(&KeplerSolver::default(), elements, target)
}

pub fn propagate_with(
    solver: &KeplerSolver,
    elements: &KeplerianElements,
    target: DateTime<Utc>,
) -> Result<StateVector> {
    let a = elements.semi_major_axis_km;
    let e = elements.eccentricity;
    if !(elements.mu_km3_s2.is_finite() && elements.mu_km3_s2 > 0.0) {
        return Err(OrbitalError::InvalidMu(elements.mu_km3_s2));
    }
    if !(0.0..1.0).contains(&e) || !(a.is_finite() && a > 0.0) {
        return Err(OrbitalError::UnboundOrbit { eccentricity: e });
    }

    let dt = (target - elements.epoch).num_milliseconds() as f64 / 1000.0;
    let mean_anomaly = elements.mean_anomaly_deg.to_radians() + elements.mean_motion() * dt;
    let ecc_anomaly = solver.eccentric_anomaly(mean_anomaly, e);

    let (sin_e, cos_e) = ecc_anomaly.sin_cos();
    let beta = (1.0 - e * e).sqrt();
    let radius = a * (1.0 - e * cos_e);
    let position = Vector3::new(a * (cos_e - e), a * beta * sin_e, 0.0);
    let velocity = (elements.mu_km3_s2 * a).sqrt() / radius * Vector3::new(-sin_e, beta * cos_e, 0.0);

    let rotation = perifocal_rotation(elements.raan_deg, elements.inclination_deg, elements.arg_perigee_deg);
    StateVector::new(rotation * position, rotation * velocity, target, elements.frame)
}
