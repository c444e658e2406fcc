//! Sky Tracking Core
//!
//! Time-scale conversions, IAU 1976/1980 precession-nutation frame transforms,
//! two-body orbit determination and propagation, and low-precision Sun/Moon
//! ephemerides for tracking an orbiting object (the ISS, typically) together
//! with the observer-relative geometry of the Sun and Moon.
//!
//! Every function here is a pure computation over immutable values. The
//! state vector of the tracked object is owned by the caller and threaded
//! through explicitly; nothing is cached between calls.
//!
//! Units: kilometres, km/s, seconds, and degrees at the public surface.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ephemeris;
pub mod frames;
pub mod geodetic;
pub mod horizon;
pub mod kepler;
pub mod nutation;
pub mod sidereal;
pub mod time;
pub mod track;

// Re-exports
pub use ephemeris::{Body, EquatorialCoordinates};
pub use frames::convert_frame;
pub use geodetic::GeodeticPosition;
pub use horizon::{HorizontalCoordinates, Observer, RiseSet, SubPoint};
pub use kepler::{KeplerianElements, KeplerSolver};
pub use nutation::NutationParameters;
pub use time::{EpochOffset, JulianDate};
pub use track::{
    compute_altitude, compute_body_position, compute_ground_track, compute_ground_track_window,
    compute_horizontal, compute_rise_set, compute_sub_point, propagate_state, BodySnapshot,
    GroundTrack, GroundTrackSample, SkySnapshot, TrackedObject,
};

/// Earth gravitational parameter (km³/s²)
pub const EARTH_MU_KM3_S2: f64 = 398_600.4418;
/// Julian Time of 2000-01-01 12:00:00 (J2000.0)
pub const J2000_JD: f64 = 2_451_545.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitalError {
    #[error("Non-finite {field} component: {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("Gravitational parameter must be positive and finite, got {0}")]
    InvalidMu(f64),
    #[error("Position vector has zero length")]
    ZeroPosition,
    #[error("Trajectory is not a closed orbit (eccentricity {eccentricity:.6})")]
    UnboundOrbit { eccentricity: f64 },
    #[error("Expected a state in the {expected:?} frame, got {actual:?}")]
    InvalidFrame { expected: Frame, actual: Frame },
    #[error("Scan step must be finite and at least 1e-5 days, got {0}")]
    InvalidStep(f64),
    #[error("Sample count must be at least 1")]
    InvalidSampleCount,
}

pub type Result<T> = std::result::Result<T, OrbitalError>;

/// Reference frame a [`StateVector`] is expressed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frame {
    /// Mean equator and equinox of J2000.0 (inertial)
    J2000,
    /// True equator and equinox of date (precession + nutation applied)
    TrueEquator,
    /// Earth-centred, Earth-fixed
    Ecef,
}

/// Position/velocity of a body at an epoch, tagged with its frame.
///
/// Values are immutable: every transform returns a new `StateVector`.
/// Construction rejects non-finite components so NaNs never reach the
/// geometry code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "StateVectorFields")]
pub struct StateVector {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    epoch: DateTime<Utc>,
    frame: Frame,
}

#[derive(Deserialize)]
struct StateVectorFields {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
    epoch: DateTime<Utc>,
    frame: Frame,
}

impl TryFrom<StateVectorFields> for StateVector {
    type Error = OrbitalError;

    fn try_from(fields: StateVectorFields) -> Result<Self> {
        Self::new(fields.position, fields.velocity, fields.epoch, fields.frame)
    }
}

impl StateVector {
    pub fn new(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        epoch: DateTime<Utc>,
        frame: Frame,
    ) -> Result<Self> {
        ensure_finite("position", &position)?;
        ensure_finite("velocity", &velocity)?;
        Ok(Self {
            position,
            velocity,
            epoch,
            frame,
        })
    }

    /// J2000 state from km and km/s components, the layout telemetry arrives in.
    pub fn j2000(position_km: [f64; 3], velocity_km_s: [f64; 3], epoch: DateTime<Utc>) -> Result<Self> {
        Self::new(
            Vector3::from(position_km),
            Vector3::from(velocity_km_s),
            epoch,
            Frame::J2000,
        )
    }

    /// Internal constructor for transform outputs whose inputs were already validated.
    pub(crate) fn derived(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        epoch: DateTime<Utc>,
        frame: Frame,
    ) -> Self {
        Self {
            position,
            velocity,
            epoch,
            frame,
        }
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Distance from Earth's centre (km)
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    /// Speed (km/s)
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

pub(crate) fn ensure_finite(field: &'static str, v: &Vector3<f64>) -> Result<()> {
    match v.iter().find(|c| !c.is_finite()) {
        Some(&value) => Err(OrbitalError::NonFinite { field, value }),
        None => Ok(()),
    }
}

/// Map an angle in degrees to [0, 360).
pub fn normalize_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Map an angle in degrees to [-180, 180).
pub fn wrap_deg_180(angle: f64) -> f64 {
    normalize_deg(angle + 180.0) - 180.0
}
