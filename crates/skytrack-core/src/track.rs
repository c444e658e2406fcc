//! Query surface used by collaborators (renderers, panels, the CLI).
//!
//! Every function takes the epoch and, where relevant, the tracked object's
//! state vector explicitly. Nothing is cached between calls.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ephemeris::{equatorial_position, Body, EquatorialCoordinates};
use crate::frames::{convert_frame, to_ecef};
use crate::geodetic::{ecef_to_geodetic, GeodeticPosition};
use crate::horizon::{horizontal, rise_set, sub_point, HorizontalCoordinates, Observer, RiseSet, SubPoint};
use crate::kepler::{propagate, state_to_elements, KeplerianElements};
use crate::sidereal::sidereal_time;
use crate::time::JulianDate;
use crate::{Frame, OrbitalError, Result, StateVector, EARTH_MU_KM3_S2};

/// One point of a ground track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTrackSample {
    pub epoch: DateTime<Utc>,
    /// [-180, 180)
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub altitude_km: f64,
}

/// Time-ordered sub-satellite points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroundTrack {
    pub samples: Vec<GroundTrackSample>,
}

impl GroundTrack {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Split into runs that do not cross the antimeridian, so each run can be
    /// drawn as one polyline on a map.
    pub fn segments(&self) -> Vec<&[GroundTrackSample]> {
        let mut segments = Vec::new();
        let mut start = 0;
        for (i, pair) in self.samples.windows(2).enumerate() {
            if (pair[1].longitude_deg - pair[0].longitude_deg).abs() > 180.0 {
                segments.push(&self.samples[start..=i]);
                start = i + 1;
            }
        }
        if start < self.samples.len() {
            segments.push(&self.samples[start..]);
        }
        segments
    }
}

fn offset(epoch: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    epoch + Duration::milliseconds((seconds * 1000.0).round() as i64)
}

fn sample_at(elements: &KeplerianElements, epoch: DateTime<Utc>) -> Result<GroundTrackSample> {
    let ecef = to_ecef(&propagate(elements, epoch)?)?;
    let geo = ecef_to_geodetic(&ecef.position());
    Ok(GroundTrackSample {
        epoch,
        longitude_deg: geo.longitude_deg,
        latitude_deg: geo.latitude_deg,
        altitude_km: geo.altitude_km,
    })
}

fn inertial_elements(state: &StateVector) -> Result<KeplerianElements> {
    state_to_elements(&convert_frame(state, Frame::J2000)?, EARTH_MU_KM3_S2)
}

/// `sample_count` ground-track points evenly spaced over one orbital period
/// starting at `epoch`.
pub fn compute_ground_track(state: &StateVector, epoch: DateTime<Utc>, sample_count: usize) -> Result<GroundTrack> {
    if sample_count == 0 {
        return Err(OrbitalError::InvalidSampleCount);
    }
    let elements = inertial_elements(state)?;
    let period = elements.period_seconds();
    debug!(sample_count, period_s = period, "computing ground track");

    let samples = (0..sample_count)
        .map(|k| sample_at(&elements, offset(epoch, period * k as f64 / sample_count as f64)))
        .collect::<Result<Vec<_>>>()?;
    Ok(GroundTrack { samples })
}

/// Ground track over `[start, end]`, both ends included when
/// `sample_count > 1`.
pub fn compute_ground_track_window(
    state: &StateVector,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    sample_count: usize,
) -> Result<GroundTrack> {
    if sample_count == 0 {
        return Err(OrbitalError::InvalidSampleCount);
    }
    let elements = inertial_elements(state)?;
    let span = (end - start).num_milliseconds() as f64 / 1000.0;
    let step = if sample_count > 1 {
        span / (sample_count - 1) as f64
    } else {
        0.0
    };
    debug!(sample_count, span_s = span, "computing ground track window");

    let samples = (0..sample_count)
        .map(|k| sample_at(&elements, offset(start, step * k as f64)))
        .collect::<Result<Vec<_>>>()?;
    Ok(GroundTrack { samples })
}

/// Two-body propagation of `state` to `target`, returned in the frame of
/// the input.
pub fn propagate_state(state: &StateVector, target: DateTime<Utc>) -> Result<StateVector> {
    let propagated = propagate(&inertial_elements(state)?, target)?;
    convert_frame(&propagated, state.frame())
}

pub fn compute_body_position(body: Body, epoch: DateTime<Utc>) -> EquatorialCoordinates {
    equatorial_position(body, JulianDate::from_datetime(&epoch).time)
}

pub fn compute_sub_point(body: Body, epoch: DateTime<Utc>) -> SubPoint {
    let jd = JulianDate::from_datetime(&epoch);
    sub_point(&equatorial_position(body, jd.time), &jd)
}

pub fn compute_horizontal(body: Body, epoch: DateTime<Utc>, observer: &Observer) -> HorizontalCoordinates {
    let jd = JulianDate::from_datetime(&epoch);
    horizontal(&equatorial_position(body, jd.time), &jd, observer)
}

pub fn compute_altitude(body: Body, epoch: DateTime<Utc>, observer: &Observer) -> f64 {
    compute_horizontal(body, epoch, observer).altitude_deg
}

pub fn compute_rise_set(body: Body, epoch: DateTime<Utc>, step_days: f64, observer: &Observer) -> Result<RiseSet> {
    rise_set(body, epoch, step_days, observer)
}

/// The tracked object at one epoch: osculating elements, inertial and
/// Earth-fixed states, and the point beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    pub elements: KeplerianElements,
    pub j2000: StateVector,
    pub ecef: StateVector,
    pub geodetic: GeodeticPosition,
}

impl TrackedObject {
    /// Propagate `state` to `epoch` and derive everything the display needs.
    pub fn at(state: &StateVector, epoch: DateTime<Utc>) -> Result<Self> {
        let j2000 = propagate_state(&convert_frame(state, Frame::J2000)?, epoch)?;
        let elements = state_to_elements(&j2000, EARTH_MU_KM3_S2)?;
        let ecef = to_ecef(&j2000)?;
        let geodetic = ecef_to_geodetic(&ecef.position());

        Ok(Self {
            elements,
            j2000,
            ecef,
            geodetic,
        })
    }
}

/// Sun or Moon as seen at one epoch by one observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub body: Body,
    pub equatorial: EquatorialCoordinates,
    pub horizontal: HorizontalCoordinates,
    pub sub_point: SubPoint,
    pub rise_set: RiseSet,
}

impl BodySnapshot {
    pub fn compute(body: Body, epoch: DateTime<Utc>, step_days: f64, observer: &Observer) -> Result<Self> {
        let jd = JulianDate::from_datetime(&epoch);
        let equatorial = equatorial_position(body, jd.time);

        Ok(Self {
            body,
            equatorial,
            horizontal: horizontal(&equatorial, &jd, observer),
            sub_point: sub_point(&equatorial, &jd),
            rise_set: rise_set(body, epoch, step_days, observer)?,
        })
    }
}

/// Everything a display needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkySnapshot {
    pub epoch: DateTime<Utc>,
    pub julian_date: JulianDate,
    /// Greenwich apparent sidereal time (degrees)
    pub gast_deg: f64,
    /// Local apparent sidereal time at the observer (degrees)
    pub local_sidereal_deg: f64,
    pub observer: Observer,
    pub sun: BodySnapshot,
    pub moon: BodySnapshot,
    pub tracked: Option<TrackedObject>,
}

impl SkySnapshot {
    pub fn compute(
        epoch: DateTime<Utc>,
        observer: &Observer,
        state: Option<&StateVector>,
        step_days: f64,
    ) -> Result<Self> {
        let julian_date = JulianDate::from_datetime(&epoch);
        let tracked = state.map(|s| TrackedObject::at(s, epoch)).transpose()?;

        Ok(Self {
            epoch,
            julian_date,
            gast_deg: sidereal_time(0.0, &julian_date),
            local_sidereal_deg: sidereal_time(observer.longitude_deg, &julian_date),
            observer: *observer,
            sun: BodySnapshot::compute(Body::Sun, epoch, step_days, observer)?,
            moon: BodySnapshot::compute(Body::Moon, epoch, step_days, observer)?,
            tracked,
        })
    }
}
