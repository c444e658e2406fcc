//! Observer-relative geometry: horizontal coordinates, sub-points and
//! rise/set search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ephemeris::{equatorial_position, Body, EquatorialCoordinates};
use crate::sidereal::sidereal_time;
use crate::time::{julian_time_to_datetime, JulianDate};
use crate::{normalize_deg, wrap_deg_180, OrbitalError, Result};

/// Geographic position of a ground observer (degrees, east and north positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
}

impl Observer {
    pub fn new(longitude_deg: f64, latitude_deg: f64) -> Self {
        Self {
            longitude_deg,
            latitude_deg,
        }
    }
}

/// Altitude above the horizon and azimuth from north through east, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoordinates {
    pub altitude_deg: f64,
    /// [0, 360)
    pub azimuth_deg: f64,
}

/// Point on the Earth with the body at its zenith.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubPoint {
    /// [-180, 180)
    pub longitude_deg: f64,
    pub latitude_deg: f64,
}

/// Nearest rise and set instants around the query epoch, `None` when no
/// crossing happens within a day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiseSet {
    pub rise: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
}

/// Equatorial → horizontal for `observer` at `jd`.
pub fn horizontal(eq: &EquatorialCoordinates, jd: &JulianDate, observer: &Observer) -> HorizontalCoordinates {
    let hour_angle = (sidereal_time(observer.longitude_deg, jd) - eq.right_ascension_deg).to_radians();
    let dec = eq.declination_deg.to_radians();
    let lat = observer.latitude_deg.to_radians();

    let (sin_h, cos_h) = hour_angle.sin_cos();
    let (sin_d, cos_d) = dec.sin_cos();
    let (sin_l, cos_l) = lat.sin_cos();

    let altitude = (cos_h * cos_d * cos_l + sin_d * sin_l).clamp(-1.0, 1.0).asin();
    // measured westward from south, then turned to north-based
    let azimuth_south = (sin_h * cos_d).atan2(cos_h * cos_d * sin_l - sin_d * cos_l);

    HorizontalCoordinates {
        altitude_deg: altitude.to_degrees(),
        azimuth_deg: normalize_deg(azimuth_south.to_degrees() + 180.0),
    }
}

pub fn altitude(eq: &EquatorialCoordinates, jd: &JulianDate, observer: &Observer) -> f64 {
    horizontal(eq, jd, observer).altitude_deg
}

/// Horizontal → equatorial (unit distance).
pub fn equatorial_from_horizontal(
    hz: &HorizontalCoordinates,
    jd: &JulianDate,
    observer: &Observer,
) -> EquatorialCoordinates {
    let azimuth_south = (hz.azimuth_deg - 180.0).to_radians();
    let alt = hz.altitude_deg.to_radians();
    let lat = observer.latitude_deg.to_radians();

    let (sin_a, cos_a) = azimuth_south.sin_cos();
    let (sin_h, cos_h) = alt.sin_cos();
    let (sin_l, cos_l) = lat.sin_cos();

    let dec = (sin_l * sin_h - cos_l * cos_h * cos_a).clamp(-1.0, 1.0).asin();
    let hour_angle = (sin_a * cos_h).atan2(cos_a * cos_h * sin_l + sin_h * cos_l);

    EquatorialCoordinates {
        right_ascension_deg: normalize_deg(sidereal_time(observer.longitude_deg, jd) - hour_angle.to_degrees()),
        declination_deg: dec.to_degrees(),
        distance: 1.0,
    }
}

/// Sub-point of a body: longitude is RA minus GAST, latitude the declination.
///
/// Declinations above 90° are folded by subtracting 360°. A declination from
/// [`EquatorialCoordinates::from_cartesian`] never exceeds 90°, so the fold
/// only matters for hand-built coordinates.
pub fn sub_point(eq: &EquatorialCoordinates, jd: &JulianDate) -> SubPoint {
    let gast = sidereal_time(0.0, jd);
    let latitude_deg = if eq.declination_deg > 90.0 {
        eq.declination_deg - 360.0
    } else {
        eq.declination_deg
    };

    SubPoint {
        longitude_deg: wrap_deg_180(eq.right_ascension_deg - gast),
        latitude_deg,
    }
}

/// Smallest accepted rise/set scan step (days), about 0.86 s. Bounds a scan
/// to 100 000 altitude evaluations each way.
pub const MIN_SCAN_STEP_DAYS: f64 = 1e-5;

#[derive(Debug, Clone, Copy)]
enum Scan {
    Forward,
    Backward,
}

/// First offset (days) in `direction` at which `crossed(altitude)` holds,
/// stepping `step_days` up to one day.
fn scan<F>(direction: Scan, step_days: f64, altitude_at: &F, crossed: impl Fn(f64) -> bool) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    let sign = match direction {
        Scan::Forward => 1.0,
        Scan::Backward => -1.0,
    };
    let steps = (1.0 / step_days).ceil() as u64;
    (0..steps)
        .map(|k| sign * k as f64 * step_days)
        .find(|&offset| crossed(altitude_at(offset)))
}

/// Rise and set of `body` around `epoch` for `observer`.
///
/// Linear scan in steps of `step_days` up to one day each way. The
/// threshold altitude is minus the body's angular radius. If the body is
/// at or above it now, the backward scan finds the rise and the forward scan
/// the set (`rise <= epoch <= set`); otherwise the forward scan finds the
/// next rise and the backward scan the previous set (`set <= epoch <= rise`).
///
/// `step_days` must be finite and at least [`MIN_SCAN_STEP_DAYS`].
pub fn rise_set(body: Body, epoch: DateTime<Utc>, step_days: f64, observer: &Observer) -> Result<RiseSet> {
    if !(step_days.is_finite() && step_days >= MIN_SCAN_STEP_DAYS) {
        return Err(OrbitalError::InvalidStep(step_days));
    }

    let jd = JulianDate::from_datetime(&epoch);
    let threshold = -body.angular_radius_deg();
    let altitude_at = |offset: f64| {
        let at = jd.add_days(offset);
        altitude(&equatorial_position(body, at.time), &at, observer)
    };
    let to_epoch = |offset: f64| julian_time_to_datetime(jd.add_days(offset).time);

    let above = |alt: f64| alt >= threshold;
    let below = |alt: f64| alt < threshold;

    let up_now = above(altitude_at(0.0));
    let (rise, set) = if up_now {
        (
            scan(Scan::Backward, step_days, &altitude_at, below),
            scan(Scan::Forward, step_days, &altitude_at, below),
        )
    } else {
        (
            scan(Scan::Forward, step_days, &altitude_at, above),
            scan(Scan::Backward, step_days, &altitude_at, above),
        )
    };

    debug!(?body, up_now, ?rise, ?set, "rise/set scan");
    Ok(RiseSet {
        rise: rise.and_then(to_epoch),
        set: set.and_then(to_epoch),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn helsinki() -> Observer {
        Observer::new(24.66, 60.21)
    }

    #[test]
    fn test_zenith_when_ra_equals_gast() {
        let jd = JulianDate::from_julian_time(2_459_540.53);
        let eq = EquatorialCoordinates {
            right_ascension_deg: sidereal_time(0.0, &jd),
            declination_deg: 0.0,
            distance: 1.0,
        };
        let alt = altitude(&eq, &jd, &Observer::new(0.0, 0.0));
        assert!((alt - 90.0).abs() < 1e-6, "alt = {}", alt);
    }

    #[test]
    fn test_sun_at_zenith_on_sub_point() {
        let epoch = Utc.with_ymd_and_hms(2021, 11, 22, 0, 43, 0).unwrap();
        let jd = JulianDate::from_datetime(&epoch);
        let sun = equatorial_position(Body::Sun, jd.time);
        let sp = sub_point(&sun, &jd);

        let observer = Observer::new(sp.longitude_deg, sp.latitude_deg);
        let alt = altitude(&sun, &jd, &observer);
        assert!((alt - 90.0).abs() < 1e-6, "alt = {}", alt);
        assert!((-180.0..180.0).contains(&sp.longitude_deg));
        // November: Sun well south of the equator
        assert!(sp.latitude_deg < -19.0 && sp.latitude_deg > -21.5);
    }

    #[test]
    fn test_pole_altitude_equals_latitude() {
        let jd = JulianDate::from_julian_time(2_459_540.1);
        let pole = EquatorialCoordinates {
            right_ascension_deg: 37.0,
            declination_deg: 90.0,
            distance: 1.0,
        };
        let hz = horizontal(&pole, &jd, &helsinki());
        assert!((hz.altitude_deg - 60.21).abs() < 1e-9);
        assert!(hz.azimuth_deg.min(360.0 - hz.azimuth_deg) < 1e-6);
    }

    #[test]
    fn test_azimuth_cardinal_directions() {
        let jd = JulianDate::from_julian_time(2_459_540.1);
        let observer = Observer::new(0.0, 45.0);
        let lst = sidereal_time(0.0, &jd);

        let transit = EquatorialCoordinates {
            right_ascension_deg: lst,
            declination_deg: 10.0,
            distance: 1.0,
        };
        assert!((horizontal(&transit, &jd, &observer).azimuth_deg - 180.0).abs() < 1e-9);

        // hour angle -90° on the equator: rising due east
        let rising = EquatorialCoordinates {
            right_ascension_deg: normalize_deg(lst + 90.0),
            declination_deg: 0.0,
            distance: 1.0,
        };
        let hz = horizontal(&rising, &jd, &observer);
        assert!((hz.azimuth_deg - 90.0).abs() < 1e-9);
        assert!(hz.altitude_deg.abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_round_trip() {
        let jd = JulianDate::from_julian_time(2_459_540.37);
        let eq = EquatorialCoordinates {
            right_ascension_deg: 213.4,
            declination_deg: -12.5,
            distance: 1.0,
        };
        let observer = helsinki();
        let back = equatorial_from_horizontal(&horizontal(&eq, &jd, &observer), &jd, &observer);
        assert!((back.right_ascension_deg - eq.right_ascension_deg).abs() < 1e-9);
        assert!((back.declination_deg - eq.declination_deg).abs() < 1e-9);
    }

    #[test]
    fn test_sub_point_latitude_fold() {
        let jd = JulianDate::from_julian_time(2_459_540.37);
        let eq = EquatorialCoordinates {
            right_ascension_deg: 10.0,
            declination_deg: 350.0,
            distance: 1.0,
        };
        assert_eq!(sub_point(&eq, &jd).latitude_deg, -10.0);
    }

    #[test]
    fn test_sun_rise_before_set_during_day() {
        // 13:00 local time in Helsinki
        let now = Utc.with_ymd_and_hms(2021, 9, 1, 10, 0, 0).unwrap();
        let rs = rise_set(Body::Sun, now, 1e-3, &helsinki()).unwrap();
        let (rise, set) = (rs.rise.unwrap(), rs.set.unwrap());
        assert!(rise < now && now < set, "rise {} set {}", rise, set);

        let day_hours = (set - rise).num_minutes() as f64 / 60.0;
        assert!(day_hours > 12.0 && day_hours < 16.0, "day length {}h", day_hours);
        // instants sit on the 86.4 s scan grid, to the millisecond
        for instant in [rise, set] {
            let residue = (instant - now).num_milliseconds().rem_euclid(86_400);
            assert!(residue.min(86_400 - residue) <= 1, "{} off grid by {} ms", instant, residue);
        }
        // sunrise about 03:15 UTC
        let expected = Utc.with_ymd_and_hms(2021, 9, 1, 3, 15, 0).unwrap();
        assert!((rise - expected).num_minutes().abs() < 15);
    }

    #[test]
    fn test_sun_set_before_rise_at_night() {
        let now = Utc.with_ymd_and_hms(2021, 9, 1, 22, 0, 0).unwrap();
        let rs = rise_set(Body::Sun, now, 1e-3, &helsinki()).unwrap();
        let (rise, set) = (rs.rise.unwrap(), rs.set.unwrap());
        assert!(set < now && now < rise, "rise {} set {}", rise, set);

        let night_hours = (rise - set).num_minutes() as f64 / 60.0;
        assert!(night_hours > 8.0 && night_hours < 12.0, "night length {}h", night_hours);
    }

    #[test]
    fn test_midnight_sun_has_no_crossing() {
        let now = Utc.with_ymd_and_hms(2021, 6, 21, 12, 0, 0).unwrap();
        let rs = rise_set(Body::Sun, now, 1e-3, &Observer::new(15.0, 80.0)).unwrap();
        assert_eq!(rs, RiseSet::default());
    }

    #[test]
    fn test_invalid_step() {
        let now = Utc.with_ymd_and_hms(2021, 9, 1, 10, 0, 0).unwrap();
        for step in [0.0, -1e-4, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                rise_set(Body::Sun, now, step, &helsinki()),
                Err(OrbitalError::InvalidStep(_))
            ));
        }
    }

    #[test]
    fn test_step_below_minimum_is_rejected() {
        let now = Utc.with_ymd_and_hms(2021, 6, 21, 12, 0, 0).unwrap();
        let polar = Observer::new(15.0, 80.0);
        for step in [1e-6, 1e-300, f64::MIN_POSITIVE, MIN_SCAN_STEP_DAYS / 2.0] {
            assert_eq!(
                rise_set(Body::Sun, now, step, &polar),
                Err(OrbitalError::InvalidStep(step))
            );
        }
        let morning = Utc.with_ymd_and_hms(2021, 9, 1, 10, 0, 0).unwrap();
        assert!(rise_set(Body::Sun, morning, MIN_SCAN_STEP_DAYS, &helsinki()).is_ok());
    }

    #[test]
    fn test_moon_rise_set_ordering() {
        let now = Utc.with_ymd_and_hms(2021, 11, 22, 0, 43, 0).unwrap();
        let jd = JulianDate::from_datetime(&now);
        let observer = helsinki();
        let up = altitude(&equatorial_position(Body::Moon, jd.time), &jd, &observer) >= -0.259;
        let rs = rise_set(Body::Moon, now, 1e-3, &observer).unwrap();
        if let (Some(rise), Some(set)) = (rs.rise, rs.set) {
            if up {
                assert!(rise <= now && now <= set);
            } else {
                assert!(set <= now && now <= rise);
            }
        }
    }
}
