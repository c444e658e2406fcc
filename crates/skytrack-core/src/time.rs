//! Julian Day / Julian Time arithmetic
//!
//! Calendar conversions follow the Meeus Gregorian algorithm. A
//! [`JulianDate`] carries both the Julian Day at the 0h UT boundary of the
//! calendar date and the continuous Julian Time of the instant.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{normalize_deg, DAYS_PER_JULIAN_CENTURY, J2000_JD, SECONDS_PER_DAY};

/// Julian Time of the Unix epoch (1970-01-01 00:00 UTC)
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const MILLIS_PER_DAY: f64 = SECONDS_PER_DAY * 1000.0;

/// Julian Day at 0h UT of a Gregorian calendar date.
///
/// January and February must already be expressed as months 13 and 14 of
/// the previous year; [`JulianDate::from_datetime`] does that shift. Fields
/// are not validated.
pub fn julian_day(year: i32, month: u32, day: u32) -> f64 {
    let year = year as f64;
    let a = (year / 100.0).floor();
    let b = (a / 4.0).floor();
    let c = 2.0 - a + b;
    let e = (365.25 * (year + 4716.0)).floor();
    let f = (30.6001 * (month as f64 + 1.0)).floor();
    c + day as f64 + e + f - 1524.5
}

/// Julian centuries elapsed since J2000.0.
pub fn julian_centuries(julian_time: f64) -> f64 {
    (julian_time - J2000_JD) / DAYS_PER_JULIAN_CENTURY
}

/// Julian Day (0h UT boundary) and continuous Julian Time of one instant.
///
/// `time - day` is always in [0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JulianDate {
    pub day: f64,
    pub time: f64,
}

impl JulianDate {
    pub fn from_datetime(epoch: &DateTime<Utc>) -> Self {
        let (mut year, mut month) = (epoch.year(), epoch.month());
        if month < 3 {
            year -= 1;
            month += 12;
        }

        let day = julian_day(year, month, epoch.day());
        let seconds = epoch.hour() as f64 * 3600.0
            + epoch.minute() as f64 * 60.0
            + epoch.second() as f64
            + epoch.nanosecond() as f64 * 1e-9;

        Self {
            day,
            time: day + seconds / SECONDS_PER_DAY,
        }
    }

    /// Rebuild the pair from a continuous Julian Time.
    pub fn from_julian_time(julian_time: f64) -> Self {
        Self {
            day: (julian_time - 0.5).floor() + 0.5,
            time: julian_time,
        }
    }

    /// Julian centuries of the instant since J2000.0
    pub fn centuries(&self) -> f64 {
        julian_centuries(self.time)
    }

    /// Julian centuries of the 0h UT boundary since J2000.0
    pub fn day_centuries(&self) -> f64 {
        julian_centuries(self.day)
    }

    /// Fraction of the UT day elapsed, in [0, 1)
    pub fn day_fraction(&self) -> f64 {
        self.time - self.day
    }

    pub fn add_days(&self, days: f64) -> Self {
        Self::from_julian_time(self.time + days)
    }
}

impl fmt::Display for JulianDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JD {:.6}", self.time)
    }
}

/// Convert a continuous Julian Time back to a UTC instant (millisecond resolution).
pub fn julian_time_to_datetime(julian_time: f64) -> Option<DateTime<Utc>> {
    if !julian_time.is_finite() {
        return None;
    }
    let millis = ((julian_time - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round();
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Decode a telemetry timestamp: UTC hours counted from the start of `year`,
/// with the day-of-year starting at 1 (so 24.0 is Jan 1 00:00).
pub fn datetime_from_day_of_year_hours(year: i32, hours: f64) -> Option<DateTime<Utc>> {
    if !hours.is_finite() {
        return None;
    }
    let year_start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let offset_ms = ((hours - 24.0) * 3_600_000.0).round() as i64;
    year_start.checked_add_signed(Duration::milliseconds(offset_ms))
}

/// Offset applied to a wall-clock or configured epoch to get a simulated instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpochOffset {
    pub days: f64,
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl EpochOffset {
    pub fn total_seconds(&self) -> f64 {
        self.days * SECONDS_PER_DAY + self.hours * 3600.0 + self.minutes * 60.0 + self.seconds
    }

    /// Shift `epoch` by this offset, or `None` when a field is not finite
    /// or the result falls outside the representable range.
    pub fn apply(&self, epoch: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let millis = (self.total_seconds() * 1000.0).round();
        if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
            return None;
        }
        epoch.checked_add_signed(Duration::try_milliseconds(millis as i64)?)
    }
}

/// An angle expressed as hours, minutes and seconds of time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hms {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: f64,
}

impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m {:.1}s", self.hours, self.minutes, self.seconds)
    }
}

/// Express an angle (typically right ascension) in degrees as h/m/s.
pub fn degrees_to_hms(degrees: f64) -> Hms {
    let total_seconds = normalize_deg(degrees) / 15.0 * 3600.0;
    let hours = (total_seconds / 3600.0).floor();
    let minutes = ((total_seconds - hours * 3600.0) / 60.0).floor();
    let seconds = total_seconds - hours * 3600.0 - minutes * 60.0;
    Hms {
        hours: hours as u32,
        minutes: minutes as u32,
        seconds,
    }
}
