//! Tracker configuration
//!
//! Layered as defaults, then an optional JSON file, then `SKYTRACK_*`
//! environment variables, then command-line flags (applied in `main`).

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use skytrack_core::horizon::MIN_SCAN_STEP_DAYS;
use skytrack_core::{EpochOffset, Observer, StateVector};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Observer location used when nothing else is configured (Espoo, Finland)
pub const DEFAULT_OBSERVER: Observer = Observer {
    longitude_deg: 24.66,
    latitude_deg: 60.21,
};
pub const DEFAULT_STEP_DAYS: f64 = 1e-4;
pub const DEFAULT_SAMPLES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub observer: Observer,
    /// Fixed query epoch; wall-clock time when absent
    pub epoch: Option<DateTime<Utc>>,
    /// Added to the query epoch
    pub offset: EpochOffset,
    /// Rise/set scan step (days)
    pub rise_set_step_days: f64,
    pub ground_track_samples: usize,
    /// Tracked object state; a built-in ISS state when absent
    pub state: Option<StateVector>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            observer: DEFAULT_OBSERVER,
            epoch: None,
            offset: EpochOffset::default(),
            rise_set_step_days: DEFAULT_STEP_DAYS,
            ground_track_samples: DEFAULT_SAMPLES,
            state: None,
        }
    }
}

impl TrackerConfig {
    /// Defaults, overlaid by `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing {:?}", path))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply `SKYTRACK_LON`, `SKYTRACK_LAT`, `SKYTRACK_STEP` and `SKYTRACK_SAMPLES`.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str| lookup(key).and_then(|s| s.trim().parse::<f64>().ok());

        if let Some(lon) = parse("SKYTRACK_LON") {
            self.observer.longitude_deg = lon;
        }
        if let Some(lat) = parse("SKYTRACK_LAT") {
            self.observer.latitude_deg = lat;
        }
        if let Some(step) = parse("SKYTRACK_STEP") {
            self.rise_set_step_days = step;
        }
        if let Some(samples) = lookup("SKYTRACK_SAMPLES").and_then(|s| s.trim().parse().ok()) {
            self.ground_track_samples = samples;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        let Observer {
            longitude_deg,
            latitude_deg,
        } = self.observer;
        ensure!(
            longitude_deg.is_finite() && (-180.0..=360.0).contains(&longitude_deg),
            "observer longitude {} out of range",
            longitude_deg
        );
        ensure!(
            (-90.0..=90.0).contains(&latitude_deg),
            "observer latitude {} out of range",
            latitude_deg
        );
        ensure!(
            self.rise_set_step_days.is_finite()
                && (MIN_SCAN_STEP_DAYS..=0.1).contains(&self.rise_set_step_days),
            "rise/set step must be in [{}, 0.1] days, got {}",
            MIN_SCAN_STEP_DAYS,
            self.rise_set_step_days
        );
        let EpochOffset {
            days,
            hours,
            minutes,
            seconds,
        } = self.offset;
        ensure!(
            [days, hours, minutes, seconds].iter().all(|v| v.is_finite()),
            "epoch offset fields must be finite, got {:?}",
            self.offset
        );
        if let Some(epoch) = self.epoch {
            ensure!(
                self.offset.apply(epoch).is_some(),
                "epoch offset {:?} moves {} out of the supported date range",
                self.offset,
                epoch
            );
        }
        ensure!(self.ground_track_samples > 0, "ground track needs at least one sample");
        Ok(())
    }

    /// Query instant: the configured epoch (or `now`) shifted by the offset.
    pub fn query_epoch(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let base = self.epoch.unwrap_or(now);
        self.offset
            .apply(base)
            .with_context(|| format!("epoch offset {:?} moves {} out of range", self.offset, base))
    }

    pub fn tracked_state(&self) -> Result<StateVector> {
        match self.state {
            Some(state) => Ok(state),
            None => default_iss_state(),
        }
    }
}

/// Sample ISS state vector (J2000, km and km/s).
pub fn default_iss_state() -> Result<StateVector> {
    let epoch = Utc
        .with_ymd_and_hms(2021, 11, 22, 0, 43, 0)
        .single()
        .context("invalid built-in epoch")?;
    Ok(StateVector::j2000(
        [-2_478.064, 5_765.348, 2_693.120],
        [-4.944_203, -4.075_330, 4.163_486],
        epoch,
    )?)
}
