//! Sky Tracker CLI
//!
//! Computes the tracked object's ground track and the Sun and Moon
//! positions for an observer, printing JSON on stdout. Logs go to stderr.
//!
//! Usage:
//!   skytrack --lon 24.66 --lat 60.21 snapshot
//!   skytrack --epoch 2021-11-22T00:43:00Z track --segments
//!   skytrack rise-set moon
//!   skytrack --state iss.json convert ecef

mod config;

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use config::TrackerConfig;
use serde::Serialize;
use skytrack_core::{
    compute_ground_track, compute_ground_track_window, compute_rise_set, convert_frame, propagate_state, Body,
    Frame, SkySnapshot, StateVector,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skytrack", about = "Track the ISS, Sun and Moon from an observer location")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Observer longitude in degrees (east positive)
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Observer latitude in degrees (north positive)
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Query epoch (RFC 3339); defaults to now
    #[arg(long)]
    epoch: Option<DateTime<Utc>>,

    /// Hours added to the query epoch
    #[arg(long, allow_hyphen_values = true)]
    offset_hours: Option<f64>,

    /// Rise/set scan step in days
    #[arg(long)]
    step: Option<f64>,

    /// Ground track sample count
    #[arg(long)]
    samples: Option<usize>,

    /// State vector JSON file (position, velocity, epoch, frame)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sidereal time, Sun, Moon and tracked object at the query epoch
    Snapshot,
    /// Ground track of the tracked object
    Track {
        /// Sample the window [epoch - minutes, epoch + minutes] instead of one period
        #[arg(long)]
        window_minutes: Option<f64>,
        /// Emit longitude/latitude polylines split at the antimeridian
        #[arg(long)]
        segments: bool,
    },
    /// Next rise and set of a body
    RiseSet {
        #[arg(value_enum)]
        body: BodyArg,
    },
    /// Express the tracked state in another frame
    Convert {
        #[arg(value_enum)]
        to: FrameArg,
    },
    /// Propagate the tracked state to the query epoch
    Propagate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BodyArg {
    Sun,
    Moon,
}

impl From<BodyArg> for Body {
    fn from(arg: BodyArg) -> Self {
        match arg {
            BodyArg::Sun => Body::Sun,
            BodyArg::Moon => Body::Moon,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FrameArg {
    J2000,
    Tod,
    Ecef,
}

impl From<FrameArg> for Frame {
    fn from(arg: FrameArg) -> Self {
        match arg {
            FrameArg::J2000 => Frame::J2000,
            FrameArg::Tod => Frame::TrueEquator,
            FrameArg::Ecef => Frame::Ecef,
        }
    }
}

#[derive(Serialize)]
struct RiseSetReport {
    body: Body,
    epoch: DateTime<Utc>,
    rise: Option<DateTime<Utc>>,
    set: Option<DateTime<Utc>>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "skytrack=debug,skytrack_core=debug"
    } else {
        "skytrack=info,skytrack_core=warn"
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &Args) -> Result<TrackerConfig> {
    let mut config = TrackerConfig::load(args.config.as_deref())?.with_env();

    if let Some(lon) = args.lon {
        config.observer.longitude_deg = lon;
    }
    if let Some(lat) = args.lat {
        config.observer.latitude_deg = lat;
    }
    if let Some(epoch) = args.epoch {
        config.epoch = Some(epoch);
    }
    if let Some(hours) = args.offset_hours {
        config.offset.hours = hours;
    }
    if let Some(step) = args.step {
        config.rise_set_step_days = step;
    }
    if let Some(samples) = args.samples {
        config.ground_track_samples = samples;
    }
    if let Some(path) = &args.state {
        let file = File::open(path).with_context(|| format!("opening state file {:?}", path))?;
        let state: StateVector = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing state file {:?}", path))?;
        config.state = Some(state);
    }

    config.validate()?;
    Ok(config)
}

/// `[epoch - minutes, epoch + minutes]`, failing when the window leaves the
/// supported date range.
fn window_bounds(epoch: DateTime<Utc>, minutes: f64) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let millis = (minutes * 60_000.0).round();
    ensure!(
        millis.is_finite() && millis >= 0.0 && millis < i64::MAX as f64,
        "window must be a non-negative number of minutes, got {}",
        minutes
    );
    let half = Duration::try_milliseconds(millis as i64)
        .with_context(|| format!("window of {} minutes is too large", minutes))?;
    let start = epoch
        .checked_sub_signed(half)
        .with_context(|| format!("window start {} minutes before {} is out of range", minutes, epoch))?;
    let end = epoch
        .checked_add_signed(half)
        .with_context(|| format!("window end {} minutes after {} is out of range", minutes, epoch))?;
    Ok((start, end))
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = resolve_config(&args)?;
    let epoch = config.query_epoch(Utc::now())?;
    let state = config.tracked_state()?;
    let observer = config.observer;

    info!("{}", "=".repeat(60));
    info!("Sky Tracker");
    info!("{}", "=".repeat(60));
    info!(
        "Observer: lon {:.4}°, lat {:.4}° | epoch {}",
        observer.longitude_deg,
        observer.latitude_deg,
        epoch.to_rfc3339()
    );
    debug!(?state, "tracked state");

    match args.command.unwrap_or(Command::Snapshot) {
        Command::Snapshot => {
            let snapshot = SkySnapshot::compute(epoch, &observer, Some(&state), config.rise_set_step_days)?;
            if let Some(tracked) = &snapshot.tracked {
                info!(
                    "Tracked object: lat {:.3}°, lon {:.3}°, alt {:.1} km",
                    tracked.geodetic.latitude_deg, tracked.geodetic.longitude_deg, tracked.geodetic.altitude_km
                );
                info!(
                    "Orbit: perigee {:.1} km, apogee {:.1} km, period {:.1} min",
                    tracked.elements.perigee_radius_km(),
                    tracked.elements.apogee_radius_km(),
                    tracked.elements.period_seconds() / 60.0
                );
            }
            info!(
                "Sun altitude {:.2}°, Moon altitude {:.2}°",
                snapshot.sun.horizontal.altitude_deg, snapshot.moon.horizontal.altitude_deg
            );
            emit(&snapshot, args.pretty)?;
        }
        Command::Track {
            window_minutes,
            segments,
        } => {
            let track = match window_minutes {
                Some(minutes) => {
                    let (start, end) = window_bounds(epoch, minutes)?;
                    compute_ground_track_window(&state, start, end, config.ground_track_samples)?
                }
                None => compute_ground_track(&state, epoch, config.ground_track_samples)?,
            };
            info!("Ground track: {} samples", track.len());

            if segments {
                let polylines: Vec<Vec<[f64; 2]>> = track
                    .segments()
                    .into_iter()
                    .map(|segment| segment.iter().map(|s| [s.longitude_deg, s.latitude_deg]).collect())
                    .collect();
                info!("Split into {} segments", polylines.len());
                emit(&polylines, args.pretty)?;
            } else {
                emit(&track, args.pretty)?;
            }
        }
        Command::RiseSet { body } => {
            let body = Body::from(body);
            let times = compute_rise_set(body, epoch, config.rise_set_step_days, &observer)?;
            if times.rise.is_none() && times.set.is_none() {
                info!("{:?} neither rises nor sets within a day", body);
            }
            emit(
                &RiseSetReport {
                    body,
                    epoch,
                    rise: times.rise,
                    set: times.set,
                },
                args.pretty,
            )?;
        }
        Command::Convert { to } => {
            let converted = convert_frame(&state, to.into())?;
            emit(&converted, args.pretty)?;
        }
        Command::Propagate => {
            let propagated = propagate_state(&state, epoch)?;
            info!(
                "Propagated {:.1} s: |r| = {:.3} km, |v| = {:.4} km/s",
                (epoch - state.epoch()).num_milliseconds() as f64 / 1000.0,
                propagated.radius(),
                propagated.speed()
            );
            emit(&propagated, args.pretty)?;
        }
    }

    Ok(())
}
