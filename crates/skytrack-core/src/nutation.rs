//! IAU 1980 nutation series
//!
//! Nutation in longitude (Δψ) and obliquity (Δε) from the 106-term IAU 1980
//! theory, and the IAU 1980 mean obliquity of the ecliptic. Amplitudes are
//! tabulated in units of 0.0001 arcsec.
//!
//! Agreement with published values is at the milliarcsecond level, well
//! inside the 1e-4° needed here.

use serde::{Deserialize, Serialize};

use crate::DAYS_PER_JULIAN_CENTURY;

/// 0.0001 arcsec in degrees
const TABLE_UNIT_DEG: f64 = 1e-4 / 3600.0;

/// Secular rates of the fundamental arguments (deg / Julian century), in
/// argument order [l, l', F, D, Ω].
const ARGUMENT_RATES_DEG: [f64; 5] = [
    1325.0 * 360.0 + 198.867_398_1,
    99.0 * 360.0 + 359.050_340_0,
    1342.0 * 360.0 + 82.017_538_1,
    1236.0 * 360.0 + 307.111_480_0,
    -(5.0 * 360.0 + 134.136_260_8),
];

/// Mean obliquity, true obliquity and nutation angles (degrees) at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutationParameters {
    /// Mean obliquity of the ecliptic ε
    pub mean_obliquity_deg: f64,
    /// Nutation in longitude Δψ
    pub delta_psi_deg: f64,
    /// Nutation in obliquity Δε
    pub delta_eps_deg: f64,
}

impl NutationParameters {
    /// ε + Δε
    pub fn true_obliquity_deg(&self) -> f64 {
        self.mean_obliquity_deg + self.delta_eps_deg
    }

    /// Difference between apparent and mean sidereal time, Δψ·cos(ε + Δε)
    pub fn equation_of_equinoxes_deg(&self) -> f64 {
        self.delta_psi_deg * self.true_obliquity_deg().to_radians().cos()
    }
}

/// One row of the series: integer multipliers of [l, l', F, D, Ω] and the
/// longitude (A0 + A1·T) and obliquity (B0 + B1·T) amplitudes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutationTerm {
    pub multipliers: [i8; 5],
    pub a0: f64,
    pub a1: f64,
    pub b0: f64,
    pub b1: f64,
}

impl NutationTerm {
    const fn new(multipliers: [i8; 5], a0: f64, a1: f64, b0: f64, b1: f64) -> Self {
        Self {
            multipliers,
            a0,
            a1,
            b0,
            b1,
        }
    }

    fn argument(&self, fundamental: &[f64; 5]) -> f64 {
        self.multipliers
            .iter()
            .zip(fundamental)
            .map(|(&k, &arg)| k as f64 * arg)
            .sum()
    }

    /// Period of the term in days, from the fundamental-argument rates.
    pub fn period_days(&self) -> f64 {
        let rate: f64 = self
            .multipliers
            .iter()
            .zip(ARGUMENT_RATES_DEG)
            .map(|(&k, r)| k as f64 * r)
            .sum();
        360.0 * DAYS_PER_JULIAN_CENTURY / rate.abs()
    }
}

/// Fundamental arguments [l, l', F, D, Ω] in radians for `t` Julian
/// centuries since J2000.0:
/// - `l`  mean anomaly of the Moon
/// - `l'` mean anomaly of the Sun
/// - `F`  mean argument of latitude of the Moon
/// - `D`  mean elongation of the Moon from the Sun
/// - `Ω`  longitude of the Moon's mean ascending node
pub fn fundamental_arguments(t: f64) -> [f64; 5] {
    let t2 = t * t;
    let t3 = t2 * t;

    let l = 134.962_981_39 + ARGUMENT_RATES_DEG[0] * t + 0.008_697_2 * t2 + 1.78e-5 * t3;
    let lp = 357.527_723_33 + ARGUMENT_RATES_DEG[1] * t - 0.000_160_3 * t2 - 3.3e-6 * t3;
    let f = 93.271_910_28 + ARGUMENT_RATES_DEG[2] * t - 0.003_682_5 * t2 + 3.1e-6 * t3;
    let d = 297.850_363_06 + ARGUMENT_RATES_DEG[3] * t - 0.001_914_2 * t2 + 5.3e-6 * t3;
    let om = 125.044_522_22 + ARGUMENT_RATES_DEG[4] * t + 0.002_070_8 * t2 + 2.2e-6 * t3;

    [l, lp, f, d, om].map(|deg| (deg % 360.0).to_radians())
}

/// IAU 1980 mean obliquity of the ecliptic (degrees).
pub fn mean_obliquity_deg(t: f64) -> f64 {
    (84_381.448 - 46.8150 * t - 0.000_59 * t * t + 0.001_813 * t * t * t) / 3600.0
}

/// Evaluate the nutation series for `t` Julian centuries since J2000.0.
pub fn nutation_terms(t: f64) -> NutationParameters {
    let args = fundamental_arguments(t);

    let (dpsi, deps) = NUTATION_1980.iter().fold((0.0, 0.0), |(dpsi, deps), term| {
        let arg = term.argument(&args);
        (
            dpsi + (term.a0 + term.a1 * t) * arg.sin(),
            deps + (term.b0 + term.b1 * t) * arg.cos(),
        )
    });

    NutationParameters {
        mean_obliquity_deg: mean_obliquity_deg(t),
        delta_psi_deg: dpsi * TABLE_UNIT_DEG,
        delta_eps_deg: deps * TABLE_UNIT_DEG,
    }
}

/// IAU 1980 nutation series, sorted by decreasing longitude amplitude.
///
/// Columns: multipliers of [l, l', F, D, Ω], A0, A1, B0, B1 (0.0001″, T in centuries).
#[rustfmt::skip]
pub static NUTATION_1980: [NutationTerm; 106] = [
    NutationTerm::new([ 0,  0,  0,  0,  1], -171996.0, -174.2, 92025.0,  8.9),
    NutationTerm::new([ 0,  0,  2, -2,  2],  -13187.0,   -1.6,  5736.0, -3.1),
    NutationTerm::new([ 0,  0,  2,  0,  2],   -2274.0,   -0.2,   977.0, -0.5),
    NutationTerm::new([ 0,  0,  0,  0,  2],    2062.0,    0.2,  -895.0,  0.5),
    NutationTerm::new([ 0,  1,  0,  0,  0],    1426.0,   -3.4,    54.0, -0.1),
    NutationTerm::new([ 1,  0,  0,  0,  0],     712.0,    0.1,    -7.0,  0.0),
    NutationTerm::new([ 0,  1,  2, -2,  2],    -517.0,    1.2,   224.0, -0.6),
    NutationTerm::new([ 0,  0,  2,  0,  1],    -386.0,   -0.4,   200.0,  0.0),
    NutationTerm::new([ 1,  0,  2,  0,  2],    -301.0,    0.0,   129.0, -0.1),
    NutationTerm::new([ 0, -1,  2, -2,  2],     217.0,   -0.5,   -95.0,  0.3),
    NutationTerm::new([ 1,  0,  0, -2,  0],    -158.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([ 0,  0,  2, -2,  1],     129.0,    0.1,   -70.0,  0.0),
    NutationTerm::new([-1,  0,  2,  0,  2],     123.0,    0.0,   -53.0,  0.0),
    NutationTerm::new([ 1,  0,  0,  0,  1],      63.0,    0.1,   -33.0,  0.0),
    NutationTerm::new([ 0,  0,  0,  2,  0],      63.0,    0.0,    -2.0,  0.0),
    NutationTerm::new([-1,  0,  2,  2,  2],     -59.0,    0.0,    26.0,  0.0),
    NutationTerm::new([-1,  0,  0,  0,  1],     -58.0,   -0.1,    32.0,  0.0),
    NutationTerm::new([ 1,  0,  2,  0,  1],     -51.0,    0.0,    27.0,  0.0),
    NutationTerm::new([ 2,  0,  0, -2,  0],      48.0,    0.0,     1.0,  0.0),
    NutationTerm::new([-2,  0,  2,  0,  1],      46.0,    0.0,   -24.0,  0.0),
    NutationTerm::new([ 0,  0,  2,  2,  2],     -38.0,    0.0,    16.0,  0.0),
    NutationTerm::new([ 2,  0,  2,  0,  2],     -31.0,    0.0,    13.0,  0.0),
    NutationTerm::new([ 2,  0,  0,  0,  0],      29.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([ 1,  0,  2, -2,  2],      29.0,    0.0,   -12.0,  0.0),
    NutationTerm::new([ 0,  0,  2,  0,  0],      26.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([ 0,  0,  2, -2,  0],     -22.0,    0.0,     0.0,  0.0),
    NutationTerm::new([-1,  0,  2,  0,  1],      21.0,    0.0,   -10.0,  0.0),
    NutationTerm::new([ 0,  2,  0,  0,  0],      17.0,   -0.1,     0.0,  0.0),
    NutationTerm::new([ 0,  2,  2, -2,  2],     -16.0,    0.1,     7.0,  0.0),
    NutationTerm::new([-1,  0,  0,  2,  1],      16.0,    0.0,    -8.0,  0.0),
    NutationTerm::new([ 0,  1,  0,  0,  1],     -15.0,    0.0,     9.0,  0.0),
    NutationTerm::new([ 1,  0,  0, -2,  1],     -13.0,    0.0,     7.0,  0.0),
    NutationTerm::new([ 0, -1,  0,  0,  1],     -12.0,    0.0,     6.0,  0.0),
    NutationTerm::new([ 2,  0, -2,  0,  0],      11.0,    0.0,     0.0,  0.0),
    NutationTerm::new([-1,  0,  2,  2,  1],     -10.0,    0.0,     5.0,  0.0),
    NutationTerm::new([ 1,  0,  2,  2,  2],      -8.0,    0.0,     3.0,  0.0),
    NutationTerm::new([ 0, -1,  2,  0,  2],      -7.0,    0.0,     3.0,  0.0),
    NutationTerm::new([ 0,  0,  2,  2,  1],      -7.0,    0.0,     3.0,  0.0),
    NutationTerm::new([ 1,  1,  0, -2,  0],      -7.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  1,  2,  0,  2],       7.0,    0.0,    -3.0,  0.0),
    NutationTerm::new([-2,  0,  0,  2,  1],      -6.0,    0.0,     3.0,  0.0),
    NutationTerm::new([ 0,  0,  0,  2,  1],      -6.0,    0.0,     3.0,  0.0),
    NutationTerm::new([ 2,  0,  2, -2,  2],       6.0,    0.0,    -3.0,  0.0),
    NutationTerm::new([ 1,  0,  0,  2,  0],       6.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  0,  2, -2,  1],       6.0,    0.0,    -3.0,  0.0),
    NutationTerm::new([ 0,  0,  0, -2,  1],      -5.0,    0.0,     3.0,  0.0),
    NutationTerm::new([ 0, -1,  2, -2,  1],      -5.0,    0.0,     3.0,  0.0),
    NutationTerm::new([ 2,  0,  2,  0,  1],      -5.0,    0.0,     3.0,  0.0),
    NutationTerm::new([ 1, -1,  0,  0,  0],       5.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  0,  0, -1,  0],      -4.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  0,  0,  1,  0],      -4.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  1,  0, -2,  0],      -4.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  0, -2,  0,  0],       4.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 2,  0,  0, -2,  1],       4.0,    0.0,    -2.0,  0.0),
    NutationTerm::new([ 0,  1,  2, -2,  1],       4.0,    0.0,    -2.0,  0.0),
    NutationTerm::new([ 1,  1,  0,  0,  0],      -3.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1, -1,  0, -1,  0],      -3.0,    0.0,     0.0,  0.0),
    NutationTerm::new([-1, -1,  2,  2,  2],      -3.0,    0.0,     1.0,  0.0),
    NutationTerm::new([ 0, -1,  2,  2,  2],      -3.0,    0.0,     1.0,  0.0),
    NutationTerm::new([ 1, -1,  2,  0,  2],      -3.0,    0.0,     1.0,  0.0),
    NutationTerm::new([ 3,  0,  2,  0,  2],      -3.0,    0.0,     1.0,  0.0),
    NutationTerm::new([-2,  0,  2,  0,  2],      -3.0,    0.0,     1.0,  0.0),
    NutationTerm::new([ 1,  0,  2,  0,  0],       3.0,    0.0,     0.0,  0.0),
    NutationTerm::new([-1,  0,  2,  4,  2],      -2.0,    0.0,     1.0,  0.0),
    NutationTerm::new([ 1,  0,  0,  0,  2],      -2.0,    0.0,     1.0,  0.0),
    NutationTerm::new([-1,  0,  2, -2,  1],      -2.0,    0.0,     1.0,  0.0),
    NutationTerm::new([ 0, -2,  2, -2,  1],      -2.0,    0.0,     1.0,  0.0),
    NutationTerm::new([-2,  0,  0,  0,  1],      -2.0,    0.0,     1.0,  0.0),
    NutationTerm::new([ 2,  0,  0,  0,  1],       2.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([ 3,  0,  0,  0,  0],       2.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  1,  2,  0,  2],       2.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([ 0,  0,  2,  1,  2],       2.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([ 1,  0,  0,  2,  1],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  0,  2,  2,  1],      -1.0,    0.0,     1.0,  0.0),
    NutationTerm::new([ 1,  1,  0, -2,  1],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  1,  0,  2,  0],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  1,  2, -2,  0],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  1, -2,  2,  0],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  0, -2,  2,  0],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  0, -2, -2,  0],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  0,  2, -2,  0],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  0,  0, -4,  0],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 2,  0,  0, -4,  0],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  0,  2,  4,  2],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  0,  2, -1,  2],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([-2,  0,  2,  4,  2],      -1.0,    0.0,     1.0,  0.0),
    NutationTerm::new([ 2,  0,  2,  2,  2],      -1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0, -1,  0,  0,  2],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  0, -2,  0,  1],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  0,  4, -2,  2],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  1,  0,  0,  2],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1,  1,  2, -2,  2],       1.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([ 3,  0,  2, -2,  2],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([-2,  0,  2,  2,  2],       1.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([-1,  0,  0,  0,  2],       1.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([ 0,  0, -2,  2,  1],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  1,  2,  0,  1],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([-1,  0,  4,  0,  2],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 2,  1,  0, -2,  0],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 2,  0,  0,  2,  0],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 2,  0,  2, -2,  1],       1.0,    0.0,    -1.0,  0.0),
    NutationTerm::new([ 2,  0, -2,  0,  1],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 1, -1,  0, -2,  0],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([-1,  0,  0,  1,  1],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([-1, -1,  0,  2,  1],       1.0,    0.0,     0.0,  0.0),
    NutationTerm::new([ 0,  1,  0,  1,  0],       1.0,    0.0,     0.0,  0.0),
];
