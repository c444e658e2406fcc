//! Property tests for the sky-tracking core.
//!
//! Case count follows `SKYTRACK_FUZZ_CASES` (default 256).

use chrono::{DateTime, Duration, TimeZone, Utc};
use skytrack_core::frames::{from_ecef, to_ecef, to_true_equator};
use skytrack_core::geodetic::{ecef_to_geodetic, geodetic_to_ecef};
use skytrack_core::kepler::{propagate, state_to_elements};
use skytrack_core::sidereal::sidereal_time;
use skytrack_core::{
    compute_altitude, compute_body_position, compute_rise_set, compute_sub_point, normalize_deg, wrap_deg_180, Body,
    Frame, GeodeticPosition, JulianDate, KeplerianElements, Observer, StateVector, EARTH_MU_KM3_S2,
};
use skytrack_fuzz::prelude::*;

fn elements_from(case: &OrbitCase, epoch: DateTime<Utc>) -> KeplerianElements {
    KeplerianElements {
        semi_major_axis_km: case.semi_major_axis_km,
        eccentricity: case.eccentricity,
        inclination_deg: case.inclination_deg,
        raan_deg: case.raan_deg,
        arg_perigee_deg: case.arg_perigee_deg,
        mean_anomaly_deg: case.mean_anomaly_deg,
        mu_km3_s2: EARTH_MU_KM3_S2,
        epoch,
        frame: Frame::J2000,
    }
}

fn specific_energy(state: &StateVector) -> f64 {
    state.speed().powi(2) / 2.0 - EARTH_MU_KM3_S2 / state.radius()
}

proptest! {
    #![proptest_config(FuzzConfig::from_env().to_proptest_config())]

    // ========================================================================
    // Two-body propagation
    // ========================================================================

    #[test]
    fn fuzz_elements_round_trip(case in orbit_case(), epoch in epoch(), dt in propagation_seconds()) {
        prop_assume!(case.eccentricity > 1e-4);
        let elements = elements_from(&case, epoch);
        let target = epoch + Duration::seconds(dt);

        let at_epoch = propagate(&elements, epoch).unwrap();
        let at_target = propagate(&elements, target).unwrap();

        // Recover elements downstream and come back
        let recovered = state_to_elements(&at_target, EARTH_MU_KM3_S2).unwrap();
        let back = propagate(&recovered, epoch).unwrap();

        let scale = at_epoch.radius();
        prop_assert!((back.position() - at_epoch.position()).norm() / scale < 1e-6);
        prop_assert!((back.velocity() - at_epoch.velocity()).norm() / at_epoch.speed() < 1e-6);
        prop_assert!((recovered.semi_major_axis_km - case.semi_major_axis_km).abs() / case.semi_major_axis_km < 1e-8);
        prop_assert!((recovered.eccentricity - case.eccentricity).abs() < 1e-8);
    }

    #[test]
    fn fuzz_near_circular_round_trip(case in orbit_case_leo(), epoch in epoch(), dt in propagation_seconds()) {
        let elements = elements_from(&case, epoch);
        let at_epoch = propagate(&elements, epoch).unwrap();
        let at_target = propagate(&elements, epoch + Duration::seconds(dt)).unwrap();

        let recovered = state_to_elements(&at_target, EARTH_MU_KM3_S2).unwrap();
        let back = propagate(&recovered, epoch).unwrap();

        prop_assert!((back.position() - at_epoch.position()).norm() / at_epoch.radius() < 1e-6);
        prop_assert!((back.velocity() - at_epoch.velocity()).norm() / at_epoch.speed() < 1e-6);
    }

    #[test]
    fn fuzz_energy_conserved(case in orbit_case_leo(), epoch in epoch(), dt in propagation_seconds()) {
        let elements = elements_from(&case, epoch);
        let start = propagate(&elements, epoch).unwrap();
        let end = propagate(&elements, epoch + Duration::seconds(dt)).unwrap();

        let e0 = specific_energy(&start);
        let e1 = specific_energy(&end);
        prop_assert!((e1 - e0).abs() / e0.abs() < 1e-9, "energy drift {} -> {}", e0, e1);

        let h0 = start.position().cross(&start.velocity());
        let h1 = end.position().cross(&end.velocity());
        prop_assert!((h1 - h0).norm() / h0.norm() < 1e-9);
    }

    // ========================================================================
    // Frames
    // ========================================================================

    #[test]
    fn fuzz_ecef_round_trip(case in orbit_case(), epoch in epoch()) {
        let state = propagate(&elements_from(&case, epoch), epoch).unwrap();
        let ecef = to_ecef(&state).unwrap();
        prop_assert_eq!(ecef.frame(), Frame::Ecef);

        let back = from_ecef(&ecef).unwrap();
        prop_assert!((back.position() - state.position()).norm() < 1e-6);
        prop_assert!((back.velocity() - state.velocity()).norm() < 1e-9);
    }

    #[test]
    fn fuzz_rotations_preserve_radius(case in orbit_case(), epoch in epoch()) {
        let state = propagate(&elements_from(&case, epoch), epoch).unwrap();
        let tod = to_true_equator(&state).unwrap();
        let ecef = to_ecef(&state).unwrap();

        prop_assert!((tod.radius() - state.radius()).abs() < 1e-8);
        prop_assert!((tod.speed() - state.speed()).abs() < 1e-11);
        prop_assert!((ecef.radius() - state.radius()).abs() < 1e-8);
    }

    // ========================================================================
    // Angles and time
    // ========================================================================

    #[test]
    fn fuzz_angle_wrapping(angle in any_angle_deg()) {
        let n = normalize_deg(angle);
        let w = wrap_deg_180(angle);
        prop_assert!((0.0..360.0).contains(&n));
        prop_assert!((-180.0..180.0).contains(&w));
        prop_assert!(wrap_deg_180(n - w).abs() < 1e-9);
    }

    #[test]
    fn fuzz_sidereal_rate(epoch in epoch(), lon in longitude_deg()) {
        let later = epoch + Duration::hours(1);
        let a = sidereal_time(lon, &JulianDate::from_datetime(&epoch));
        let b = sidereal_time(lon, &JulianDate::from_datetime(&later));

        prop_assert!((0.0..360.0).contains(&a));
        // One solar hour is 15.041 degrees of sidereal rotation
        let advance = wrap_deg_180(b - a - 15.041_068_6);
        prop_assert!(advance.abs() < 1e-3, "sidereal advance off by {}", advance);
    }

    // ========================================================================
    // Bodies and observers
    // ========================================================================

    #[test]
    fn fuzz_body_coordinates_in_range(epoch in epoch()) {
        for body in [Body::Sun, Body::Moon] {
            let eq = compute_body_position(body, epoch);
            prop_assert!((0.0..360.0).contains(&eq.right_ascension_deg));
            prop_assert!(eq.declination_deg.abs() <= 30.0);

            let sp = compute_sub_point(body, epoch);
            prop_assert!((-180.0..180.0).contains(&sp.longitude_deg));
            prop_assert!(sp.latitude_deg.abs() <= 90.0);
        }
    }

    #[test]
    fn fuzz_sun_rise_set_brackets_threshold(epoch in epoch(), (lon, lat) in observer()) {
        let observer = Observer::new(lon, lat);
        let times = compute_rise_set(Body::Sun, epoch, 1e-3, &observer).unwrap();
        let threshold = -Body::Sun.angular_radius_deg();

        for instant in [times.rise, times.set].into_iter().flatten() {
            prop_assert!((instant - epoch).num_hours().abs() <= 24);
            let alt = compute_altitude(Body::Sun, instant, &observer);
            prop_assert!((alt - threshold).abs() < 1.0, "altitude {} at crossing", alt);
        }
        if let (Some(rise), Some(set)) = (times.rise, times.set) {
            let up = compute_altitude(Body::Sun, epoch, &observer) >= threshold;
            prop_assert_eq!(up, rise <= epoch && epoch <= set);
        }
    }

    // ========================================================================
    // Geodesy
    // ========================================================================

    #[test]
    fn fuzz_geodetic_round_trip(lat in latitude_mid_deg(), lon in longitude_deg(), alt in altitude_km()) {
        let input = GeodeticPosition {
            latitude_deg: lat,
            longitude_deg: lon,
            altitude_km: alt,
        };
        let output = ecef_to_geodetic(&geodetic_to_ecef(&input));

        prop_assert!((output.latitude_deg - lat).abs() < 1e-7);
        prop_assert!(wrap_deg_180(output.longitude_deg - lon).abs() < 1e-9);
        prop_assert!((output.altitude_km - alt).abs() < 1e-5);
    }
}

/// Sweep 2000..2016 in 23-day steps: an observer standing on the Sun's
/// sub-point sees it at the zenith.
#[test]
fn sweep_sun_at_zenith_over_sub_point() {
    let start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    let mut runner = FuzzRunner::new(FuzzConfig::from_env());

    let result = runner.run("sun_zenith_over_sub_point", |i| {
        let epoch = start + Duration::days(23 * i as i64) + Duration::minutes(37 * i as i64);
        let sp = compute_sub_point(Body::Sun, epoch);
        let alt = compute_altitude(Body::Sun, epoch, &Observer::new(sp.longitude_deg, sp.latitude_deg));
        if alt > 89.999 {
            Ok(())
        } else {
            Err(format!("{}: altitude {:.6}", epoch, alt))
        }
    });

    assert!(result.passed(), "{}", result.summary());
}
