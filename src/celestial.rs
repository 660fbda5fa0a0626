//! Topocentric geometry: altitude/azimuth, airmass, and night bounds
//!
//! Every function here is a closed-form evaluation over its arguments, so the
//! observability calculator can sample it on a dense time grid.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::config::Observatory;
use crate::constraints::TwilightKind;
use crate::ephemeris::{sun, EquatorialPosition};
use crate::utils::time_utils::{add_seconds, lst_deg, seconds_between};

/// Sampling step used when searching for twilight crossings, in seconds
const TWILIGHT_SCAN_STEP_S: f64 = 120.0;

/// Topocentric altitude and azimuth of a fixed RA/Dec direction
///
/// Azimuth is measured from north, increasing eastward. Refraction is not
/// modeled; twilight thresholds and altitude limits absorb it.
pub fn alt_az_deg(
    ra_deg: f64,
    dec_deg: f64,
    latitude_deg: f64,
    longitude_deg: f64,
    dt: &DateTime<Utc>,
) -> (f64, f64) {
    let hour_angle = (lst_deg(dt, longitude_deg) - ra_deg).to_radians();
    let dec = dec_deg.to_radians();
    let lat = latitude_deg.to_radians();

    let up = lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos();
    let north = lat.cos() * dec.sin() - lat.sin() * dec.cos() * hour_angle.cos();
    let east = -dec.cos() * hour_angle.sin();

    let alt = up.clamp(-1.0, 1.0).asin().to_degrees();
    let az = east.atan2(north).to_degrees().rem_euclid(360.0);
    (alt, az)
}

/// Altitude of a body's geocentric position as seen from a site
#[inline]
pub fn body_altitude_deg(pos: &EquatorialPosition, site: &Observatory, dt: &DateTime<Utc>) -> f64 {
    alt_az_deg(
        pos.ra_deg,
        pos.dec_deg,
        site.latitude_deg,
        site.longitude_deg,
        dt,
    )
    .0
}

/// Sun altitude in degrees at a site
pub fn sun_altitude_deg(site: &Observatory, dt: &DateTime<Utc>) -> f64 {
    body_altitude_deg(&sun::position(dt), site, dt)
}

/// Airmass from altitude, secant-of-zenith-angle approximation
///
/// Returns `None` at or below the horizon rather than an infinite or NaN
/// value, so constraint evaluation can treat it as invalid explicitly.
pub fn airmass_from_altitude(altitude_deg: f64) -> Option<f64> {
    if altitude_deg <= 0.0 {
        None
    } else {
        Some(1.0 / altitude_deg.to_radians().sin())
    }
}

/// Minimum altitude in degrees implied by a maximum-airmass limit
///
/// Airmass is at least 1 (zenith), so limits below that have no
/// corresponding altitude and return `None` instead of a NaN.
#[inline]
pub fn altitude_for_airmass(max_airmass: f64) -> Option<f64> {
    (max_airmass >= 1.0).then(|| (1.0 / max_airmass).asin().to_degrees())
}

/// Twilight-bounded night associated with a civil date
///
/// The night is anchored at the site's local noon on `date`: dusk is the
/// first downward crossing of the twilight threshold within the following
/// 24 hours, dawn the next upward crossing after dusk. Crossing times are
/// linearly interpolated between scan samples.
///
/// Returns `None` when the sun never crosses the threshold in that span
/// (polar day, or uninterrupted polar darkness with no twilight-to-twilight
/// interval). That is a geometric degeneracy, not an error.
pub fn night_bounds(
    site: &Observatory,
    date: NaiveDate,
    twilight: TwilightKind,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let threshold = twilight.sun_altitude_deg();

    // Local solar noon in UTC, to the nearest hour of longitude offset
    let noon_utc_hour = 12.0 - site.longitude_deg / 15.0;
    let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    let noon = midnight + chrono::Duration::seconds((noon_utc_hour * 3600.0).round() as i64);

    let dusk = find_sun_crossing(site, &noon, threshold, Direction::Down, 86_400.0)?;
    let dawn = find_sun_crossing(site, &dusk, threshold, Direction::Up, 86_400.0)?;
    Some((dusk, dawn))
}

enum Direction {
    Down,
    Up,
}

/// Scan forward from `from` for the first sun-altitude crossing of
/// `threshold` in the given direction, interpolating within the bracketing
/// step.
fn find_sun_crossing(
    site: &Observatory,
    from: &DateTime<Utc>,
    threshold: f64,
    direction: Direction,
    span_s: f64,
) -> Option<DateTime<Utc>> {
    let mut t_prev = *from;
    let mut alt_prev = sun_altitude_deg(site, &t_prev);
    let steps = (span_s / TWILIGHT_SCAN_STEP_S).ceil() as usize;

    for _ in 0..steps {
        let t_next = add_seconds(&t_prev, TWILIGHT_SCAN_STEP_S);
        let alt_next = sun_altitude_deg(site, &t_next);

        let crossed = match direction {
            Direction::Down => alt_prev > threshold && alt_next <= threshold,
            Direction::Up => alt_prev < threshold && alt_next >= threshold,
        };
        if crossed {
            let frac = (threshold - alt_prev) / (alt_next - alt_prev);
            let dt_s = seconds_between(&t_prev, &t_next);
            return Some(add_seconds(&t_prev, frac * dt_s));
        }

        t_prev = t_next;
        alt_prev = alt_next;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Observatory;

    fn la_palma() -> Observatory {
        Observatory::new("Roque de los Muchachos", 28.7606, -17.8850, 2396.0).unwrap()
    }

    #[test]
    fn zenith_airmass_is_one() {
        assert!((airmass_from_altitude(90.0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn airmass_invalid_below_horizon() {
        assert!(airmass_from_altitude(0.0).is_none());
        assert!(airmass_from_altitude(-5.0).is_none());
    }

    #[test]
    fn airmass_two_at_thirty_degrees() {
        assert!((airmass_from_altitude(30.0).unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn altitude_for_airmass_inverts_airmass() {
        let alt = altitude_for_airmass(2.0).unwrap();
        assert!((airmass_from_altitude(alt).unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn sub_unity_airmass_has_no_altitude() {
        assert!(altitude_for_airmass(0.5).is_none());
        assert!(altitude_for_airmass(-2.0).is_none());
        assert!((altitude_for_airmass(1.0).unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn polaris_altitude_near_site_latitude() {
        let site = la_palma();
        let dt = Utc.with_ymd_and_hms(2024, 6, 15, 23, 0, 0).unwrap();
        let (alt, _) = alt_az_deg(37.95, 89.26, site.latitude_deg, site.longitude_deg, &dt);
        assert!((alt - site.latitude_deg).abs() < 1.5, "alt = {alt}");
    }

    #[test]
    fn night_bounds_exist_at_mid_latitude() {
        let site = la_palma();
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let (dusk, dawn) = night_bounds(&site, date, TwilightKind::Nautical).unwrap();
        assert!(dusk < dawn);
        let hours = seconds_between(&dusk, &dawn) / 3600.0;
        // Short June night at latitude 28.75N
        assert!((4.0..=10.0).contains(&hours), "night = {hours} h");
    }

    #[test]
    fn astronomical_night_shorter_than_sunset_to_sunrise() {
        let site = la_palma();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (d1, w1) = night_bounds(&site, date, TwilightKind::SunsetSunrise).unwrap();
        let (d2, w2) = night_bounds(&site, date, TwilightKind::Astronomical).unwrap();
        assert!(seconds_between(&d2, &w2) < seconds_between(&d1, &w1));
        assert!(d1 < d2 && w2 < w1);
    }

    #[test]
    fn polar_summer_has_no_astronomical_night() {
        let svalbard = Observatory::new("Svalbard", 78.2, 15.6, 0.0).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        assert!(night_bounds(&svalbard, date, TwilightKind::Astronomical).is_none());
    }
}
