//! Time utilities for astronomical calculations

use chrono::{DateTime, Duration, Utc};

/// Days per Julian century
const JULIAN_CENTURY_DAYS: f64 = 36525.0;

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00 UTC)
pub const JD_J2000: f64 = 2_451_545.0;

/// Julian Date of the Unix epoch (1970-01-01 00:00:00 UTC)
const JD_UNIX_EPOCH: f64 = 2_440_587.5;

/// Convert a UTC timestamp to Julian Date
#[inline]
pub fn datetime_to_jd(dt: &DateTime<Utc>) -> f64 {
    let unix_seconds = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) * 1e-9;
    JD_UNIX_EPOCH + unix_seconds / 86_400.0
}

/// Convert a UTC timestamp to Modified Julian Date
#[inline]
pub fn datetime_to_mjd(dt: &DateTime<Utc>) -> f64 {
    datetime_to_jd(dt) - 2_400_000.5
}

/// Convert a Julian Date back to a UTC timestamp (microsecond granularity)
#[inline]
pub fn jd_to_datetime(jd: f64) -> DateTime<Utc> {
    let unix_seconds = (jd - JD_UNIX_EPOCH) * 86_400.0;
    let micros = (unix_seconds * 1e6).round() as i64;
    DateTime::from_timestamp_micros(micros).unwrap_or_default()
}

/// Days elapsed since J2000.0
#[inline]
pub fn days_since_j2000(dt: &DateTime<Utc>) -> f64 {
    datetime_to_jd(dt) - JD_J2000
}

/// Greenwich mean sidereal time in degrees (IAU 1982 series)
pub fn gmst_deg(dt: &DateTime<Utc>) -> f64 {
    let d = days_since_j2000(dt);
    let t = d / JULIAN_CENTURY_DAYS;
    let gmst = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    gmst.rem_euclid(360.0)
}

/// Local mean sidereal time in degrees for an east-positive longitude
#[inline]
pub fn lst_deg(dt: &DateTime<Utc>, longitude_deg: f64) -> f64 {
    (gmst_deg(dt) + longitude_deg).rem_euclid(360.0)
}

/// Add a fractional number of seconds to a timestamp
#[inline]
pub fn add_seconds(dt: &DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    *dt + Duration::microseconds((seconds * 1e6).round() as i64)
}

/// Signed interval `b - a` in seconds
#[inline]
pub fn seconds_between(a: &DateTime<Utc>, b: &DateTime<Utc>) -> f64 {
    (*b - *a)
        .num_microseconds()
        .map_or_else(|| (*b - *a).num_seconds() as f64, |us| us as f64 * 1e-6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn jd_of_j2000_epoch() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((datetime_to_jd(&dt) - JD_J2000).abs() < 1e-9);
    }

    #[test]
    fn jd_round_trip() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 15, 3, 45, 30).unwrap();
        let back = jd_to_datetime(datetime_to_jd(&dt));
        assert!(seconds_between(&dt, &back).abs() < 1e-3);
    }

    #[test]
    fn gmst_at_j2000_epoch() {
        let dt = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((gmst_deg(&dt) - 280.460_618_37).abs() < 0.01);
    }

    #[test]
    fn sidereal_day_runs_ahead_of_solar_day() {
        // Sidereal time gains ~0.9856 degrees per solar day
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let t1 = t0 + Duration::days(1);
        let drift = (gmst_deg(&t1) - gmst_deg(&t0)).rem_euclid(360.0);
        assert!((drift - 0.9856).abs() < 0.01);
    }
}
