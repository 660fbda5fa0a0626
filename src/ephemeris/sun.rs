//! Low-precision solar position

use chrono::{DateTime, Utc};

use super::{ecliptic_to_equatorial, EquatorialPosition};
use crate::utils::time_utils::days_since_j2000;

/// Apparent geocentric ecliptic longitude of the sun in degrees
pub fn ecliptic_longitude_deg(dt: &DateTime<Utc>) -> f64 {
    let n = days_since_j2000(dt);

    // Mean longitude and mean anomaly
    let l = (280.460 + 0.985_647_4 * n).rem_euclid(360.0);
    let g = (357.528 + 0.985_600_3 * n).rem_euclid(360.0).to_radians();

    // Equation of center, first two terms
    (l + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()).rem_euclid(360.0)
}

/// Geocentric equatorial position of the sun
pub fn position(dt: &DateTime<Utc>) -> EquatorialPosition {
    let n = days_since_j2000(dt);
    ecliptic_to_equatorial(ecliptic_longitude_deg(dt), 0.0, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sun_near_equinox_has_small_declination() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 20, 3, 0, 0).unwrap();
        let pos = position(&dt);
        assert!(pos.dec_deg.abs() < 0.5, "dec = {}", pos.dec_deg);
    }

    #[test]
    fn sun_near_june_solstice_at_max_declination() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 20, 21, 0, 0).unwrap();
        let pos = position(&dt);
        assert!((pos.dec_deg - 23.44).abs() < 0.1, "dec = {}", pos.dec_deg);
    }

    #[test]
    fn sun_longitude_wraps_once_per_year() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let diff = (ecliptic_longitude_deg(&t1) - ecliptic_longitude_deg(&t0)).rem_euclid(360.0);
        // One tropical year later the longitude is back to within a degree
        assert!(diff < 1.5 || diff > 358.5, "diff = {diff}");
    }
}
