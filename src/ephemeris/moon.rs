//! Low-precision lunar position and illumination

use chrono::{DateTime, Utc};

use super::{ecliptic_to_equatorial, EquatorialPosition};
use crate::ephemeris::sun;
use crate::utils::time_utils::days_since_j2000;

/// Geocentric ecliptic longitude and latitude of the moon in degrees
///
/// Truncated mean-element series: mean longitude plus the principal
/// elliptic term in longitude and the principal term in latitude.
pub fn ecliptic_position_deg(dt: &DateTime<Utc>) -> (f64, f64) {
    let n = days_since_j2000(dt);

    let l = (218.316 + 13.176_396 * n).rem_euclid(360.0); // mean longitude
    let m = (134.963 + 13.064_993 * n).rem_euclid(360.0).to_radians(); // mean anomaly
    let f = (93.272 + 13.229_350 * n).rem_euclid(360.0).to_radians(); // argument of latitude

    let lon = (l + 6.289 * m.sin()).rem_euclid(360.0);
    let lat = 5.128 * f.sin();
    (lon, lat)
}

/// Geocentric equatorial position of the moon
pub fn position(dt: &DateTime<Utc>) -> EquatorialPosition {
    let n = days_since_j2000(dt);
    let (lon, lat) = ecliptic_position_deg(dt);
    ecliptic_to_equatorial(lon, lat, n)
}

/// Moon illumination fraction at a given time
///
/// Computed from the sun-moon elongation as `(1 - cos(elongation)) / 2`:
/// 0.0 at new moon, 1.0 at full moon.
pub fn illumination_fraction(dt: &DateTime<Utc>) -> f64 {
    let sun_pos = sun::position(dt);
    let moon_pos = position(dt);

    let elongation = crate::utils::vector_math::angular_separation_deg(
        sun_pos.ra_deg,
        sun_pos.dec_deg,
        moon_pos.ra_deg,
        moon_pos.dec_deg,
    )
    .to_radians();

    (1.0 - elongation.cos()) / 2.0
}
