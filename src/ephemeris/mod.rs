//! Geocentric sun and moon ephemerides
//!
//! Closed-form mean-element series, accurate to a few hundredths of a degree
//! for the sun and a few tenths for the moon. That is well inside what
//! twilight, airmass, and moon-separation constraints need at sub-minute
//! sampling, and it keeps every evaluation a pure function of the timestamp.

pub mod moon;
pub mod sun;

/// Geocentric equatorial position of a body at one instant
#[derive(Debug, Clone, Copy)]
pub struct EquatorialPosition {
    /// Right ascension in degrees, [0, 360)
    pub ra_deg: f64,
    /// Declination in degrees
    pub dec_deg: f64,
}

/// Mean obliquity of the ecliptic in degrees for a given day offset from J2000
#[inline]
pub(crate) fn obliquity_deg(days_j2000: f64) -> f64 {
    23.439 - 0.000_000_4 * days_j2000
}

/// Convert ecliptic longitude/latitude (degrees) to equatorial RA/Dec
pub(crate) fn ecliptic_to_equatorial(
    lon_deg: f64,
    lat_deg: f64,
    days_j2000: f64,
) -> EquatorialPosition {
    let eps = obliquity_deg(days_j2000).to_radians();
    let lon = lon_deg.to_radians();
    let lat = lat_deg.to_radians();

    let x = lon.cos() * lat.cos();
    let y = lon.sin() * lat.cos() * eps.cos() - lat.sin() * eps.sin();
    let z = lon.sin() * lat.cos() * eps.sin() + lat.sin() * eps.cos();

    EquatorialPosition {
        ra_deg: y.atan2(x).to_degrees().rem_euclid(360.0),
        dec_deg: z.asin().to_degrees(),
    }
}
