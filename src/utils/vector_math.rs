//! Vector math utilities for geometry calculations
//!
//! Helper functions for unit-vector conversions and angular separations used
//! throughout the observability engine. Angles are degrees at the boundary,
//! radians internally.

/// Convert RA/Dec coordinates to a unit vector
///
/// # Arguments
/// * `ra_deg` - Right ascension in degrees
/// * `dec_deg` - Declination in degrees
///
/// # Returns
/// Unit vector [x, y, z] in the ICRS/J2000 frame
pub fn radec_to_unit_vector(ra_deg: f64, dec_deg: f64) -> [f64; 3] {
    let ra_rad = ra_deg.to_radians();
    let dec_rad = dec_deg.to_radians();
    let cos_dec = dec_rad.cos();
    [
        cos_dec * ra_rad.cos(),
        cos_dec * ra_rad.sin(),
        dec_rad.sin(),
    ]
}

/// Calculate the dot product of two 3D vectors
#[inline]
pub fn dot_product(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Angular separation between two RA/Dec directions in degrees
pub fn angular_separation_deg(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let a = radec_to_unit_vector(ra1_deg, dec1_deg);
    let b = radec_to_unit_vector(ra2_deg, dec2_deg);
    dot_product(&a, &b).clamp(-1.0, 1.0).acos().to_degrees()
}
