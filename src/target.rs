//! Target star description

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Reference spectral-type categories used by the RV scaling tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpectralType {
    F5,
    G2,
    K5,
    M2,
}

impl SpectralType {
    /// Default category substituted when resolution fails
    pub const DEFAULT: SpectralType = SpectralType::G2;

    pub const ALL: [SpectralType; 4] = [
        SpectralType::F5,
        SpectralType::G2,
        SpectralType::K5,
        SpectralType::M2,
    ];

    /// Map a free-form spectral type string onto the nearest reference
    /// category.
    ///
    /// Anything that cannot be classified falls back to [`Self::DEFAULT`];
    /// the boolean in the result is true when that fallback was applied, so
    /// callers can surface the substitution instead of hiding it.
    pub fn resolve(raw: &str) -> (SpectralType, bool) {
        let trimmed = raw.trim();
        let class = trimmed.chars().next().map(|c| c.to_ascii_uppercase());
        match class {
            Some('F') => (SpectralType::F5, false),
            Some('G') => (SpectralType::G2, false),
            Some('K') => (SpectralType::K5, false),
            Some('M') => (SpectralType::M2, false),
            _ => {
                log::warn!("unresolved spectral type {trimmed:?}, defaulting to G2");
                (SpectralType::DEFAULT, true)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpectralType::F5 => "F5",
            SpectralType::G2 => "G2",
            SpectralType::K5 => "K5",
            SpectralType::M2 => "M2",
        }
    }
}

impl std::fmt::Display for SpectralType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An already-resolved target star
///
/// Constructed by upstream catalog/config collaborators; immutable once
/// built. Coordinates are ICRS degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    /// Right ascension in degrees, [0, 360)
    pub ra_deg: f64,
    /// Declination in degrees, [-90, 90]
    pub dec_deg: f64,
    /// Proper motion (RA*cos(dec), Dec) in mas/yr, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proper_motion_mas_yr: Option<(f64, f64)>,
    /// Johnson V magnitude, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vmag: Option<f64>,
    pub spectral_type: SpectralType,
    /// True when the spectral type came from the G2 default rather than a
    /// catalog resolution
    #[serde(default)]
    pub spectral_type_defaulted: bool,
}

impl Target {
    pub fn new(
        name: impl Into<String>,
        ra_deg: f64,
        dec_deg: f64,
        vmag: Option<f64>,
        spectral_type: SpectralType,
    ) -> PlanResult<Self> {
        if !(0.0..360.0).contains(&ra_deg) || !(-90.0..=90.0).contains(&dec_deg) {
            return Err(PlanError::CoordinateOutOfRange {
                ra: ra_deg,
                dec: dec_deg,
            });
        }
        Ok(Target {
            name: name.into(),
            ra_deg,
            dec_deg,
            proper_motion_mas_yr: None,
            vmag,
            spectral_type,
            spectral_type_defaulted: false,
        })
    }

    /// Build a target from a raw spectral-type string, recording whether the
    /// G2 default had to be substituted.
    pub fn with_raw_spectral_type(
        name: impl Into<String>,
        ra_deg: f64,
        dec_deg: f64,
        vmag: Option<f64>,
        raw_spectral_type: &str,
    ) -> PlanResult<Self> {
        let (spectral_type, defaulted) = SpectralType::resolve(raw_spectral_type);
        let mut target = Target::new(name, ra_deg, dec_deg, vmag, spectral_type)?;
        target.spectral_type_defaulted = defaulted;
        Ok(target)
    }
}
