//! Error types for the planning computations
//!
//! Every variant is a domain violation detected up front; the numerical
//! pipeline itself never fails. Geometric degeneracies (polar nights, targets
//! that never rise) are expressed as empty results, not errors.

use thiserror::Error;

pub type PlanResult<T> = Result<T, PlanError>;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("exposure time must be positive, got {0} s")]
    NonPositiveExposure(f64),

    #[error("telescope diameter must be positive, got {0} m")]
    NonPositiveDiameter(f64),

    #[error("spectral resolving power must be positive, got {0}")]
    NonPositiveResolution(f64),

    #[error("latitude {0} deg outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} deg outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("coordinates (ra {ra} deg, dec {dec} deg) out of range")]
    CoordinateOutOfRange { ra: f64, dec: f64 },

    #[error("eccentricity {0} outside [0, 1)")]
    InvalidEccentricity(f64),

    #[error("mass must be positive, got {0}")]
    NonPositiveMass(f64),

    #[error("period must be positive, got {0}")]
    NonPositivePeriod(f64),

    #[error("duration must be positive, got {0} s")]
    NonPositiveDuration(f64),

    #[error("transit duration {duration_s} s is not shorter than the period {period_s} s")]
    DurationExceedsPeriod { duration_s: f64, period_s: f64 },

    #[error("no calibration row for the requested spectral type")]
    EmptyReferenceTable,

    #[error("range start {start} is after end {end}")]
    InvalidRange { start: String, end: String },
}
