//! exoplan: when can a star be observed, and how well?
//!
//! Pure, deterministic planning computations for spectroscopic exoplanet
//! follow-up: per-night, monthly, yearly, and transit-constrained
//! observability windows under twilight, airmass, and moon constraints, plus
//! SNR / sigma_RV scaling and K/sigma_RV detection-significance curves.
//!
//! Every operation is a function of its explicit arguments; the crate holds
//! no state and performs no I/O. Target resolution, configuration storage,
//! and rendering are the caller's concern.

// Module declarations
mod celestial;
mod config;
mod constraints;
mod detection;
mod ephemeris;
mod error;
mod observability;
mod precision;
mod target;
mod transit;
mod utils;

// Re-export public API
pub use celestial::{airmass_from_altitude, alt_az_deg, altitude_for_airmass, night_bounds, sun_altitude_deg};
pub use config::{Instrument, Observatory, WeatherStatistics, CALAR_ALTO, INSTRUMENTS, LA_PALMA, LA_SILLA, PARANAL};
pub use constraints::{ConstraintSet, TwilightKind};
pub use detection::{
    detection_curve, detection_curve_with, rv_semi_amplitude, semi_amplitude_cases,
    AmplitudeCases, DetectionCurve, DetectionPoint, DEFAULT_MEDIAN_ECCENTRICITY,
    MEAN_SIN_INCLINATION,
};
pub use ephemeris::{moon, sun, EquatorialPosition};
pub use error::{PlanError, PlanResult};
pub use observability::{
    expected_usable_s, monthly_summary, nightly_report, nightly_windows, yearly_summary,
    NightReport, NightStats, NightTotal, ObservabilityWindow, SAMPLE_STEP_S,
};
pub use precision::{
    espresso_reference, rv_precision, rv_precision_for_target, rv_precision_with,
    NativeRvModel, PrecisionPolicy, ResolvedRv, RvEstimate, RvReferenceRow, RvReferenceTable,
    Validity, SNR_MARGINAL_MIN, SNR_VALID_MIN,
};
pub use target::{SpectralType, Target};
pub use transit::{observable_transits, TransitEphemeris, TransitIter, TransitWindow};
pub use utils::time_utils::{datetime_to_jd, datetime_to_mjd, gmst_deg, jd_to_datetime, lst_deg};
pub use utils::vector_math::{angular_separation_deg, radec_to_unit_vector};
