//! Detection significance: RV semi-amplitude and K/sigma_RV curves

use serde::{Deserialize, Serialize};

use crate::config::Instrument;
use crate::error::{PlanError, PlanResult};
use crate::precision::{
    espresso_reference, PrecisionPolicy, ResolvedRv, RvReferenceTable, Validity,
};
use crate::target::SpectralType;

/// Newtonian gravitational constant, m^3 kg^-1 s^-2
const G_SI: f64 = 6.674_30e-11;
/// Jupiter mass in kg
const M_JUP_KG: f64 = 1.898_13e27;
/// Solar mass in kg
const M_SUN_KG: f64 = 1.988_92e30;
const DAY_S: f64 = 86_400.0;

/// Isotropic expectation of sin(i) for an unknown inclination
pub const MEAN_SIN_INCLINATION: f64 = std::f64::consts::FRAC_PI_4;
/// Population-median orbital eccentricity used by the realistic case
pub const DEFAULT_MEDIAN_ECCENTRICITY: f64 = 0.2;

/// RV semi-amplitude K in m/s
///
/// `K = (2 pi G / P)^(1/3) * Mp sin(i) / (Mstar^(2/3) sqrt(1 - e^2))`
pub fn rv_semi_amplitude(
    planet_mass_mjup: f64,
    orbital_period_days: f64,
    stellar_mass_msun: f64,
    eccentricity: f64,
    inclination_deg: f64,
) -> PlanResult<f64> {
    if planet_mass_mjup <= 0.0 {
        return Err(PlanError::NonPositiveMass(planet_mass_mjup));
    }
    if stellar_mass_msun <= 0.0 {
        return Err(PlanError::NonPositiveMass(stellar_mass_msun));
    }
    if orbital_period_days <= 0.0 {
        return Err(PlanError::NonPositivePeriod(orbital_period_days));
    }
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(PlanError::InvalidEccentricity(eccentricity));
    }

    let sin_i = inclination_deg.to_radians().sin();
    Ok(semi_amplitude_from_sin_i(
        planet_mass_mjup,
        orbital_period_days,
        stellar_mass_msun,
        eccentricity,
        sin_i,
    ))
}

fn semi_amplitude_from_sin_i(
    planet_mass_mjup: f64,
    orbital_period_days: f64,
    stellar_mass_msun: f64,
    eccentricity: f64,
    sin_i: f64,
) -> f64 {
    let mp = planet_mass_mjup * M_JUP_KG;
    let mstar = stellar_mass_msun * M_SUN_KG;
    let period_s = orbital_period_days * DAY_S;

    let factor = (2.0 * std::f64::consts::PI * G_SI / period_s).cbrt();
    factor * mp * sin_i / mstar.powf(2.0 / 3.0) / (1.0 - eccentricity * eccentricity).sqrt()
}

/// Semi-amplitudes for the optimistic and realistic orbital assumptions
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AmplitudeCases {
    /// Edge-on circular orbit: i = 90 degrees, e = 0
    pub optimistic_mps: f64,
    /// Isotropic inclination expectation and population-median eccentricity
    pub realistic_mps: f64,
}

/// K for both cases
///
/// `median_eccentricity` defaults to [`DEFAULT_MEDIAN_ECCENTRICITY`] when
/// `None`.
pub fn semi_amplitude_cases(
    planet_mass_mjup: f64,
    orbital_period_days: f64,
    stellar_mass_msun: f64,
    median_eccentricity: Option<f64>,
) -> PlanResult<AmplitudeCases> {
    let e_median = median_eccentricity.unwrap_or(DEFAULT_MEDIAN_ECCENTRICITY);

    let optimistic = rv_semi_amplitude(
        planet_mass_mjup,
        orbital_period_days,
        stellar_mass_msun,
        0.0,
        90.0,
    )?;

    if !(0.0..1.0).contains(&e_median) {
        return Err(PlanError::InvalidEccentricity(e_median));
    }
    let realistic = semi_amplitude_from_sin_i(
        planet_mass_mjup,
        orbital_period_days,
        stellar_mass_msun,
        e_median,
        MEAN_SIN_INCLINATION,
    );

    Ok(AmplitudeCases {
        optimistic_mps: optimistic,
        realistic_mps: realistic,
    })
}

/// One point of a detection-significance curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectionPoint {
    pub exposure_s: f64,
    /// K / sigma_RV at this exposure
    pub significance: f64,
    /// Validity tier of the underlying SNR; invalid points are reported,
    /// never filtered
    pub validity: Validity,
}

/// Detection-significance curve over an exposure-time grid
///
/// Construction validates the instrument and the grid once; `points()` is a
/// lazy, restartable iterator emitting exactly one point per input exposure
/// in order.
#[derive(Debug, Clone)]
pub struct DetectionCurve {
    k_mps: f64,
    vmag: f64,
    model: ResolvedRv,
    exposure_times_s: Vec<f64>,
}

impl DetectionCurve {
    pub fn points(&self) -> impl Iterator<Item = DetectionPoint> + '_ {
        self.exposure_times_s.iter().map(move |&exposure_s| {
            let est = self.model.eval(self.vmag, exposure_s);
            DetectionPoint {
                exposure_s,
                significance: self.k_mps / est.sigma_rv_mps,
                validity: est.validity,
            }
        })
    }

    pub fn exposure_times_s(&self) -> &[f64] {
        &self.exposure_times_s
    }
}

/// Build a detection curve with the built-in reference table
pub fn detection_curve(
    k_mps: f64,
    instrument: &Instrument,
    spectral_type: SpectralType,
    vmag: f64,
    exposure_times_s: &[f64],
) -> PlanResult<DetectionCurve> {
    detection_curve_with(
        k_mps,
        instrument,
        espresso_reference(),
        PrecisionPolicy::default(),
        spectral_type,
        false,
        vmag,
        exposure_times_s,
    )
}

/// Build a detection curve against a supplied reference table and policy
#[allow(clippy::too_many_arguments)]
pub fn detection_curve_with(
    k_mps: f64,
    instrument: &Instrument,
    reference: &RvReferenceTable,
    policy: PrecisionPolicy,
    spectral_type: SpectralType,
    spectral_type_defaulted: bool,
    vmag: f64,
    exposure_times_s: &[f64],
) -> PlanResult<DetectionCurve> {
    if let Some(&bad) = exposure_times_s.iter().find(|t| **t <= 0.0) {
        return Err(PlanError::NonPositiveExposure(bad));
    }
    let model = ResolvedRv::resolve(
        instrument,
        reference,
        policy,
        spectral_type,
        spectral_type_defaulted,
    )?;

    Ok(DetectionCurve {
        k_mps,
        vmag,
        model,
        exposure_times_s: exposure_times_s.to_vec(),
    })
}
