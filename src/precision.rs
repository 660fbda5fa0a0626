//! Radial-velocity precision model
//!
//! Computes the expected SNR and sigma_RV for an exposure. Instruments with
//! a native model or calibration table use it directly; anything else scales
//! from the reference instrument (ESPRESSO) via
//!
//! ```text
//! SNR      = SNR_ref * (D / D_ref) * sqrt(t / t_ref) * 10^(-0.2 (m - m_ref))
//! sigma_RV = sigma_ref * (SNR_ref / SNR) * (R_ref / R)^1.5
//! ```
//!
//! The scaling law is empirically calibrated and known to degrade at low
//! SNR, so every estimate carries a validity tier; it is never suppressed.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::config::Instrument;
use crate::error::{PlanError, PlanResult};
use crate::target::{SpectralType, Target};

/// SNR at or above which the scaling law is considered reliable
pub const SNR_VALID_MIN: f64 = 50.0;
/// SNR below which the estimate is considered invalid
pub const SNR_MARGINAL_MIN: f64 = 30.0;

/// Closed-form native RV model: (spectral type, V magnitude, exposure s)
/// to (SNR, sigma_RV m/s)
pub type NativeRvModel = fn(SpectralType, f64, f64) -> (f64, f64);

/// One calibrated reference point for a spectral type
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RvReferenceRow {
    pub snr: f64,
    pub sigma_rv_mps: f64,
}

/// Empirical SNR / sigma_RV calibration anchoring the scaling law
///
/// Treated as configuration data: the built-in ESPRESSO table is a default,
/// not a hard-coded truth, and callers may substitute their own revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RvReferenceTable {
    /// Instrument the calibration was measured on
    pub instrument: String,
    /// Reference exposure time in seconds
    pub exposure_s: f64,
    /// Reference V magnitude
    pub magnitude: f64,
    /// Reference telescope diameter in metres
    pub telescope_diameter_m: f64,
    /// Reference resolving power
    pub resolution: f64,
    pub rows: HashMap<SpectralType, RvReferenceRow>,
}

impl RvReferenceTable {
    pub fn row(&self, spectral_type: SpectralType) -> Option<&RvReferenceRow> {
        self.rows.get(&spectral_type)
    }
}

static ESPRESSO_REFERENCE: Lazy<RvReferenceTable> = Lazy::new(|| {
    let mut rows = HashMap::new();
    rows.insert(SpectralType::F5, RvReferenceRow { snr: 420.0, sigma_rv_mps: 0.45 });
    rows.insert(SpectralType::G2, RvReferenceRow { snr: 390.0, sigma_rv_mps: 0.50 });
    rows.insert(SpectralType::K5, RvReferenceRow { snr: 330.0, sigma_rv_mps: 0.60 });
    rows.insert(SpectralType::M2, RvReferenceRow { snr: 250.0, sigma_rv_mps: 0.90 });
    RvReferenceTable {
        instrument: "ESPRESSO".to_string(),
        exposure_s: 600.0,
        magnitude: 10.0,
        telescope_diameter_m: 8.2,
        resolution: 140_000.0,
        rows,
    }
});

/// Built-in ESPRESSO calibration used as the default fallback anchor
pub fn espresso_reference() -> &'static RvReferenceTable {
    &ESPRESSO_REFERENCE
}

/// Reliability tier of an RV estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validity {
    /// SNR >= 50
    Valid,
    /// 30 <= SNR < 50
    Marginal,
    /// SNR < 30, scaling law unreliable
    Invalid,
}

impl Validity {
    pub fn classify(snr: f64) -> Validity {
        if snr >= SNR_VALID_MIN {
            Validity::Valid
        } else if snr >= SNR_MARGINAL_MIN {
            Validity::Marginal
        } else {
            Validity::Invalid
        }
    }
}

/// Result of an RV precision computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RvEstimate {
    pub snr: f64,
    pub sigma_rv_mps: f64,
    pub validity: Validity,
    /// Instrument whose calibration anchored the estimate
    pub scaled_from: String,
    pub spectral_type: SpectralType,
    /// True when the spectral type was the G2 default rather than resolved
    pub spectral_type_defaulted: bool,
}

/// Policy knobs for the precision model
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PrecisionPolicy {
    /// Demote a Valid classification to Marginal when the spectral type was
    /// defaulted, since the table row may not describe the actual star
    pub demote_defaulted_spectral_type: bool,
}

/// RV model resolved once for an (instrument, spectral type, policy) tuple
///
/// Resolution picks the native model, the instrument's own calibration, or
/// the supplied reference table, and pre-computes the per-instrument scaling
/// factors so per-exposure evaluation is a pure arithmetic step. This is
/// what the detection-curve iterator holds on to.
#[derive(Debug, Clone)]
pub struct ResolvedRv {
    kind: ResolvedKind,
    scaled_from: String,
    spectral_type: SpectralType,
    spectral_type_defaulted: bool,
    demote_on_default: bool,
}

#[derive(Debug, Clone)]
enum ResolvedKind {
    Native(NativeRvModel),
    Scaled {
        row: RvReferenceRow,
        ref_exposure_s: f64,
        ref_magnitude: f64,
        diameter_ratio: f64,
        resolution_factor: f64,
    },
}

impl ResolvedRv {
    pub fn resolve(
        instrument: &Instrument,
        reference: &RvReferenceTable,
        policy: PrecisionPolicy,
        spectral_type: SpectralType,
        spectral_type_defaulted: bool,
    ) -> PlanResult<Self> {
        if instrument.telescope_diameter_m <= 0.0 {
            return Err(PlanError::NonPositiveDiameter(instrument.telescope_diameter_m));
        }
        if instrument.resolution <= 0.0 {
            return Err(PlanError::NonPositiveResolution(instrument.resolution));
        }

        let (kind, scaled_from) = if let Some(native) = instrument.native_model {
            (ResolvedKind::Native(native), instrument.name.clone())
        } else {
            let table = match instrument.reference_table.as_ref() {
                Some(own) => own,
                None => {
                    log::debug!(
                        "{} has no native RV model, scaling from {}",
                        instrument.name,
                        reference.instrument
                    );
                    reference
                }
            };
            let row = *table
                .row(spectral_type)
                .ok_or(PlanError::EmptyReferenceTable)?;
            (
                ResolvedKind::Scaled {
                    row,
                    ref_exposure_s: table.exposure_s,
                    ref_magnitude: table.magnitude,
                    diameter_ratio: instrument.telescope_diameter_m / table.telescope_diameter_m,
                    resolution_factor: (table.resolution / instrument.resolution).powf(1.5),
                },
                table.instrument.clone(),
            )
        };

        Ok(ResolvedRv {
            kind,
            scaled_from,
            spectral_type,
            spectral_type_defaulted,
            demote_on_default: policy.demote_defaulted_spectral_type,
        })
    }

    /// Estimate for a validated positive exposure
    pub fn estimate(&self, vmag: f64, exposure_s: f64) -> PlanResult<RvEstimate> {
        if exposure_s <= 0.0 {
            return Err(PlanError::NonPositiveExposure(exposure_s));
        }
        Ok(self.eval(vmag, exposure_s))
    }

    /// Infallible evaluation; callers must have checked `exposure_s > 0`
    pub(crate) fn eval(&self, vmag: f64, exposure_s: f64) -> RvEstimate {
        let (snr, sigma_rv_mps) = match &self.kind {
            ResolvedKind::Native(model) => model(self.spectral_type, vmag, exposure_s),
            ResolvedKind::Scaled {
                row,
                ref_exposure_s,
                ref_magnitude,
                diameter_ratio,
                resolution_factor,
            } => {
                let time_factor = (exposure_s / ref_exposure_s).sqrt();
                let mag_factor = 10f64.powf(-0.2 * (vmag - ref_magnitude));
                let snr = row.snr * diameter_ratio * time_factor * mag_factor;
                let sigma = row.sigma_rv_mps * (row.snr / snr) * resolution_factor;
                (snr, sigma)
            }
        };

        let mut validity = Validity::classify(snr);
        if self.spectral_type_defaulted && self.demote_on_default && validity == Validity::Valid {
            validity = Validity::Marginal;
        }

        RvEstimate {
            snr,
            sigma_rv_mps,
            validity,
            scaled_from: self.scaled_from.clone(),
            spectral_type: self.spectral_type,
            spectral_type_defaulted: self.spectral_type_defaulted,
        }
    }
}

/// RV precision with the built-in reference table and default policy
pub fn rv_precision(
    instrument: &Instrument,
    spectral_type: SpectralType,
    vmag: f64,
    exposure_s: f64,
) -> PlanResult<RvEstimate> {
    rv_precision_with(
        instrument,
        espresso_reference(),
        PrecisionPolicy::default(),
        spectral_type,
        false,
        vmag,
        exposure_s,
    )
}

/// RV precision against a supplied reference table and policy
///
/// `spectral_type_defaulted` records whether `spectral_type` came from the
/// G2 fallback; it travels into the estimate and, under the demotion
/// policy, caps the validity tier at Marginal.
pub fn rv_precision_with(
    instrument: &Instrument,
    reference: &RvReferenceTable,
    policy: PrecisionPolicy,
    spectral_type: SpectralType,
    spectral_type_defaulted: bool,
    vmag: f64,
    exposure_s: f64,
) -> PlanResult<RvEstimate> {
    ResolvedRv::resolve(
        instrument,
        reference,
        policy,
        spectral_type,
        spectral_type_defaulted,
    )?
    .estimate(vmag, exposure_s)
}

/// RV precision for an already-resolved target
///
/// Returns `Ok(None)` when the target has no V magnitude; there is no
/// documented default for a missing magnitude, so the computation cannot
/// proceed and the gap is logged instead of guessed around.
pub fn rv_precision_for_target(
    instrument: &Instrument,
    target: &Target,
    exposure_s: f64,
) -> PlanResult<Option<RvEstimate>> {
    let Some(vmag) = target.vmag else {
        log::warn!("target {} has no V magnitude, skipping RV precision", target.name);
        return Ok(None);
    };
    rv_precision_with(
        instrument,
        espresso_reference(),
        PrecisionPolicy::default(),
        target.spectral_type,
        target.spectral_type_defaulted,
        vmag,
        exposure_s,
    )
    .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::INSTRUMENTS;

    #[test]
    fn classify_tiers() {
        assert_eq!(Validity::classify(120.0), Validity::Valid);
        assert_eq!(Validity::classify(50.0), Validity::Valid);
        assert_eq!(Validity::classify(40.0), Validity::Marginal);
        assert_eq!(Validity::classify(10.0), Validity::Invalid);
    }

    #[test]
    fn espresso_identity_at_reference_point() {
        let espresso = INSTRUMENTS.get("ESPRESSO").unwrap();
        let table = espresso_reference();
        let row = table.row(SpectralType::G2).unwrap();

        let est = rv_precision(espresso, SpectralType::G2, table.magnitude, table.exposure_s)
            .unwrap();
        assert!((est.snr - row.snr).abs() < 1e-9);
        assert!((est.sigma_rv_mps - row.sigma_rv_mps).abs() < 1e-9);
        assert_eq!(est.scaled_from, "ESPRESSO");
    }

    #[test]
    fn non_positive_exposure_is_a_domain_error() {
        let espresso = INSTRUMENTS.get("ESPRESSO").unwrap();
        assert!(matches!(
            rv_precision(espresso, SpectralType::G2, 10.0, 0.0),
            Err(PlanError::NonPositiveExposure(_))
        ));
        assert!(matches!(
            rv_precision(espresso, SpectralType::G2, 10.0, -5.0),
            Err(PlanError::NonPositiveExposure(_))
        ));
    }

    #[test]
    fn fallback_instrument_reports_reference_anchor() {
        let harps = INSTRUMENTS.get("HARPS").unwrap();
        let est = rv_precision(harps, SpectralType::K5, 9.0, 900.0).unwrap();
        assert_eq!(est.scaled_from, "ESPRESSO");
        assert!(est.snr > 0.0 && est.sigma_rv_mps > 0.0);
    }

    #[test]
    fn native_model_bypasses_scaling() {
        fn flat(_sp: SpectralType, _vmag: f64, _t: f64) -> (f64, f64) {
            (100.0, 1.5)
        }
        let harps = INSTRUMENTS.get("HARPS").unwrap().clone().with_native_model(flat);
        let est = rv_precision(&harps, SpectralType::G2, 12.0, 60.0).unwrap();
        assert!((est.snr - 100.0).abs() < 1e-12);
        assert!((est.sigma_rv_mps - 1.5).abs() < 1e-12);
        assert_eq!(est.scaled_from, "HARPS");
    }

    #[test]
    fn demotion_policy_caps_validity_at_marginal() {
        let espresso = INSTRUMENTS.get("ESPRESSO").unwrap();
        let table = espresso_reference();
        let policy = PrecisionPolicy {
            demote_defaulted_spectral_type: true,
        };
        let est = rv_precision_with(
            espresso,
            table,
            policy,
            SpectralType::G2,
            true,
            table.magnitude,
            table.exposure_s,
        )
        .unwrap();
        assert_eq!(est.validity, Validity::Marginal);
        assert!(est.spectral_type_defaulted);
    }

    #[test]
    fn missing_vmag_yields_none() {
        let espresso = INSTRUMENTS.get("ESPRESSO").unwrap();
        let target = Target::new("dim", 10.0, 10.0, None, SpectralType::G2).unwrap();
        assert!(rv_precision_for_target(espresso, &target, 600.0)
            .unwrap()
            .is_none());
    }
}
