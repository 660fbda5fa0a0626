//! Observing constraint configuration

use serde::{Deserialize, Serialize};

use crate::celestial::altitude_for_airmass;

/// Night-boundary definition as a sun-altitude threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TwilightKind {
    /// Sunset to sunrise (0 degrees)
    SunsetSunrise,
    /// Nautical twilight (-12 degrees)
    Nautical,
    /// Astronomical twilight (-18 degrees)
    Astronomical,
}

impl TwilightKind {
    /// Sun altitude threshold in degrees bounding the usable night
    pub fn sun_altitude_deg(&self) -> f64 {
        match self {
            TwilightKind::SunsetSunrise => 0.0,
            TwilightKind::Nautical => -12.0,
            TwilightKind::Astronomical => -18.0,
        }
    }
}

/// Constraint set applied to every observability computation
///
/// `min_altitude_deg` and `max_airmass` combine: the effective altitude floor
/// is whichever is stricter. The moon-separation constraint is waived while
/// the moon illumination is at or below `max_moon_illumination`; a dark moon
/// never blocks observing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub twilight: TwilightKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_altitude_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_airmass: Option<f64>,
    /// Minimum moon-target separation in degrees
    pub min_moon_separation_deg: f64,
    /// Moon illumination fraction above which the separation constraint is
    /// enforced
    pub max_moon_illumination: f64,
    /// Minimum total observable time for a night to count as observable, in
    /// seconds. Windows shorter than this are still reported; only the
    /// per-night flag is affected.
    pub min_duration_s: f64,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        ConstraintSet {
            twilight: TwilightKind::Nautical,
            min_altitude_deg: None,
            max_airmass: Some(2.0),
            min_moon_separation_deg: 30.0,
            max_moon_illumination: 0.5,
            min_duration_s: 3600.0,
        }
    }
}

impl ConstraintSet {
    /// Effective minimum target altitude in degrees
    ///
    /// The horizon when neither an altitude floor nor an airmass cap is set.
    pub fn effective_min_altitude_deg(&self) -> f64 {
        let from_airmass = self.max_airmass.and_then(altitude_for_airmass);
        match (self.min_altitude_deg, from_airmass) {
            (Some(a), Some(b)) => a.max(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twilight_thresholds() {
        assert_eq!(TwilightKind::SunsetSunrise.sun_altitude_deg(), 0.0);
        assert_eq!(TwilightKind::Nautical.sun_altitude_deg(), -12.0);
        assert_eq!(TwilightKind::Astronomical.sun_altitude_deg(), -18.0);
    }

    #[test]
    fn default_airmass_cap_implies_thirty_degrees() {
        let c = ConstraintSet::default();
        assert!((c.effective_min_altitude_deg() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn stricter_of_altitude_and_airmass_wins() {
        let mut c = ConstraintSet {
            min_altitude_deg: Some(45.0),
            ..ConstraintSet::default()
        };
        assert!((c.effective_min_altitude_deg() - 45.0).abs() < 1e-9);

        c.min_altitude_deg = Some(10.0);
        assert!((c.effective_min_altitude_deg() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn sub_unity_airmass_cap_is_ignored() {
        let c = ConstraintSet {
            min_altitude_deg: None,
            max_airmass: Some(0.5),
            ..ConstraintSet::default()
        };
        assert_eq!(c.effective_min_altitude_deg(), 0.0);
    }

    #[test]
    fn no_limits_means_horizon() {
        let c = ConstraintSet {
            min_altitude_deg: None,
            max_airmass: None,
            ..ConstraintSet::default()
        };
        assert_eq!(c.effective_min_altitude_deg(), 0.0);
    }

    #[test]
    fn constraint_set_round_trips_through_json() {
        let c = ConstraintSet::default();
        let json = serde_json::to_string(&c).unwrap();
        let back: ConstraintSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.twilight, TwilightKind::Nautical);
        assert!((back.min_moon_separation_deg - 30.0).abs() < 1e-12);
    }
}
