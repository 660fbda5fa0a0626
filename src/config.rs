//! Observatory and instrument configuration
//!
//! All quantities carry their unit in the field name. The built-in catalog
//! mirrors the spectrographs this planner is normally used with; callers can
//! also construct their own `Observatory`/`Instrument` values.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::precision::{espresso_reference, NativeRvModel, RvReferenceTable};

/// Weather loss statistics for an observatory.
/// Fractions refer to *usable time*, not lost time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherStatistics {
    /// Explanatory text
    pub description: String,
    /// Authoritative webpage
    pub reference_url: String,
    pub yearly_usable_fraction: f64,
    /// Per-month usable fraction, keyed by month number 1-12
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_usable_fraction: Option<HashMap<u32, f64>>,
}

impl WeatherStatistics {
    /// Usable fraction for a month, falling back to the yearly average
    pub fn usable_fraction(&self, month: u32) -> f64 {
        self.monthly_usable_fraction
            .as_ref()
            .and_then(|m| m.get(&month).copied())
            .unwrap_or(self.yearly_usable_fraction)
    }
}

/// A ground site with geographic coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observatory {
    pub name: String,
    pub latitude_deg: f64,
    /// East-positive longitude
    pub longitude_deg: f64,
    pub elevation_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_statistics: Option<WeatherStatistics>,
}

impl Observatory {
    pub fn new(
        name: impl Into<String>,
        latitude_deg: f64,
        longitude_deg: f64,
        elevation_m: f64,
    ) -> PlanResult<Self> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(PlanError::LatitudeOutOfRange(latitude_deg));
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(PlanError::LongitudeOutOfRange(longitude_deg));
        }
        Ok(Observatory {
            name: name.into(),
            latitude_deg,
            longitude_deg,
            elevation_m,
            weather_statistics: None,
        })
    }

    pub fn with_weather(mut self, weather: WeatherStatistics) -> Self {
        self.weather_statistics = Some(weather);
        self
    }
}

/// A spectrograph on a telescope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub observatory: Observatory,
    /// Spectral resolving power, lambda / delta-lambda
    pub resolution: f64,
    /// Primary mirror diameter in metres
    pub telescope_diameter_m: f64,
    /// Empirically calibrated SNR / sigma_RV reference table, if the
    /// instrument has one of its own
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_table: Option<RvReferenceTable>,
    /// Closed-form native RV model, if the instrument ships one
    #[serde(skip)]
    pub native_model: Option<NativeRvModel>,
}

impl Instrument {
    pub fn new(
        name: impl Into<String>,
        observatory: Observatory,
        resolution: f64,
        telescope_diameter_m: f64,
    ) -> PlanResult<Self> {
        if telescope_diameter_m <= 0.0 {
            return Err(PlanError::NonPositiveDiameter(telescope_diameter_m));
        }
        if resolution <= 0.0 {
            return Err(PlanError::NonPositiveResolution(resolution));
        }
        Ok(Instrument {
            name: name.into(),
            observatory,
            resolution,
            telescope_diameter_m,
            reference_table: None,
            native_model: None,
        })
    }

    pub fn with_reference_table(mut self, table: RvReferenceTable) -> Self {
        self.reference_table = Some(table);
        self
    }

    pub fn with_native_model(mut self, model: NativeRvModel) -> Self {
        self.native_model = Some(model);
        self
    }
}

fn observatory(name: &str, lat: f64, lon: f64, elev: f64) -> Observatory {
    // Catalog coordinates are compile-time constants inside valid ranges
    Observatory::new(name, lat, lon, elev).unwrap_or_else(|e| unreachable!("{e}"))
}

fn instrument(name: &str, site: Observatory, resolution: f64, diameter: f64) -> Instrument {
    Instrument::new(name, site, resolution, diameter).unwrap_or_else(|e| unreachable!("{e}"))
}

fn weather(description: &str, url: &str, yearly: f64) -> WeatherStatistics {
    WeatherStatistics {
        description: description.to_string(),
        reference_url: url.to_string(),
        yearly_usable_fraction: yearly,
        monthly_usable_fraction: None,
    }
}

pub static LA_SILLA: Lazy<Observatory> = Lazy::new(|| {
    observatory("La Silla Observatory", -29.2567, -70.7346, 2400.0).with_weather(weather(
        "Crude estimate from the very limited available information.",
        "https://www.eso.org/sci/facilities/lasilla/astclim/weather.html",
        0.80,
    ))
});

pub static LA_PALMA: Lazy<Observatory> = Lazy::new(|| {
    observatory(
        "Roque de los Muchachos Observatory",
        28.7606,
        -17.8850,
        2396.0,
    )
    .with_weather(weather(
        "Published studies find ~63% (ground) to ~72% (satellite) clear-night fraction; \
         upper range used for spectroscopic nights.",
        "https://academic.oup.com/mnras/article/401/3/1904/1096431",
        0.70,
    ))
});

pub static PARANAL: Lazy<Observatory> = Lazy::new(|| {
    observatory("Paranal Observatory", -24.6270, -70.4040, 2635.0).with_weather(weather(
        "Long-term ESO statistics over photometric, clear and thin-cloud nights.",
        "https://www.eso.org/sci/facilities/paranal/astroclimate/Obsconditions.html",
        0.90,
    ))
});

pub static CALAR_ALTO: Lazy<Observatory> = Lazy::new(|| {
    observatory("Calar Alto Observatory", 37.2236, -2.5463, 2168.0).with_weather(weather(
        "Derived from long-term Calar Alto night statistics as reported in the literature.",
        "https://arxiv.org/abs/0709.0813",
        0.70,
    ))
});

/// Built-in instrument catalog, keyed by instrument name
pub static INSTRUMENTS: Lazy<HashMap<&'static str, Instrument>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "EXOTICA",
        instrument("EXOTICA", CALAR_ALTO.clone(), 60_000.0, 1.23),
    );
    m.insert(
        "CORALIE",
        instrument("CORALIE", LA_SILLA.clone(), 60_000.0, 1.2),
    );
    m.insert(
        "HARPS",
        instrument("HARPS", LA_SILLA.clone(), 115_000.0, 3.6),
    );
    m.insert(
        "HARPS-N",
        instrument("HARPS-N", LA_PALMA.clone(), 115_000.0, 3.58),
    );
    m.insert(
        "ESPRESSO",
        instrument("ESPRESSO", PARANAL.clone(), 140_000.0, 8.2)
            .with_reference_table(espresso_reference().clone()),
    );
    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_reference_instrument() {
        let espresso = INSTRUMENTS.get("ESPRESSO").unwrap();
        assert!(espresso.reference_table.is_some());
        assert!((espresso.telescope_diameter_m - 8.2).abs() < 1e-9);
    }

    #[test]
    fn observatory_rejects_bad_latitude() {
        assert!(matches!(
            Observatory::new("x", 95.0, 0.0, 0.0),
            Err(PlanError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn instrument_rejects_non_positive_diameter() {
        let site = Observatory::new("x", 0.0, 0.0, 0.0).unwrap();
        assert!(matches!(
            Instrument::new("x", site, 100_000.0, 0.0),
            Err(PlanError::NonPositiveDiameter(_))
        ));
    }

    #[test]
    fn weather_falls_back_to_yearly_fraction() {
        let w = LA_PALMA.weather_statistics.as_ref().unwrap();
        assert!((w.usable_fraction(6) - 0.70).abs() < 1e-9);
    }

    #[test]
    fn instrument_round_trips_through_json() {
        let harps = INSTRUMENTS.get("HARPS").unwrap();
        let json = serde_json::to_string(harps).unwrap();
        let back: Instrument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "HARPS");
        assert!((back.resolution - 115_000.0).abs() < 1e-9);
    }
}
