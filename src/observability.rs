//! Observability window calculation
//!
//! Samples the geometry engine across the twilight-bounded night, evaluates
//! the constraint set at each sample, and merges passing runs into windows.
//! Window edges are placed at the linear zero crossing of a signed
//! constraint margin between the bracketing samples, so the reported start
//! and end do not jitter with the sample resolution.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use ndarray::Array1;
use rayon::prelude::*;

use crate::celestial::{airmass_from_altitude, alt_az_deg, night_bounds};
use crate::config::Observatory;
use crate::constraints::ConstraintSet;
use crate::ephemeris::moon;
use crate::target::Target;
use crate::utils::time_utils::{add_seconds, seconds_between};
use crate::utils::vector_math::angular_separation_deg;

/// Night sampling resolution in seconds
pub const SAMPLE_STEP_S: f64 = 30.0;

/// Scale turning an illumination-fraction slack into a pseudo-angular margin
/// so it interpolates alongside the degree-valued terms
const ILLUMINATION_MARGIN_SCALE: f64 = 90.0;

/// A contiguous interval during which all constraints hold
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Civil date anchoring the night (the date of its local noon)
    pub night: NaiveDate,
}

impl ObservabilityWindow {
    pub fn duration_s(&self) -> f64 {
        seconds_between(&self.start, &self.end)
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Per-night summary statistics over the passing samples
#[derive(Debug, Clone, Copy)]
pub struct NightStats {
    /// Best (lowest) airmass reached inside the windows
    pub best_airmass: f64,
    /// Closest moon approach inside the windows, degrees
    pub min_moon_separation_deg: f64,
    /// Mean moon illumination fraction inside the windows
    pub mean_moon_illumination: f64,
}

/// Full observability result for one night
#[derive(Debug, Clone)]
pub struct NightReport {
    pub night: NaiveDate,
    /// Twilight bounds; `None` for polar degeneracies
    pub night_start: Option<DateTime<Utc>>,
    pub night_end: Option<DateTime<Utc>>,
    /// Chronological, non-overlapping windows
    pub windows: Vec<ObservabilityWindow>,
    /// Sum of window durations in seconds
    pub observable_s: f64,
    /// Whether the total meets the constraint set's minimum duration
    pub is_observable: bool,
    /// `None` when no sample passed
    pub stats: Option<NightStats>,
}

impl NightReport {
    fn empty(night: NaiveDate) -> Self {
        NightReport {
            night,
            night_start: None,
            night_end: None,
            windows: Vec::new(),
            observable_s: 0.0,
            is_observable: false,
            stats: None,
        }
    }
}

/// One night's contribution to a monthly or yearly series
#[derive(Debug, Clone, Copy)]
pub struct NightTotal {
    pub date: NaiveDate,
    pub total_s: f64,
    pub is_observable: bool,
}

/// Compute the observability report for the night anchored on `date`
pub fn nightly_report(
    target: &Target,
    site: &Observatory,
    date: NaiveDate,
    constraints: &ConstraintSet,
) -> NightReport {
    let Some((night_start, night_end)) = night_bounds(site, date, constraints.twilight) else {
        log::debug!(
            "no {:?}-twilight night at {} on {date}",
            constraints.twilight,
            site.name
        );
        return NightReport::empty(date);
    };

    let night_s = seconds_between(&night_start, &night_end);
    let n_samples = (night_s / SAMPLE_STEP_S).ceil() as usize + 1;
    let step = night_s / (n_samples - 1) as f64;

    let times: Vec<DateTime<Utc>> = (0..n_samples)
        .map(|i| add_seconds(&night_start, i as f64 * step))
        .collect();

    let min_alt = constraints.effective_min_altitude_deg();

    let mut altitude = Array1::<f64>::zeros(n_samples);
    let mut moon_sep = Array1::<f64>::zeros(n_samples);
    let mut moon_fli = Array1::<f64>::zeros(n_samples);
    let mut margin = Array1::<f64>::zeros(n_samples);

    for (i, t) in times.iter().enumerate() {
        let (alt, _az) = alt_az_deg(
            target.ra_deg,
            target.dec_deg,
            site.latitude_deg,
            site.longitude_deg,
            t,
        );
        let moon_pos = moon::position(t);
        let sep = angular_separation_deg(
            target.ra_deg,
            target.dec_deg,
            moon_pos.ra_deg,
            moon_pos.dec_deg,
        );
        let fli = moon::illumination_fraction(t);

        // Signed margins in degrees; positive means the constraint holds.
        // The moon term is satisfied by either sufficient separation or a
        // dark enough moon, so it takes the larger of the two slacks.
        let alt_margin = alt - min_alt;
        let moon_margin = (sep - constraints.min_moon_separation_deg).max(
            (constraints.max_moon_illumination - fli) * ILLUMINATION_MARGIN_SCALE,
        );

        altitude[i] = alt;
        moon_sep[i] = sep;
        moon_fli[i] = fli;
        margin[i] = alt_margin.min(moon_margin);
    }

    let windows = merge_windows(&times, margin.as_slice().unwrap_or(&[]), date);
    let observable_s: f64 = windows.iter().map(ObservabilityWindow::duration_s).sum();

    let stats = collect_stats(&altitude, &moon_sep, &moon_fli, margin.as_slice().unwrap_or(&[]));

    NightReport {
        night: date,
        night_start: Some(night_start),
        night_end: Some(night_end),
        windows,
        observable_s,
        is_observable: observable_s >= constraints.min_duration_s,
        stats,
    }
}

/// Windows only, for callers that do not need the per-night statistics
pub fn nightly_windows(
    target: &Target,
    site: &Observatory,
    date: NaiveDate,
    constraints: &ConstraintSet,
) -> Vec<ObservabilityWindow> {
    nightly_report(target, site, date, constraints).windows
}

/// Merge contiguous passing samples into windows, interpolating the edges
fn merge_windows(
    times: &[DateTime<Utc>],
    margin: &[f64],
    night: NaiveDate,
) -> Vec<ObservabilityWindow> {
    let mut windows = Vec::new();
    let n = margin.len();
    let mut i = 0;

    while i < n {
        if margin[i] <= 0.0 {
            i += 1;
            continue;
        }

        // Run of passing samples [i, j]
        let start = if i == 0 {
            times[0]
        } else {
            interpolate_crossing(&times[i - 1], &times[i], margin[i - 1], margin[i])
        };

        let mut j = i;
        while j + 1 < n && margin[j + 1] > 0.0 {
            j += 1;
        }

        let end = if j == n - 1 {
            times[n - 1]
        } else {
            interpolate_crossing(&times[j], &times[j + 1], margin[j], margin[j + 1])
        };

        if end > start {
            windows.push(ObservabilityWindow { start, end, night });
        }
        i = j + 1;
    }

    windows
}

/// Linear zero crossing of the margin between two adjacent samples
fn interpolate_crossing(
    t0: &DateTime<Utc>,
    t1: &DateTime<Utc>,
    m0: f64,
    m1: f64,
) -> DateTime<Utc> {
    let frac = if (m1 - m0).abs() < f64::EPSILON {
        0.5
    } else {
        (-m0 / (m1 - m0)).clamp(0.0, 1.0)
    };
    add_seconds(t0, frac * seconds_between(t0, t1))
}

fn collect_stats(
    altitude: &Array1<f64>,
    moon_sep: &Array1<f64>,
    moon_fli: &Array1<f64>,
    margin: &[f64],
) -> Option<NightStats> {
    let mut best_airmass = f64::INFINITY;
    let mut min_sep = f64::INFINITY;
    let mut fli_sum = 0.0;
    let mut count = 0usize;

    for (i, m) in margin.iter().enumerate() {
        if *m > 0.0 {
            if let Some(x) = airmass_from_altitude(altitude[i]) {
                best_airmass = best_airmass.min(x);
            }
            min_sep = min_sep.min(moon_sep[i]);
            fli_sum += moon_fli[i];
            count += 1;
        }
    }

    (count > 0).then(|| NightStats {
        best_airmass,
        min_moon_separation_deg: min_sep,
        mean_moon_illumination: fli_sum / count as f64,
    })
}

/// Observable duration for every night of a month
///
/// Nights are independent, so the reduction runs as a parallel map; the
/// output stays in calendar order. Degenerate polar nights contribute a
/// zero total instead of an error.
pub fn monthly_summary(
    target: &Target,
    site: &Observatory,
    year: i32,
    month: u32,
    constraints: &ConstraintSet,
) -> Vec<NightTotal> {
    dates_in_month(year, month)
        .par_iter()
        .map(|date| night_total(target, site, *date, constraints))
        .collect()
}

/// Observable duration across a whole year, sampled every `step_days` nights
///
/// `step_days = 1` gives the full per-night series; 7 matches the coarse
/// yearly overview.
pub fn yearly_summary(
    target: &Target,
    site: &Observatory,
    year: i32,
    constraints: &ConstraintSet,
    step_days: u32,
) -> Vec<NightTotal> {
    let step = step_days.max(1) as usize;
    let dates: Vec<NaiveDate> = (1..=12u32)
        .flat_map(|m| dates_in_month(year, m))
        .step_by(step)
        .collect();

    dates
        .par_iter()
        .map(|date| night_total(target, site, *date, constraints))
        .collect()
}

fn night_total(
    target: &Target,
    site: &Observatory,
    date: NaiveDate,
    constraints: &ConstraintSet,
) -> NightTotal {
    let report = nightly_report(target, site, date, constraints);
    NightTotal {
        date,
        total_s: report.observable_s,
        is_observable: report.is_observable,
    }
}

/// Scale an observable duration by the site's weather usable fraction
///
/// Uses the monthly fraction when available, the yearly average otherwise,
/// and leaves the duration unchanged for sites without weather statistics.
pub fn expected_usable_s(total_s: f64, site: &Observatory, month: u32) -> f64 {
    site.weather_statistics
        .as_ref()
        .map_or(total_s, |w| total_s * w.usable_fraction(month))
}

fn dates_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return Vec::new(),
    };
    let mut dates = Vec::with_capacity(31);
    let mut d = first;
    while d.month() == month {
        dates.push(d);
        d += Duration::days(1);
    }
    dates
}
