//! Transit ephemeris and transit-constrained observability
//!
//! Transit occurrences form an arithmetic progression over the reference
//! epoch, so they are generated lazily rather than materialized; long query
//! ranges cost nothing in memory.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::Observatory;
use crate::constraints::ConstraintSet;
use crate::error::{PlanError, PlanResult};
use crate::observability::{nightly_windows, ObservabilityWindow};
use crate::target::Target;

/// Periodic transit ephemeris for a known planet
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TransitEphemeris {
    /// Reference mid-transit epoch
    pub epoch: DateTime<Utc>,
    /// Orbital period
    pub period: Duration,
    /// Full transit duration
    pub duration: Duration,
}

/// One transit occurrence, `[start, end]` centered on a mid-transit time
pub type TransitWindow = (DateTime<Utc>, DateTime<Utc>);

impl TransitEphemeris {
    pub fn new(epoch: DateTime<Utc>, period: Duration, duration: Duration) -> PlanResult<Self> {
        if period <= Duration::zero() {
            return Err(PlanError::NonPositivePeriod(
                period.num_milliseconds() as f64 / 1000.0,
            ));
        }
        if duration <= Duration::zero() {
            return Err(PlanError::NonPositiveDuration(
                duration.num_milliseconds() as f64 / 1000.0,
            ));
        }
        // Consecutive transit windows must not touch, or the intersection
        // with nightly windows could emit overlapping output
        if duration >= period {
            return Err(PlanError::DurationExceedsPeriod {
                duration_s: duration.num_milliseconds() as f64 / 1000.0,
                period_s: period.num_milliseconds() as f64 / 1000.0,
            });
        }
        Ok(TransitEphemeris {
            epoch,
            period,
            duration,
        })
    }

    /// Mid-transit time of occurrence `n` (signed, relative to the epoch)
    fn center(&self, n: i64) -> DateTime<Utc> {
        let period_us = self.period.num_microseconds().unwrap_or(i64::MAX);
        self.epoch + Duration::microseconds(period_us.saturating_mul(n))
    }

    /// Lazy, unbounded iterator over transit windows, starting with the
    /// first occurrence whose window ends at or after `from`
    ///
    /// Restartable: each call produces a fresh iterator anchored at `from`.
    pub fn occurrences_from(&self, from: DateTime<Utc>) -> TransitIter<'_> {
        // First n with center + duration/2 >= from
        let half = self.duration / 2;
        let period_us = self.period.num_microseconds().unwrap_or(i64::MAX).max(1);
        let offset_us = (from - self.epoch - half).num_microseconds().unwrap_or(0);
        let n = offset_us.div_euclid(period_us)
            + i64::from(offset_us.rem_euclid(period_us) != 0);
        TransitIter { ephemeris: self, n }
    }

    /// Finite sequence of transit windows overlapping `[start, end]`,
    /// clipped to the range
    ///
    /// A zero-length range returns exactly the transit containing that
    /// instant, or nothing.
    pub fn windows_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PlanResult<Vec<TransitWindow>> {
        if start > end {
            return Err(PlanError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        Ok(self
            .occurrences_from(start)
            .take_while(|(t_start, _)| *t_start <= end)
            .map(|(t_start, t_end)| (t_start.max(start), t_end.min(end)))
            .collect())
    }
}

/// Iterator over successive transit windows of an ephemeris
pub struct TransitIter<'a> {
    ephemeris: &'a TransitEphemeris,
    n: i64,
}

impl Iterator for TransitIter<'_> {
    type Item = TransitWindow;

    fn next(&mut self) -> Option<Self::Item> {
        let center = self.ephemeris.center(self.n);
        self.n += 1;
        let half = self.ephemeris.duration / 2;
        Some((center - half, center + half))
    }
}

/// Transit windows that are actually observable
///
/// Each transit occurrence in `[start, end]` is intersected with the nightly
/// observability windows of the nights it touches. A transit that only
/// partially overlaps a window yields the intersection; fully unobservable
/// transits contribute nothing.
pub fn observable_transits(
    target: &Target,
    site: &Observatory,
    constraints: &ConstraintSet,
    ephemeris: &TransitEphemeris,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> PlanResult<Vec<ObservabilityWindow>> {
    let transits = ephemeris.windows_in_range(start, end)?;
    let mut result = Vec::new();

    for (t_start, t_end) in transits {
        for date in nights_touching(t_start, t_end) {
            for w in nightly_windows(target, site, date, constraints) {
                let s = w.start.max(t_start);
                let e = w.end.min(t_end);
                if s < e {
                    result.push(ObservabilityWindow {
                        start: s,
                        end: e,
                        night: w.night,
                    });
                }
            }
        }
    }

    result.sort_by_key(|w| w.start);
    result.dedup_by(|a, b| a.start == b.start && a.end == b.end);
    Ok(result)
}

/// Civil dates whose night could overlap the interval
///
/// A night anchored on date D spans roughly D noon to D+1 noon local, so
/// the candidate anchors run from the day before the interval starts to the
/// day it ends.
fn nights_touching(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut d = start.date_naive() - Duration::days(1);
    let last = end.date_naive();
    while d <= last {
        dates.push(d);
        d += Duration::days(1);
    }
    dates
}
