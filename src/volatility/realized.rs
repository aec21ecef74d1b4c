//! Realized-volatility proxies.
//!
//! Daily realized volatility is approximated by the absolute daily return.
//! The peer prior is the cross-sectional mean of peer RV on each date, using
//! whichever peers traded that day.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::{EntityId, Metric, Observation, ObservationSeries, ReturnSeries};
use crate::error::ForecastResult;

/// Absolute-return RV series for `returns`, attributed to `entity`.
pub fn realized_volatility(
    entity: &EntityId,
    returns: &ReturnSeries,
) -> ForecastResult<ObservationSeries> {
    let points = returns
        .points
        .iter()
        .map(|o| Observation::new(o.date, o.value.abs()))
        .collect();
    ObservationSeries::new(entity.clone(), Metric::RealizedVol, points)
}

/// Per-date mean of peer RV series.
///
/// A date is present when at least one peer has a value for it; missing peers
/// are skipped rather than treated as zero.
pub fn peer_average(
    entity: &EntityId,
    peers: &[ObservationSeries],
) -> ForecastResult<ObservationSeries> {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();

    for series in peers {
        for obs in series.points() {
            let entry = sums.entry(obs.date).or_insert((0.0, 0));
            entry.0 += obs.value;
            entry.1 += 1;
        }
    }

    let points = sums
        .into_iter()
        .map(|(date, (sum, count))| Observation::new(date, sum / count as f64))
        .collect();

    ObservationSeries::new(entity.clone(), Metric::PeerAvgVol, points)
}

/// Number of peers contributing on each date of the peer average.
pub fn peer_coverage(peers: &[ObservationSeries]) -> BTreeMap<NaiveDate, usize> {
    let mut coverage = BTreeMap::new();
    for series in peers {
        for obs in series.points() {
            *coverage.entry(obs.date).or_insert(0) += 1;
        }
    }
    coverage
}
