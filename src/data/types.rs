//! Core data types for volatility forecasting.
//!
//! Observation series are the unit of exchange between the data collaborators
//! (return loading, peer averaging) and the forecasting core. They are
//! validated on construction so the core can rely on ordering and finiteness.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

/// Identifier of a forecast entity (the target IPO ticker).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What an observation series measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Realized volatility proxy of the entity itself.
    RealizedVol,
    /// Average realized volatility across the entity's peer group.
    PeerAvgVol,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RealizedVol => "realized_vol",
            Self::PeerAvgVol => "peer_avg_vol",
        }
    }
}

/// A single dated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Ordered volatility observations for one entity and one metric.
///
/// Invariants (checked by [`ObservationSeries::new`]):
/// - dates strictly increasing, no duplicates
/// - values finite and non-negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObservationSeries")]
pub struct ObservationSeries {
    entity: EntityId,
    metric: Metric,
    points: Vec<Observation>,
}

/// Unchecked wire form; deserialization goes through [`ObservationSeries::new`].
#[derive(Deserialize)]
struct RawObservationSeries {
    entity: EntityId,
    metric: Metric,
    points: Vec<Observation>,
}

impl TryFrom<RawObservationSeries> for ObservationSeries {
    type Error = ForecastError;

    fn try_from(raw: RawObservationSeries) -> Result<Self, Self::Error> {
        Self::new(raw.entity, raw.metric, raw.points)
    }
}

impl ObservationSeries {
    /// Build a validated series.
    pub fn new(entity: EntityId, metric: Metric, points: Vec<Observation>) -> ForecastResult<Self> {
        for (idx, obs) in points.iter().enumerate() {
            if !obs.value.is_finite() {
                return Err(ForecastError::InvalidSeries {
                    entity,
                    detail: format!("{} value at {} is not finite", metric.as_str(), obs.date),
                });
            }
            if obs.value < 0.0 {
                return Err(ForecastError::InvalidSeries {
                    entity,
                    detail: format!(
                        "{} value {} at {} is negative",
                        metric.as_str(),
                        obs.value,
                        obs.date
                    ),
                });
            }
            if idx > 0 && points[idx - 1].date >= obs.date {
                return Err(ForecastError::InvalidSeries {
                    entity,
                    detail: format!(
                        "{} dates not strictly increasing at {} (previous {})",
                        metric.as_str(),
                        obs.date,
                        points[idx - 1].date
                    ),
                });
            }
        }

        Ok(Self {
            entity,
            metric,
            points,
        })
    }

    /// Build a series from parallel date and value slices.
    pub fn from_parts(
        entity: EntityId,
        metric: Metric,
        dates: &[NaiveDate],
        values: &[f64],
    ) -> ForecastResult<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidSeries {
                entity,
                detail: format!("{} dates but {} values", dates.len(), values.len()),
            });
        }
        let points = dates
            .iter()
            .zip(values)
            .map(|(&date, &value)| Observation::new(date, value))
            .collect();
        Self::new(entity, metric, points)
    }

    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|o| o.date)
    }

    /// Value observed on `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |o| o.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }
}

/// Daily simple returns for one ticker, as delivered by a data provider.
///
/// Returns may be negative; they are sorted by date with duplicates and
/// non-finite values removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub ticker: String,
    pub points: Vec<Observation>,
}

impl ReturnSeries {
    /// Normalize raw points: drop non-finite values, sort by date, keep the
    /// last value for a duplicated date.
    pub fn new(ticker: impl Into<String>, mut points: Vec<Observation>) -> Self {
        points.retain(|o| o.value.is_finite());
        points.sort_by_key(|o| o.date);

        let mut deduped: Vec<Observation> = Vec::with_capacity(points.len());
        for obs in points {
            match deduped.last_mut() {
                Some(last) if last.date == obs.date => *last = obs,
                _ => deduped.push(obs),
            }
        }

        Self {
            ticker: ticker.into(),
            points: deduped,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Restrict to an inclusive date range.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: self.ticker.clone(),
            points: self
                .points
                .iter()
                .filter(|o| o.date >= start && o.date <= end)
                .copied()
                .collect(),
        }
    }
}
