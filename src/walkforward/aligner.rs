//! Alignment of target and peer volatility on a common date index.
//!
//! Rows are the inner join of both series. The peer value stored on row t is
//! the peer average known as of t; the forecaster only ever uses it to predict
//! row t+1, so every prediction sees peer data from strictly before its date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{EntityId, ObservationSeries};
use crate::error::{ForecastError, ForecastResult};

use super::regression::TrainingWindow;
use super::windows::{WalkForwardWindows, Window};

/// Smallest window that still leaves one regression pair.
pub const MIN_WINDOW_SIZE: usize = 2;

/// One aligned period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub date: NaiveDate,
    /// Realized volatility of the target on `date`.
    pub target_rv: f64,
    /// Peer-average realized volatility known as of `date`.
    pub peer_prior_rv: f64,
}

impl AlignedRow {
    pub fn new(date: NaiveDate, target_rv: f64, peer_prior_rv: f64) -> Self {
        Self {
            date,
            target_rv,
            peer_prior_rv,
        }
    }
}

/// Per-entity feature/target table, sorted ascending by date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAlignedTable")]
pub struct AlignedTable {
    entity: EntityId,
    rows: Vec<AlignedRow>,
}

#[derive(Deserialize)]
struct RawAlignedTable {
    entity: EntityId,
    rows: Vec<AlignedRow>,
}

impl TryFrom<RawAlignedTable> for AlignedTable {
    type Error = ForecastError;

    fn try_from(raw: RawAlignedTable) -> Result<Self, Self::Error> {
        Self::new(raw.entity, raw.rows)
    }
}

impl AlignedTable {
    /// Build a table from rows that are already aligned.
    ///
    /// Fails if dates are not strictly increasing.
    pub fn new(entity: EntityId, rows: Vec<AlignedRow>) -> ForecastResult<Self> {
        if let Some(pair) = rows.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(ForecastError::InvalidSeries {
                entity,
                detail: format!(
                    "aligned dates not strictly increasing at {} (previous {})",
                    pair[1].date, pair[0].date
                ),
            });
        }
        Ok(Self { entity, rows })
    }

    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Check the table can feed at least one walk-forward step.
    pub fn require_rows(&self, window_size: usize) -> ForecastResult<()> {
        check_window(window_size)?;
        let required = window_size + 1;
        if self.rows.len() < required {
            return Err(ForecastError::InsufficientData {
                entity: self.entity.clone(),
                rows: self.rows.len(),
                required,
            });
        }
        Ok(())
    }

    /// Walk-forward windows over this table.
    pub fn windows(&self, window_size: usize) -> ForecastResult<Vec<Window>> {
        self.require_rows(window_size)?;
        Ok(WalkForwardWindows::new(window_size, self.rows.len()).generate())
    }

    /// Rows covered by a window's training span.
    pub fn training_rows(&self, window: &Window) -> &[AlignedRow] {
        &self.rows[window.train_range()]
    }

    /// A window's training span, ending at row `train_end`.
    pub fn training_window(&self, window: &Window) -> TrainingWindow<'_> {
        TrainingWindow::from_parts(self.training_rows(window), &self.rows[window.train_end])
    }
}

pub(crate) fn check_window(window_size: usize) -> ForecastResult<()> {
    if window_size < MIN_WINDOW_SIZE {
        return Err(ForecastError::InvalidWindow(window_size));
    }
    Ok(())
}

/// Aligner bound to a window size, mirroring [`super::RollingForecaster`].
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesAligner {
    window_size: usize,
}

impl TimeSeriesAligner {
    pub fn new(window_size: usize) -> ForecastResult<Self> {
        check_window(window_size)?;
        Ok(Self { window_size })
    }

    pub fn align(
        &self,
        target: &ObservationSeries,
        peer: &ObservationSeries,
    ) -> ForecastResult<AlignedTable> {
        align(target, peer, self.window_size)
    }
}

/// Inner-join target and peer series on date.
///
/// Dates missing from either side are dropped, never imputed. Fails with
/// `InsufficientData` when fewer than `window_size + 1` rows survive.
pub fn align(
    target: &ObservationSeries,
    peer: &ObservationSeries,
    window_size: usize,
) -> ForecastResult<AlignedTable> {
    check_window(window_size)?;

    let targets = target.points();
    let peers = peer.points();
    let mut rows = Vec::with_capacity(targets.len().min(peers.len()));

    // Both series are strictly increasing, so a merge walk suffices.
    let (mut i, mut j) = (0, 0);
    while i < targets.len() && j < peers.len() {
        let (t, p) = (targets[i], peers[j]);
        if t.date < p.date {
            i += 1;
        } else if t.date > p.date {
            j += 1;
        } else {
            rows.push(AlignedRow::new(t.date, t.value, p.value));
            i += 1;
            j += 1;
        }
    }

    let dropped = targets.len() - rows.len();
    if dropped > 0 {
        debug!(
            "{}: dropped {} target dates without peer coverage",
            target.entity(),
            dropped
        );
    }

    let table = AlignedTable {
        entity: target.entity().clone(),
        rows,
    };
    table.require_rows(window_size)?;

    Ok(table)
}
