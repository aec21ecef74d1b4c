//! Rolling HAR-RV forecaster.
//!
//! For every step the model is refit on the trailing window only and used to
//! forecast the next row. No coefficients survive from one step to the next.

use tracing::debug;

use crate::error::ForecastResult;

use super::aligner::{check_window, AlignedTable};
use super::record::{FitDiagnostic, ForecastRecord, ModelKind};
use super::regression::{fit_step, HarCoefficients, StepOutcome, N_COEFFICIENTS};

/// Default training window length, in periods.
pub const DEFAULT_WINDOW_SIZE: usize = 6;

/// Walk-forward HAR-RV forecaster.
#[derive(Debug, Clone, Copy)]
pub struct RollingForecaster {
    window_size: usize,
}

impl Default for RollingForecaster {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl RollingForecaster {
    pub fn new(window_size: usize) -> ForecastResult<Self> {
        check_window(window_size)?;
        Ok(Self { window_size })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Produce one record per row after the first window.
    pub fn forecast(&self, table: &AlignedTable) -> ForecastResult<Vec<ForecastRecord>> {
        Ok(self
            .steps(table)?
            .into_iter()
            .map(|(record, _)| record)
            .collect())
    }

    /// Like [`forecast`](Self::forecast), also returning each step's fitted
    /// coefficients (`None` for degenerate steps).
    pub fn steps(
        &self,
        table: &AlignedTable,
    ) -> ForecastResult<Vec<(ForecastRecord, Option<HarCoefficients>)>> {
        let windows = table.windows(self.window_size)?;
        let rows = table.rows();
        let mut steps = Vec::with_capacity(windows.len());
        let mut degraded = 0usize;

        for window in &windows {
            let target_row = rows[window.target];
            let outcome = fit_step(table.training_window(window));

            let mut record = ForecastRecord::new(
                target_row.date,
                outcome.prediction(),
                target_row.target_rv,
                ModelKind::HarRv,
            );

            if let Some(diagnostic) = diagnostic(&outcome) {
                degraded += 1;
                record = record.with_diagnostic(diagnostic);
            }

            steps.push((record, outcome.coefficients()));
        }

        if degraded > 0 {
            debug!(
                "{}: {}/{} steps fell back to the previous value",
                table.entity(),
                degraded,
                steps.len()
            );
        }

        Ok(steps)
    }
}

fn diagnostic(outcome: &StepOutcome) -> Option<FitDiagnostic> {
    match outcome {
        StepOutcome::Fitted { .. } => None,
        StepOutcome::Degenerate { rank, .. } => Some(FitDiagnostic::DegenerateFit {
            rank: *rank,
            required: N_COEFFICIENTS,
        }),
        StepOutcome::NonFinite { .. } => Some(FitDiagnostic::NonFiniteForecast),
    }
}

/// Walk-forward HAR-RV forecasts for `table` with a `window_size` training window.
pub fn forecast(table: &AlignedTable, window_size: usize) -> ForecastResult<Vec<ForecastRecord>> {
    RollingForecaster::new(window_size)?.forecast(table)
}
