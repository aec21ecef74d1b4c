//! Walk-forward forecasting module.
//!
//! Implements the rolling out-of-sample loop:
//! - Align: inner-join target and peer volatility by date
//! - Window: fixed-length training span, advanced one period per step
//! - Fit: OLS HAR-RV regression refit on every window
//! - Benchmark: previous-value forecast over the same steps

pub mod aligner;
pub mod benchmark;
pub mod forecaster;
pub mod record;
pub mod regression;
pub mod windows;

pub use aligner::{align, AlignedRow, AlignedTable, TimeSeriesAligner, MIN_WINDOW_SIZE};
pub use benchmark::{forecast_naive, BenchmarkGenerator};
pub use forecaster::{forecast, RollingForecaster, DEFAULT_WINDOW_SIZE};
pub use record::{FitDiagnostic, ForecastRecord, ModelKind};
pub use regression::{fit_ols, fit_step, FitFailure, HarCoefficients, StepOutcome, TrainingWindow};
pub use windows::{WalkForwardWindows, Window};
