//! Forecast records emitted by the walk-forward loop.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which model produced a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[serde(rename = "HAR-RV")]
    HarRv,
    #[serde(rename = "naive")]
    Naive,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HarRv => "HAR-RV",
            Self::Naive => "naive",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal diagnostic attached to a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitDiagnostic {
    /// The design matrix was rank-deficient and the step fell back to the
    /// previous observed value.
    DegenerateFit { rank: usize, required: usize },
    /// The window, coefficients or forecast were NaN or infinite and the step
    /// fell back to the previous observed value.
    NonFiniteForecast,
}

/// One out-of-sample forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub predicted: f64,
    pub actual: f64,
    pub model: ModelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<FitDiagnostic>,
}

impl ForecastRecord {
    pub fn new(date: NaiveDate, predicted: f64, actual: f64, model: ModelKind) -> Self {
        Self {
            date,
            predicted,
            actual,
            model,
            diagnostic: None,
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: FitDiagnostic) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    /// Forecast error, predicted minus actual.
    pub fn error(&self) -> f64 {
        self.predicted - self.actual
    }

    /// Whether the step fell back to the previous value.
    pub fn is_degraded(&self) -> bool {
        self.diagnostic.is_some()
    }
}
