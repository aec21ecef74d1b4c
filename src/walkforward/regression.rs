//! Per-window HAR-RV regression.
//!
//! Fits `rv[t+1] = b0 + b1 * rv[t] + b2 * peer[t]` by ordinary least squares
//! over the consecutive pairs inside one training window. Every fit is a pure
//! function of its window; nothing is carried between steps.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::aligner::AlignedRow;

/// Number of regression coefficients (intercept, own lag, peer prior).
pub const N_COEFFICIENTS: usize = 3;

/// Singular values below this fraction of the largest one count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Fitted HAR-RV coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarCoefficients {
    pub intercept: f64,
    pub lag_rv: f64,
    pub peer_prior: f64,
}

impl HarCoefficients {
    pub fn predict(&self, lag_rv: f64, peer_prior: f64) -> f64 {
        self.intercept + self.lag_rv * lag_rv + self.peer_prior * peer_prior
    }

    fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.lag_rv.is_finite() && self.peer_prior.is_finite()
    }
}

/// Why a window could not be fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitFailure {
    /// The design matrix has fewer than [`N_COEFFICIENTS`] independent columns.
    RankDeficient { rank: usize },
    /// The window or the solution contains NaN or infinite values.
    NonFinite,
}

/// Training rows of one walk-forward step. Never empty.
#[derive(Debug, Clone, Copy)]
pub struct TrainingWindow<'a> {
    rows: &'a [AlignedRow],
    last: &'a AlignedRow,
}

impl<'a> TrainingWindow<'a> {
    /// `None` for an empty slice.
    pub fn new(rows: &'a [AlignedRow]) -> Option<Self> {
        let last = rows.last()?;
        Some(Self { rows, last })
    }

    /// `rows` must end with `last`.
    pub(super) fn from_parts(rows: &'a [AlignedRow], last: &'a AlignedRow) -> Self {
        debug_assert!(rows.last() == Some(last));
        Self { rows, last }
    }

    pub fn rows(&self) -> &'a [AlignedRow] {
        self.rows
    }

    /// Row whose values drive the forecast.
    pub fn last(&self) -> &'a AlignedRow {
        self.last
    }
}

/// Result of one walk-forward step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Fitted {
        coefficients: HarCoefficients,
        prediction: f64,
    },
    /// Rank-deficient design; fell back to the last observed value.
    Degenerate { rank: usize, prediction: f64 },
    /// Non-finite inputs, coefficients or forecast; fell back to the last
    /// observed value.
    NonFinite { prediction: f64 },
}

impl StepOutcome {
    pub fn prediction(&self) -> f64 {
        match self {
            Self::Fitted { prediction, .. }
            | Self::Degenerate { prediction, .. }
            | Self::NonFinite { prediction } => *prediction,
        }
    }

    pub fn coefficients(&self) -> Option<HarCoefficients> {
        match self {
            Self::Fitted { coefficients, .. } => Some(*coefficients),
            Self::Degenerate { .. } | Self::NonFinite { .. } => None,
        }
    }
}

/// Fit OLS over the consecutive (t, t+1) pairs of `window`.
pub fn fit_ols(window: &[AlignedRow]) -> Result<HarCoefficients, FitFailure> {
    let n_pairs = window.len().saturating_sub(1);
    if n_pairs == 0 {
        return Err(FitFailure::RankDeficient { rank: 0 });
    }

    if window
        .iter()
        .any(|r| !(r.target_rv.is_finite() && r.peer_prior_rv.is_finite()))
    {
        return Err(FitFailure::NonFinite);
    }

    let x = DMatrix::from_fn(n_pairs, N_COEFFICIENTS, |r, c| match c {
        0 => 1.0,
        1 => window[r].target_rv,
        _ => window[r].peer_prior_rv,
    });
    let y = DVector::from_fn(n_pairs, |r, _| window[r + 1].target_rv);

    let svd = x.svd(true, true);
    if svd.singular_values.iter().any(|s| !s.is_finite()) {
        return Err(FitFailure::NonFinite);
    }
    let largest = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let eps = largest * RANK_TOLERANCE;
    let rank = svd.rank(eps);

    if largest == 0.0 || rank < N_COEFFICIENTS {
        return Err(FitFailure::RankDeficient { rank });
    }

    let beta = svd
        .solve(&y, eps)
        .map_err(|_| FitFailure::RankDeficient { rank })?;
    let coefficients = HarCoefficients {
        intercept: beta[0],
        lag_rv: beta[1],
        peer_prior: beta[2],
    };

    if !coefficients.is_finite() {
        return Err(FitFailure::NonFinite);
    }

    Ok(coefficients)
}

/// Fit on `window` and forecast the period right after it.
///
/// The forecast uses the window's last row as regressors. Failed fits and
/// non-finite forecasts fall back to that row's observed value.
pub fn fit_step(window: TrainingWindow<'_>) -> StepOutcome {
    resolve_step(fit_ols(window.rows()), window.last())
}

fn resolve_step(fit: Result<HarCoefficients, FitFailure>, last: &AlignedRow) -> StepOutcome {
    let fallback = last.target_rv;
    match fit {
        Ok(coefficients) => {
            let prediction = coefficients.predict(last.target_rv, last.peer_prior_rv);
            if prediction.is_finite() {
                StepOutcome::Fitted {
                    coefficients,
                    prediction,
                }
            } else {
                StepOutcome::NonFinite {
                    prediction: fallback,
                }
            }
        }
        Err(FitFailure::RankDeficient { rank }) => StepOutcome::Degenerate {
            rank,
            prediction: fallback,
        },
        Err(FitFailure::NonFinite) => StepOutcome::NonFinite {
            prediction: fallback,
        },
    }
}
