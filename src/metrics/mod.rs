//! Forecast evaluation module.
//!
//! Scores walk-forward forecasts against realized volatility:
//! - RMSE and MAE per model
//! - Skill score of HAR-RV over the naive benchmark
//! - Count of degenerate-fit fallbacks

pub mod evaluator;

pub use evaluator::{evaluate, mae, rmse, skill_score, EvaluationResult, Evaluator};
