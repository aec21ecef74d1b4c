//! Forecast evaluation against the naive benchmark.
//!
//! Scores both record sequences against realized outcomes and reports the
//! model's percentage RMSE improvement over the benchmark.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data::EntityId;
use crate::error::{ForecastError, ForecastResult};
use crate::walkforward::ForecastRecord;

/// Per-entity forecast quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub entity: EntityId,
    pub model_rmse: f64,
    pub naive_rmse: f64,
    /// Percentage improvement of the model over naive; negative when the
    /// model is worse.
    pub skill_score: f64,
    pub n_observations: usize,
    pub model_mae: f64,
    pub naive_mae: f64,
    /// HAR-RV steps that fell back to the naive rule.
    pub degraded_steps: usize,
}

impl EvaluationResult {
    pub fn beats_naive(&self) -> bool {
        self.skill_score > 0.0
    }

    /// Generate a summary report.
    pub fn summary(&self) -> String {
        format!(
            "Forecast Evaluation: {}\n\
             ====================\n\
             Observations: {} ({} degraded fits)\n\
             Model RMSE: {:.6}\n\
             Naive RMSE: {:.6}\n\
             Model MAE: {:.6}\n\
             Naive MAE: {:.6}\n\
             Skill Score (Improvement): {:.2}%",
            self.entity,
            self.n_observations,
            self.degraded_steps,
            self.model_rmse,
            self.naive_rmse,
            self.model_mae,
            self.naive_mae,
            self.skill_score
        )
    }
}

/// Root mean squared error of a record sequence, `None` when empty.
pub fn rmse(records: &[ForecastRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    Some(records.iter().map(|r| r.error().powi(2)).mean().sqrt())
}

/// Mean absolute error of a record sequence, `None` when empty.
pub fn mae(records: &[ForecastRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    Some(records.iter().map(|r| r.error().abs()).mean())
}

/// `(naive - model) / naive * 100`.
///
/// Fails with `DegenerateBenchmark` when `naive_rmse` is zero.
pub fn skill_score(entity: &EntityId, model_rmse: f64, naive_rmse: f64) -> ForecastResult<f64> {
    if naive_rmse == 0.0 {
        return Err(ForecastError::DegenerateBenchmark {
            entity: entity.clone(),
        });
    }
    Ok((naive_rmse - model_rmse) / naive_rmse * 100.0)
}

/// Forecast evaluator.
pub struct Evaluator;

impl Evaluator {
    /// Score model records against naive records for one entity.
    pub fn evaluate(
        entity: &EntityId,
        model: &[ForecastRecord],
        naive: &[ForecastRecord],
    ) -> ForecastResult<EvaluationResult> {
        Self::check_alignment(entity, model, naive)?;

        let no_records = || ForecastError::MisalignedForecasts {
            entity: entity.clone(),
            detail: "no records to evaluate".to_string(),
        };
        let model_rmse = rmse(model).ok_or_else(no_records)?;
        let naive_rmse = rmse(naive).ok_or_else(no_records)?;
        let model_mae = mae(model).ok_or_else(no_records)?;
        let naive_mae = mae(naive).ok_or_else(no_records)?;
        let skill_score = skill_score(entity, model_rmse, naive_rmse)?;

        Ok(EvaluationResult {
            entity: entity.clone(),
            model_rmse,
            naive_rmse,
            skill_score,
            n_observations: model.len(),
            model_mae,
            naive_mae,
            degraded_steps: model.iter().filter(|r| r.is_degraded()).count(),
        })
    }

    fn check_alignment(
        entity: &EntityId,
        model: &[ForecastRecord],
        naive: &[ForecastRecord],
    ) -> ForecastResult<()> {
        let misaligned = |detail: String| ForecastError::MisalignedForecasts {
            entity: entity.clone(),
            detail,
        };

        if model.len() != naive.len() {
            return Err(misaligned(format!(
                "{} model records vs {} naive records",
                model.len(),
                naive.len()
            )));
        }
        if let Some((idx, (m, n))) = model
            .iter()
            .zip(naive)
            .enumerate()
            .find(|(_, (m, n))| m.date != n.date)
        {
            return Err(misaligned(format!(
                "position {}: model dated {} but naive dated {}",
                idx, m.date, n.date
            )));
        }
        Ok(())
    }
}

/// Score model records against naive records for one entity.
pub fn evaluate(
    entity: &EntityId,
    model: &[ForecastRecord],
    naive: &[ForecastRecord],
) -> ForecastResult<EvaluationResult> {
    Evaluator::evaluate(entity, model, naive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walkforward::ModelKind;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn records(model: ModelKind, pairs: &[(f64, f64)]) -> Vec<ForecastRecord> {
        let base = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        pairs
            .iter()
            .enumerate()
            .map(|(i, &(p, a))| ForecastRecord::new(base + Duration::days(i as i64), p, a, model))
            .collect()
    }

    fn entity() -> EntityId {
        EntityId::from("CAVA")
    }

    #[test]
    fn test_rmse() {
        let r = records(ModelKind::HarRv, &[(0.1, 0.2), (0.3, 0.1)]);
        // sqrt((0.01 + 0.04) / 2)
        assert_relative_eq!(rmse(&r).unwrap(), 0.025_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_rmse_zero_only_for_perfect_forecasts() {
        let perfect = records(ModelKind::HarRv, &[(0.1, 0.1), (0.2, 0.2)]);
        assert_eq!(rmse(&perfect), Some(0.0));

        let off = records(ModelKind::HarRv, &[(0.1, 0.1), (0.2, 0.2000001)]);
        assert!(rmse(&off).unwrap() > 0.0);
    }

    #[test]
    fn test_mae() {
        let r = records(ModelKind::Naive, &[(0.1, 0.2), (0.3, 0.1)]);
        assert_relative_eq!(mae(&r).unwrap(), 0.15, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_records_have_no_error_metrics() {
        assert_eq!(rmse(&[]), None);
        assert_eq!(mae(&[]), None);

        let err = Evaluator::evaluate(&entity(), &[], &[]).unwrap_err();
        assert!(matches!(err, ForecastError::MisalignedForecasts { .. }));
        assert!(err.to_string().contains("no records"));
    }

    #[test]
    fn test_skill_score_sign() {
        assert_relative_eq!(skill_score(&entity(), 0.5, 1.0).unwrap(), 50.0);
        assert_relative_eq!(skill_score(&entity(), 2.41, 1.0).unwrap(), -141.0, epsilon = 1e-9);
    }

    #[test]
    fn test_skill_score_swap_flips_sign() {
        let (a, b) = (0.03, 0.05);
        let forward = skill_score(&entity(), a, b).unwrap();
        let swapped = skill_score(&entity(), b, a).unwrap();
        assert!(forward > 0.0);
        assert!(swapped < 0.0);
    }

    #[test]
    fn test_skill_score_zero_naive() {
        let err = skill_score(&entity(), 0.1, 0.0).unwrap_err();
        assert_eq!(err, ForecastError::DegenerateBenchmark { entity: entity() });
    }

    #[test]
    fn test_evaluate() {
        let model = records(ModelKind::HarRv, &[(0.11, 0.10), (0.12, 0.13)]);
        let naive = records(ModelKind::Naive, &[(0.14, 0.10), (0.10, 0.13)]);

        let result = evaluate(&entity(), &model, &naive).unwrap();
        assert_eq!(result.n_observations, 2);
        assert_relative_eq!(result.model_rmse, 0.01, epsilon = 1e-12);
        assert_relative_eq!(result.naive_rmse, 0.00125_f64.sqrt(), epsilon = 1e-12);
        assert!(result.beats_naive());
        assert_eq!(result.degraded_steps, 0);
        assert!(result.summary().contains("CAVA"));
    }

    #[test]
    fn test_evaluate_length_mismatch() {
        let model = records(ModelKind::HarRv, &[(0.1, 0.1), (0.2, 0.2)]);
        let naive = records(ModelKind::Naive, &[(0.1, 0.1)]);
        let err = evaluate(&entity(), &model, &naive).unwrap_err();
        assert_eq!(err.kind(), "misaligned_forecasts");
    }

    #[test]
    fn test_evaluate_date_mismatch() {
        let model = records(ModelKind::HarRv, &[(0.1, 0.1), (0.2, 0.2)]);
        let mut naive = records(ModelKind::Naive, &[(0.1, 0.1), (0.2, 0.3)]);
        naive[1].date += Duration::days(1);
        let err = evaluate(&entity(), &model, &naive).unwrap_err();
        assert!(err.to_string().contains("position 1"));
    }

    #[test]
    fn test_evaluate_degenerate_benchmark() {
        let model = records(ModelKind::HarRv, &[(0.06, 0.05), (0.05, 0.05)]);
        let naive = records(ModelKind::Naive, &[(0.05, 0.05), (0.05, 0.05)]);
        let err = evaluate(&entity(), &model, &naive).unwrap_err();
        assert_eq!(err.kind(), "degenerate_benchmark");
    }
}
