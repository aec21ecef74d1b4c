//! Per-entity and batch reports.

use serde::{Deserialize, Serialize};

use crate::data::EntityId;
use crate::metrics::EvaluationResult;
use crate::walkforward::ForecastRecord;

/// Everything produced for one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity: EntityId,
    pub peers: Vec<String>,
    pub evaluation: EvaluationResult,
    pub model_records: Vec<ForecastRecord>,
    pub naive_records: Vec<ForecastRecord>,
    /// Failed input-integrity checks, as `name: message`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// An entity that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFailure {
    pub entity: EntityId,
    pub kind: String,
    pub message: String,
}

/// Outcome of a batch run, in target order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub reports: Vec<EntityReport>,
    pub failures: Vec<EntityFailure>,
}

impl BatchReport {
    pub fn n_entities(&self) -> usize {
        self.reports.len() + self.failures.len()
    }

    /// Mean skill score across scored entities.
    pub fn mean_skill_score(&self) -> Option<f64> {
        if self.reports.is_empty() {
            return None;
        }
        let total: f64 = self.reports.iter().map(|r| r.evaluation.skill_score).sum();
        Some(total / self.reports.len() as f64)
    }

    pub fn n_beating_naive(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.evaluation.beats_naive())
            .count()
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Batch Forecast Report\n\
             =====================\n\
             Entities: {} ({} scored, {} failed)\n",
            self.n_entities(),
            self.reports.len(),
            self.failures.len()
        );

        if let Some(mean) = self.mean_skill_score() {
            out.push_str(&format!(
                "Mean skill score: {:.2}% ({} of {} beat naive)\n",
                mean,
                self.n_beating_naive(),
                self.reports.len()
            ));
        }

        for report in &self.reports {
            let e = &report.evaluation;
            out.push_str(&format!(
                "  {:<8} n={:<4} HAR-RV RMSE {:.6}  naive RMSE {:.6}  skill {:>8.2}%\n",
                e.entity.as_str(),
                e.n_observations,
                e.model_rmse,
                e.naive_rmse,
                e.skill_score
            ));
        }

        for failure in &self.failures {
            out.push_str(&format!(
                "  {:<8} FAILED [{}] {}\n",
                failure.entity.as_str(),
                failure.kind,
                failure.message
            ));
        }

        out
    }
}
