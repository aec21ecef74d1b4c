//! Naive random-walk benchmark.
//!
//! Predicts each period with the previous period's observed value, over the
//! same windows the HAR-RV forecaster uses.

use crate::error::ForecastResult;

use super::aligner::{check_window, AlignedTable};
use super::record::{ForecastRecord, ModelKind};

/// No-drift random-walk forecaster.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkGenerator {
    window_size: usize,
}

impl BenchmarkGenerator {
    pub fn new(window_size: usize) -> ForecastResult<Self> {
        check_window(window_size)?;
        Ok(Self { window_size })
    }

    pub fn forecast(&self, table: &AlignedTable) -> ForecastResult<Vec<ForecastRecord>> {
        let rows = table.rows();
        Ok(table
            .windows(self.window_size)?
            .iter()
            .map(|w| {
                let current = rows[w.target];
                let previous = rows[w.target - 1];
                ForecastRecord::new(
                    current.date,
                    previous.target_rv,
                    current.target_rv,
                    ModelKind::Naive,
                )
            })
            .collect())
    }
}

/// Naive forecasts aligned with [`crate::walkforward::forecast`].
pub fn forecast_naive(
    table: &AlignedTable,
    window_size: usize,
) -> ForecastResult<Vec<ForecastRecord>> {
    BenchmarkGenerator::new(window_size)?.forecast(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EntityId;
    use crate::walkforward::aligner::AlignedRow;
    use crate::walkforward::forecaster::forecast;
    use chrono::{Duration, NaiveDate};

    fn table(values: &[f64]) -> AlignedTable {
        let base = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, &v)| AlignedRow::new(base + Duration::days(i as i64), v, v / 2.0))
            .collect();
        AlignedTable::new(EntityId::from("BIRK"), rows).unwrap()
    }

    #[test]
    fn test_naive_uses_previous_actual() {
        let t = table(&[0.10, 0.12, 0.09, 0.15, 0.11, 0.13, 0.14]);
        let records = forecast_naive(&t, 3).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].predicted, 0.09);
        for (k, record) in records.iter().enumerate() {
            let i = k + 3;
            assert_eq!(record.predicted, t.rows()[i - 1].target_rv);
            assert_eq!(record.actual, t.rows()[i].target_rv);
            assert_eq!(record.model, ModelKind::Naive);
            assert!(record.diagnostic.is_none());
        }
    }

    #[test]
    fn test_naive_matches_model_dates() {
        let values: Vec<f64> = (0..25).map(|i| 0.01 + 0.001 * (i % 7) as f64).collect();
        let t = table(&values);

        let naive = forecast_naive(&t, 6).unwrap();
        let model = forecast(&t, 6).unwrap();

        assert_eq!(naive.len(), model.len());
        assert!(naive.iter().zip(&model).all(|(a, b)| a.date == b.date));
    }

    #[test]
    fn test_naive_insufficient_rows() {
        let t = table(&[0.1, 0.2]);
        assert!(forecast_naive(&t, 6).is_err());
    }
}
