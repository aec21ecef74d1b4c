//! End-to-end walk-forward scenarios through the public API.

use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};

use ipo_vol_forecast::data::sample::{self, SampleConfig};
use ipo_vol_forecast::metrics::{rmse, skill_score};
use ipo_vol_forecast::walkforward::{align, forecast, forecast_naive};
use ipo_vol_forecast::{run_entity, EntityId, ForecastError, Metric, ObservationSeries};

const TARGET: [f64; 7] = [0.10, 0.12, 0.09, 0.15, 0.11, 0.13, 0.14];
const PEER: [f64; 7] = [0.08, 0.09, 0.10, 0.09, 0.10, 0.11, 0.12];

fn dates(n: usize) -> Vec<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    (0..n).map(|i| base + Duration::days(i as i64)).collect()
}

fn series(entity: &str, metric: Metric, values: &[f64]) -> ObservationSeries {
    ObservationSeries::from_parts(EntityId::from(entity), metric, &dates(values.len()), values)
        .unwrap()
}

fn pair(entity: &str, target: &[f64], peer: &[f64]) -> (ObservationSeries, ObservationSeries) {
    (
        series(entity, Metric::RealizedVol, target),
        series(entity, Metric::PeerAvgVol, peer),
    )
}

#[test]
fn test_seven_rows_window_three() {
    let (target, peer) = pair("RDDT", &TARGET, &PEER);
    let table = align(&target, &peer, 3).unwrap();
    assert_eq!(table.len(), 7);

    let model = forecast(&table, 3).unwrap();
    let naive = forecast_naive(&table, 3).unwrap();

    assert_eq!(model.len(), 4);
    assert_eq!(naive.len(), 4);

    let all_dates = dates(7);
    let expected: Vec<NaiveDate> = all_dates[3..].to_vec();
    assert_eq!(model.iter().map(|r| r.date).collect::<Vec<_>>(), expected);
    assert_eq!(naive.iter().map(|r| r.date).collect::<Vec<_>>(), expected);

    assert_eq!(naive[0].predicted, 0.09);
    assert_eq!(naive[0].actual, 0.15);

    let report = run_entity(&target, &peer, 3).unwrap();
    assert!(report.evaluation.model_rmse.is_finite());
    assert!(report.evaluation.naive_rmse.is_finite());
    assert!(report.evaluation.naive_rmse > 0.0);
}

#[test]
fn test_two_rows_window_six_is_insufficient() {
    let (target, peer) = pair("BIRK", &[0.10, 0.12], &[0.08, 0.09]);
    let err = run_entity(&target, &peer, 6).unwrap_err();

    match err {
        ForecastError::InsufficientData {
            entity,
            rows,
            required,
        } => {
            assert_eq!(entity.as_str(), "BIRK");
            assert_eq!(rows, 2);
            assert_eq!(required, 7);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_constant_target_has_degenerate_benchmark() {
    let (target, peer) = pair("KVYO", &[0.05; 10], &[0.08, 0.09, 0.10, 0.09, 0.10, 0.11, 0.12, 0.10, 0.09, 0.11]);
    let err = run_entity(&target, &peer, 3).unwrap_err();
    assert_eq!(
        err,
        ForecastError::DegenerateBenchmark {
            entity: EntityId::from("KVYO")
        }
    );
}

#[test]
fn test_naive_equals_previous_actual() {
    let (target, peer) = pair("ARM", &TARGET, &PEER);
    let table = align(&target, &peer, 2).unwrap();
    let naive = forecast_naive(&table, 2).unwrap();

    for (k, record) in naive.iter().enumerate() {
        assert_eq!(record.predicted, TARGET[k + 1]);
        assert_eq!(record.actual, TARGET[k + 2]);
    }
}

#[test]
fn test_forecasts_are_look_ahead_free() {
    let config = SampleConfig::default();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let (target, peer) = sample::generate(&EntityId::from("SYN"), start, end, &config).unwrap();

    let table = align(&target, &peer, 6).unwrap();
    let baseline = forecast(&table, 6).unwrap();

    // Perturb everything after the cutoff.
    let cutoff = 30;
    let bumped: Vec<f64> = target
        .points()
        .iter()
        .enumerate()
        .map(|(i, o)| if i > cutoff { o.value * 3.0 + 0.1 } else { o.value })
        .collect();
    let dates: Vec<NaiveDate> = target.points().iter().map(|o| o.date).collect();
    let bumped = ObservationSeries::from_parts(EntityId::from("SYN"), Metric::RealizedVol, &dates, &bumped)
        .unwrap();

    let table = align(&bumped, &peer, 6).unwrap();
    let perturbed = forecast(&table, 6).unwrap();

    let cutoff_date = dates[cutoff];
    for (a, b) in baseline.iter().zip(&perturbed) {
        if a.date <= cutoff_date {
            assert_eq!(a.predicted, b.predicted, "forecast on {} changed", a.date);
        }
    }
    assert!(baseline
        .iter()
        .zip(&perturbed)
        .any(|(a, b)| a.date > cutoff_date && a.predicted != b.predicted));
}

#[test]
fn test_sample_year_runs_end_to_end() {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let (target, peer) =
        sample::generate(&EntityId::from("SYN"), start, end, &SampleConfig::default()).unwrap();

    let report = run_entity(&target, &peer, 6).unwrap();
    assert_eq!(report.model_records.len(), 366 - 6);
    assert_eq!(report.evaluation.n_observations, 360);
    assert_eq!(report.evaluation.degraded_steps, 0);

    let recomputed = skill_score(
        &report.entity,
        rmse(&report.model_records).unwrap(),
        rmse(&report.naive_records).unwrap(),
    )
    .unwrap();
    assert_relative_eq!(recomputed, report.evaluation.skill_score, epsilon = 1e-12);
}
