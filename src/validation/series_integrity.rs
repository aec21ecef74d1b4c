//! Integrity checks on the inputs of one entity's forecast.
//!
//! Validates:
//! - History length (enough rows for at least one walk-forward step)
//! - Date continuity (no gaps longer than a week)
//! - Return magnitude (no daily move beyond a sanity bound)
//! - Peer coverage (target dates that also carry peer data, and how many
//!   peers back them)
//!
//! Failures are advisory: the pipeline logs them and still runs the entity.

use serde::Serialize;

use crate::data::{EntityId, ObservationSeries, ReturnSeries};
use crate::volatility::peer_coverage;

/// Largest calendar gap between consecutive observations before it is flagged.
pub const MAX_GAP_DAYS: i64 = 7;

/// Daily absolute return above which a row is considered suspicious.
pub const MAX_ABS_RETURN: f64 = 1.0;

/// Result of a single validation check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Integrity report for one entity.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesIntegrityReport {
    pub entity: EntityId,
    pub row_count: usize,
    pub checks: Vec<CheckResult>,
}

impl SeriesIntegrityReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        format!(
            "{} ({} rows): {}/{} checks passed",
            self.entity,
            self.row_count,
            passed,
            self.checks.len()
        )
    }
}

/// Validator for target returns and the peer series behind its average.
pub struct SeriesIntegrityValidator {
    window_size: usize,
    max_gap_days: i64,
    max_abs_return: f64,
}

impl SeriesIntegrityValidator {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            max_gap_days: MAX_GAP_DAYS,
            max_abs_return: MAX_ABS_RETURN,
        }
    }

    pub fn with_max_gap_days(mut self, days: i64) -> Self {
        self.max_gap_days = days;
        self
    }

    pub fn with_max_abs_return(mut self, bound: f64) -> Self {
        self.max_abs_return = bound;
        self
    }

    /// Run all checks. `peers` are the individual peer RV series behind the
    /// peer average.
    pub fn validate(
        &self,
        entity: &EntityId,
        returns: &ReturnSeries,
        peers: &[ObservationSeries],
    ) -> SeriesIntegrityReport {
        let checks = vec![
            self.check_history_length(returns),
            self.check_date_continuity(returns),
            self.check_return_magnitude(returns),
            self.check_peer_coverage(returns, peers),
        ];

        SeriesIntegrityReport {
            entity: entity.clone(),
            row_count: returns.len(),
            checks,
        }
    }

    fn check_history_length(&self, returns: &ReturnSeries) -> CheckResult {
        let required = self.window_size + 1;
        if returns.len() >= required {
            CheckResult::pass(
                "history_length",
                &format!("{} rows (need {})", returns.len(), required),
            )
        } else {
            CheckResult::fail(
                "history_length",
                &format!("Only {} rows, need {}", returns.len(), required),
                None,
            )
        }
    }

    fn check_date_continuity(&self, returns: &ReturnSeries) -> CheckResult {
        if returns.is_empty() {
            return CheckResult::fail("date_continuity", "No dates found", None);
        }

        let gaps: Vec<String> = returns
            .points
            .windows(2)
            .filter_map(|w| {
                let gap_days = (w[1].date - w[0].date).num_days();
                (gap_days > self.max_gap_days)
                    .then(|| format!("{} to {} ({} days)", w[0].date, w[1].date, gap_days))
            })
            .collect();

        if gaps.is_empty() {
            CheckResult::pass(
                "date_continuity",
                &format!("{} dates, no major gaps", returns.len()),
            )
        } else {
            CheckResult::fail(
                "date_continuity",
                &format!("{} major gaps found", gaps.len()),
                Some(gaps.join(", ")),
            )
        }
    }

    fn check_return_magnitude(&self, returns: &ReturnSeries) -> CheckResult {
        let extreme: Vec<String> = returns
            .points
            .iter()
            .filter(|o| o.value.abs() > self.max_abs_return)
            .take(5)
            .map(|o| format!("{}: {:.4}", o.date, o.value))
            .collect();

        if extreme.is_empty() {
            CheckResult::pass(
                "return_magnitude",
                &format!("All returns within +/-{}", self.max_abs_return),
            )
        } else {
            CheckResult::fail(
                "return_magnitude",
                "Returns beyond sanity bound",
                Some(extreme.join(", ")),
            )
        }
    }

    fn check_peer_coverage(&self, returns: &ReturnSeries, peers: &[ObservationSeries]) -> CheckResult {
        let coverage = peer_coverage(peers);
        let counts: Vec<usize> = returns
            .points
            .iter()
            .filter_map(|o| coverage.get(&o.date).copied())
            .collect();
        let covered = counts.len();
        let required = self.window_size + 1;

        if covered >= required {
            let mean_peers = counts.iter().sum::<usize>() as f64 / covered as f64;
            CheckResult::pass(
                "peer_coverage",
                &format!(
                    "{}/{} target dates have peer data ({:.1} peers per date)",
                    covered,
                    returns.len(),
                    mean_peers
                ),
            )
        } else {
            CheckResult::fail(
                "peer_coverage",
                &format!("Only {} overlapping dates, need {}", covered, required),
                None,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Metric, Observation};
    use chrono::{Duration, NaiveDate};

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn returns(offsets: &[i64], value: f64) -> ReturnSeries {
        ReturnSeries::new(
            "RDDT",
            offsets
                .iter()
                .map(|&o| Observation::new(base() + Duration::days(o), value))
                .collect(),
        )
    }

    fn peer(ticker: &str, offsets: &[i64]) -> ObservationSeries {
        ObservationSeries::new(
            EntityId::from(ticker),
            Metric::RealizedVol,
            offsets
                .iter()
                .map(|&o| Observation::new(base() + Duration::days(o), 0.02))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_clean_inputs_pass() {
        let offsets: Vec<i64> = (0..10).collect();
        let validator = SeriesIntegrityValidator::new(6);
        let report = validator.validate(&EntityId::from("RDDT"), &returns(&offsets, 0.01), &[peer("COIN", &offsets)]);

        assert!(report.all_passed(), "{:?}", report.failed_checks());
        assert_eq!(report.row_count, 10);
        assert!(report.summary().contains("4/4"));
    }

    #[test]
    fn test_gap_flagged() {
        let offsets = [0, 1, 2, 12, 13, 14, 15, 16];
        let validator = SeriesIntegrityValidator::new(3);
        let report = validator.validate(&EntityId::from("RDDT"), &returns(&offsets, 0.01), &[peer("COIN", &offsets)]);

        let failed = report.failed_checks();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "date_continuity");
        assert!(failed[0].details.as_deref().unwrap_or("").contains("10 days"));
    }

    #[test]
    fn test_short_history_and_low_coverage() {
        let validator = SeriesIntegrityValidator::new(6);
        let report = validator.validate(&EntityId::from("RDDT"), &returns(&[0, 1], 0.01), &[peer("COIN", &[5])]);

        let names: Vec<&str> = report.failed_checks().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["history_length", "peer_coverage"]);
    }

    #[test]
    fn test_extreme_returns_flagged() {
        let offsets: Vec<i64> = (0..5).collect();
        let validator = SeriesIntegrityValidator::new(2).with_max_abs_return(0.5);
        let report = validator.validate(&EntityId::from("RDDT"), &returns(&offsets, 0.8), &[peer("COIN", &offsets)]);

        assert!(!report.all_passed());
        assert_eq!(report.failed_checks()[0].name, "return_magnitude");
    }

    #[test]
    fn test_peer_coverage_counts_contributing_peers() {
        let offsets: Vec<i64> = (0..6).collect();
        let peers = vec![peer("COIN", &[0, 1, 2]), peer("HOOD", &[2, 3, 4, 5]), peer("SOFI", &[2, 5])];
        let validator = SeriesIntegrityValidator::new(4);
        let report = validator.validate(&EntityId::from("RDDT"), &returns(&offsets, 0.01), &peers);

        assert!(report.all_passed(), "{:?}", report.failed_checks());
        let coverage = report.checks.iter().find(|c| c.name == "peer_coverage").unwrap();
        // 9 peer observations over 6 covered dates
        assert!(coverage.message.contains("6/6"));
        assert!(coverage.message.contains("1.5 peers per date"));

        let sparse = validator.validate(&EntityId::from("RDDT"), &returns(&offsets, 0.01), &peers[..1]);
        assert_eq!(sparse.failed_checks()[0].name, "peer_coverage");
        assert!(sparse.failed_checks()[0].message.contains("Only 3"));

        let none = validator.validate(&EntityId::from("RDDT"), &returns(&offsets, 0.01), &[]);
        assert_eq!(none.failed_checks()[0].name, "peer_coverage");
    }

    #[test]
    fn test_gap_bound_is_configurable() {
        let offsets = [0, 1, 2, 6, 7, 8];
        let peers = [peer("COIN", &offsets)];
        let strict = SeriesIntegrityValidator::new(3).with_max_gap_days(3);
        let report = strict.validate(&EntityId::from("RDDT"), &returns(&offsets, 0.01), &peers);
        assert_eq!(report.failed_checks()[0].name, "date_continuity");

        let default = SeriesIntegrityValidator::new(3);
        assert!(default
            .validate(&EntityId::from("RDDT"), &returns(&offsets, 0.01), &peers)
            .all_passed());
    }
}
