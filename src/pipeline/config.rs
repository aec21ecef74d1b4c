//! Pipeline configuration loaded from TOML.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::universe::{PeerCriteria, DEFAULT_N_PEERS, DEFAULT_REPORTING_LAG_DAYS};
use crate::validation::{SeriesIntegrityValidator, MAX_ABS_RETURN, MAX_GAP_DAYS};
use crate::walkforward::{DEFAULT_WINDOW_SIZE, MIN_WINDOW_SIZE};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {field} = {value} (expected {expected})")]
    Invalid {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Configuration for a batch forecasting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rows in each walk-forward training window.
    pub window_size: usize,

    /// Peers averaged into the prior.
    pub n_peers: usize,

    /// GICS sector of the targets (45 = Information Technology).
    pub sector_code: i64,

    /// Days a peer's last report must precede the target's IPO.
    pub reporting_lag_days: i64,

    /// Targets are IPOs on or after this date; returns are loaded from here.
    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    /// Cap on the number of targets processed.
    pub max_targets: Option<usize>,

    /// Calendar gap between return dates above which integrity warns.
    pub max_gap_days: i64,

    /// Absolute daily return above which integrity warns.
    pub max_abs_return: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            n_peers: DEFAULT_N_PEERS,
            sector_code: 45,
            reporting_lag_days: DEFAULT_REPORTING_LAG_DAYS,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            max_targets: None,
            max_gap_days: MAX_GAP_DAYS,
            max_abs_return: MAX_ABS_RETURN,
        }
    }
}

impl PipelineConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: PipelineConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(ConfigError::Invalid {
                field: "window_size",
                value: self.window_size.to_string(),
                expected: "at least 2",
            });
        }

        if self.n_peers == 0 {
            return Err(ConfigError::Invalid {
                field: "n_peers",
                value: "0".to_string(),
                expected: "greater than 0",
            });
        }

        if self.reporting_lag_days < 0 {
            return Err(ConfigError::Invalid {
                field: "reporting_lag_days",
                value: self.reporting_lag_days.to_string(),
                expected: "non-negative",
            });
        }

        if self.start_date >= self.end_date {
            return Err(ConfigError::Invalid {
                field: "start_date",
                value: self.start_date.to_string(),
                expected: "before end_date",
            });
        }

        if self.max_gap_days < 1 {
            return Err(ConfigError::Invalid {
                field: "max_gap_days",
                value: self.max_gap_days.to_string(),
                expected: "at least 1",
            });
        }

        if !(self.max_abs_return.is_finite() && self.max_abs_return > 0.0) {
            return Err(ConfigError::Invalid {
                field: "max_abs_return",
                value: self.max_abs_return.to_string(),
                expected: "finite and positive",
            });
        }

        Ok(())
    }

    /// Integrity validator carrying this run's window and bounds.
    pub fn integrity_validator(&self) -> SeriesIntegrityValidator {
        SeriesIntegrityValidator::new(self.window_size)
            .with_max_gap_days(self.max_gap_days)
            .with_max_abs_return(self.max_abs_return)
    }

    pub fn peer_criteria(&self) -> PeerCriteria {
        PeerCriteria {
            n_peers: self.n_peers,
            reporting_lag_days: self.reporting_lag_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.window_size, 6);
        assert_eq!(config.n_peers, 10);
        assert_eq!(config.sector_code, 45);
        assert_eq!(config.reporting_lag_days, 45);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(config.max_gap_days, 7);
        assert_eq!(config.max_abs_return, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "window_size = 10\nmax_targets = 3").unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.window_size, 10);
        assert_eq!(config.max_targets, Some(3));
        assert_eq!(config.n_peers, 10);
        assert_eq!(config.max_gap_days, 7);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig {
            window_size: 8,
            max_targets: Some(5),
            ..PipelineConfig::default()
        };
        let text = config.to_toml().unwrap();
        let parsed: PipelineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let small_window = PipelineConfig {
            window_size: 1,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            small_window.validate(),
            Err(ConfigError::Invalid { field: "window_size", .. })
        ));

        let no_peers = PipelineConfig {
            n_peers: 0,
            ..PipelineConfig::default()
        };
        assert!(no_peers.validate().is_err());

        let reversed = PipelineConfig {
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            ..PipelineConfig::default()
        };
        assert!(reversed.validate().is_err());

        let no_gap = PipelineConfig {
            max_gap_days: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            no_gap.validate(),
            Err(ConfigError::Invalid { field: "max_gap_days", .. })
        ));

        let bad_bound = PipelineConfig {
            max_abs_return: f64::NAN,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            bad_bound.validate(),
            Err(ConfigError::Invalid { field: "max_abs_return", .. })
        ));
    }

    #[test]
    fn test_from_file_errors() {
        assert!(matches!(
            PipelineConfig::from_file("/nonexistent/config.toml"),
            Err(ConfigError::Read { .. })
        ));

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "window_size = \"six\"").unwrap();
        assert!(matches!(
            PipelineConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
