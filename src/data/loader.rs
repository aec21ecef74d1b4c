//! CSV loaders for daily return data.
//!
//! The returns file holds one row per ticker and trading day:
//! - ticker: symbol as traded (share-class suffixes are stripped on lookup)
//! - date: trade date (`%Y-%m-%d`, `%Y%m%d` or `%m/%d/%Y`)
//! - ret: simple daily return, blank when missing
//!
//! Files are read once with polars and split into per-ticker series.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use super::provider::{clean_ticker, DataProvider, ProviderError};
use super::types::{Observation, ReturnSeries};

/// Expected columns in the returns file.
pub const RETURN_COLUMNS: &[&str] = &["ticker", "date", "ret"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a headered CSV file into a DataFrame.
pub fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.display().to_string()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df)
}

/// Fail unless every column in `expected` is present.
pub fn require_columns(df: &DataFrame, expected: &[&str]) -> Result<(), LoaderError> {
    let columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|c| !columns.iter().any(|have| have == c))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoaderError::InvalidData(format!(
            "Missing columns: {:?}",
            missing
        )))
    }
}

/// Column values as optional strings, whatever the inferred dtype.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, LoaderError> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()))
        .collect())
}

/// Column values as optional floats, whatever the inferred dtype.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, LoaderError> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Parse a date in any of the accepted formats.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // Timestamps such as "2024-01-02 00:00:00" keep only the date part.
    let s = s.split_whitespace().next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Loader for returns CSV files.
pub struct ReturnsLoader {
    path: String,
}

impl ReturnsLoader {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }

    /// Load every ticker in the file, keyed by cleaned ticker.
    ///
    /// Rows with a missing ticker, unparseable date, or missing/non-finite
    /// return are dropped.
    pub fn load_all(&self) -> Result<HashMap<String, ReturnSeries>, LoaderError> {
        let df = read_csv(Path::new(&self.path))?;
        require_columns(&df, RETURN_COLUMNS)?;

        let tickers = string_values(&df, "ticker")?;
        let dates = string_values(&df, "date")?;
        let rets = f64_values(&df, "ret")?;

        let mut grouped: HashMap<String, Vec<Observation>> = HashMap::new();
        let mut dropped = 0usize;

        for ((ticker, date), ret) in tickers.into_iter().zip(dates).zip(rets) {
            let parsed = match (ticker, date.as_deref().and_then(parse_date), ret) {
                (Some(t), Some(d), Some(r)) if !t.is_empty() && r.is_finite() => Some((t, d, r)),
                _ => None,
            };

            match parsed {
                Some((ticker, date, ret)) => grouped
                    .entry(clean_ticker(&ticker).to_string())
                    .or_default()
                    .push(Observation::new(date, ret)),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!("Dropped {} incomplete rows from {}", dropped, self.path);
        }

        let series: HashMap<String, ReturnSeries> = grouped
            .into_iter()
            .map(|(ticker, points)| {
                let series = ReturnSeries::new(ticker.clone(), points);
                (ticker, series)
            })
            .collect();

        info!("Loaded returns for {} tickers from {}", series.len(), self.path);

        Ok(series)
    }
}

/// File-backed provider: loads the returns file once and serves slices of it.
pub struct CsvReturnsProvider {
    series: HashMap<String, ReturnSeries>,
}

impl CsvReturnsProvider {
    pub fn open(path: &str) -> Result<Self, LoaderError> {
        let series = ReturnsLoader::new(path).load_all()?;
        Ok(Self { series })
    }

    pub fn ticker_count(&self) -> usize {
        self.series.len()
    }
}

impl DataProvider for CsvReturnsProvider {
    fn returns(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<ReturnSeries>, ProviderError> {
        Ok(self
            .series
            .get(clean_ticker(ticker))
            .map(|s| s.between(start, end))
            .filter(|s| !s.is_empty()))
    }
}
