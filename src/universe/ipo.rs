//! IPO universe loaded from a Compustat-style fundamentals extract.
//!
//! Expected columns:
//! - tic: ticker symbol
//! - ipodate: IPO date (rows without one are excluded)
//! - rdq: report date of the quarterly filing
//! - datadate: fiscal period end
//! - gsector: GICS sector code
//! - mkvaltq: quarterly market value

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::loader::{f64_values, parse_date, read_csv, require_columns, string_values};
use crate::data::LoaderError;

/// Expected columns in the universe file.
pub const UNIVERSE_COLUMNS: &[&str] = &["tic", "ipodate", "rdq", "datadate", "gsector", "mkvaltq"];

/// One fundamentals row for a company that has an IPO date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpoRecord {
    pub ticker: String,
    pub ipo_date: NaiveDate,
    pub report_date: Option<NaiveDate>,
    pub data_date: Option<NaiveDate>,
    pub sector: Option<i64>,
    pub market_value: Option<f64>,
}

/// All IPO rows, in file order.
#[derive(Debug, Clone, Default)]
pub struct IpoUniverse {
    records: Vec<IpoRecord>,
}

impl IpoUniverse {
    pub fn new(records: Vec<IpoRecord>) -> Self {
        Self { records }
    }

    /// Load the universe from CSV, dropping rows without a parseable IPO date.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, LoaderError> {
        let path = path.as_ref();
        let df = read_csv(path)?;
        require_columns(&df, UNIVERSE_COLUMNS)?;

        let tickers = string_values(&df, "tic")?;
        let ipo_dates = string_values(&df, "ipodate")?;
        let report_dates = string_values(&df, "rdq")?;
        let data_dates = string_values(&df, "datadate")?;
        let sectors = f64_values(&df, "gsector")?;
        let market_values = f64_values(&df, "mkvaltq")?;

        let mut records = Vec::with_capacity(df.height());
        let mut skipped = 0usize;

        for i in 0..df.height() {
            let ticker = match tickers[i].as_deref() {
                Some(t) if !t.is_empty() => t.to_string(),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let Some(ipo_date) = ipo_dates[i].as_deref().and_then(parse_date) else {
                skipped += 1;
                continue;
            };

            records.push(IpoRecord {
                ticker,
                ipo_date,
                report_date: report_dates[i].as_deref().and_then(parse_date),
                data_date: data_dates[i].as_deref().and_then(parse_date),
                sector: sectors[i].filter(|s| s.is_finite()).map(|s| s.round() as i64),
                market_value: market_values[i].filter(|v| v.is_finite()),
            });
        }

        debug!(
            "Skipped {} universe rows without ticker or IPO date",
            skipped
        );
        info!(
            "Loaded {} IPO rows from {}",
            records.len(),
            path.display()
        );

        Ok(Self { records })
    }

    pub fn records(&self) -> &[IpoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First row for `ticker`.
    pub fn find(&self, ticker: &str) -> Option<&IpoRecord> {
        self.records.iter().find(|r| r.ticker == ticker)
    }

    /// Unique tickers in `sector` that listed on or after `start_date`.
    pub fn target_list(&self, sector: i64, start_date: NaiveDate) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| r.sector == Some(sector) && r.ipo_date >= start_date)
            .filter(|r| seen.insert(r.ticker.clone()))
            .map(|r| r.ticker.clone())
            .collect()
    }
}
