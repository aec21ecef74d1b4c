//! Data provider seam.
//!
//! The forecasting core never opens connections or reads files. Return series
//! are handed over by a `DataProvider`, which may be file-backed
//! ([`crate::data::CsvReturnsProvider`]) or in-memory.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use super::loader::LoaderError;
use super::types::ReturnSeries;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    /// The backing source could not be reached. A target fetch failing this
    /// way fails the target; a peer fetch only drops that peer.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Source of daily return series.
pub trait DataProvider: Send + Sync {
    /// Daily returns for `ticker` within `[start, end]`.
    ///
    /// `Ok(None)` means the provider knows nothing about the ticker; this is
    /// not an error, peers with no data are simply left out.
    fn returns(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<ReturnSeries>, ProviderError>;
}

/// Strip share-class suffixes such as `BRK.B` -> `BRK`.
pub fn clean_ticker(ticker: &str) -> &str {
    ticker.split('.').next().unwrap_or(ticker).trim()
}

/// Provider over return series already held in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProvider {
    series: HashMap<String, ReturnSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: ReturnSeries) {
        self.series
            .insert(clean_ticker(&series.ticker).to_string(), series);
    }

    pub fn with_series(mut self, series: ReturnSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<_> = self.series.keys().cloned().collect();
        tickers.sort();
        tickers
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl DataProvider for InMemoryProvider {
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
