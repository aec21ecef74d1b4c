//! Validation of forecast inputs.
//!
//! Data integrity of each entity's return history and peer average
//! (length, continuity, value ranges, overlap).

pub mod series_integrity;

pub use series_integrity::{
    CheckResult, SeriesIntegrityReport, SeriesIntegrityValidator, MAX_ABS_RETURN, MAX_GAP_DAYS,
};
