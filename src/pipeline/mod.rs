//! End-to-end forecasting pipeline.
//!
//! For each IPO target: select peers, build realized volatility for the
//! target and the peer average, run the walk-forward HAR-RV and naive
//! forecasts, then score them. Entities run in parallel and fail
//! independently.

pub mod config;
pub mod report;
pub mod runner;

pub use config::{ConfigError, PipelineConfig};
pub use report::{BatchReport, EntityFailure, EntityReport};
pub use runner::{run_entity, BatchRunner, PipelineError};
