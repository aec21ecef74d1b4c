pub mod data;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod universe;
pub mod validation;
pub mod volatility;
pub mod walkforward;

// Re-export commonly used types
pub use data::{DataProvider, EntityId, Metric, Observation, ObservationSeries, ReturnSeries};
pub use error::{ForecastError, ForecastResult};
pub use metrics::{evaluate, EvaluationResult, Evaluator};
pub use pipeline::{run_entity, BatchReport, BatchRunner, EntityReport, PipelineConfig};
pub use universe::{IpoUniverse, PeerSelector, SectorSizePeerSelector};
pub use validation::{SeriesIntegrityReport, SeriesIntegrityValidator};
pub use walkforward::{
    align, forecast, forecast_naive, AlignedTable, BenchmarkGenerator, FitDiagnostic,
    ForecastRecord, ModelKind, RollingForecaster,
};
