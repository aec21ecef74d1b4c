//! Errors raised by the forecasting core.
//!
//! Every variant carries the entity identifier so that orchestration can log
//! the failure and move on to the next entity.

use thiserror::Error;

use crate::data::EntityId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("{entity}: insufficient aligned data ({rows} rows, need at least {required})")]
    InsufficientData {
        entity: EntityId,
        rows: usize,
        required: usize,
    },

    #[error("{entity}: model and benchmark forecasts are misaligned: {detail}")]
    MisalignedForecasts { entity: EntityId, detail: String },

    #[error("{entity}: naive benchmark RMSE is zero, skill score undefined")]
    DegenerateBenchmark { entity: EntityId },

    #[error("{entity}: invalid observation series: {detail}")]
    InvalidSeries { entity: EntityId, detail: String },

    #[error("invalid window size {0}, must be at least 2")]
    InvalidWindow(usize),
}

impl ForecastError {
    /// Entity the failure belongs to, if any.
    pub fn entity(&self) -> Option<&EntityId> {
        match self {
            Self::InsufficientData { entity, .. }
            | Self::MisalignedForecasts { entity, .. }
            | Self::DegenerateBenchmark { entity }
            | Self::InvalidSeries { entity, .. } => Some(entity),
            Self::InvalidWindow(_) => None,
        }
    }

    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::MisalignedForecasts { .. } => "misaligned_forecasts",
            Self::DegenerateBenchmark { .. } => "degenerate_benchmark",
            Self::InvalidSeries { .. } => "invalid_series",
            Self::InvalidWindow(_) => "invalid_window",
        }
    }
}

pub type ForecastResult<T> = Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_entity() {
        let err = ForecastError::InsufficientData {
            entity: EntityId::from("RDDT"),
            rows: 2,
            required: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("RDDT"));
        assert!(msg.contains("2 rows"));
        assert_eq!(err.kind(), "insufficient_data");
        assert_eq!(err.entity().map(|e| e.as_str()), Some("RDDT"));
    }

    #[test]
    fn test_invalid_window_has_no_entity() {
        let err = ForecastError::InvalidWindow(1);
        assert!(err.entity().is_none());
    }
}
