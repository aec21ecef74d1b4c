pub mod loader;
pub mod provider;
pub mod sample;
pub mod types;

pub use loader::{CsvReturnsProvider, LoaderError, ReturnsLoader, RETURN_COLUMNS};
pub use provider::{clean_ticker, DataProvider, InMemoryProvider, ProviderError};
pub use sample::SampleConfig;
pub use types::{EntityId, Metric, Observation, ObservationSeries, ReturnSeries};
