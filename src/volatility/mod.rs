//! Volatility proxies derived from daily returns.

pub mod realized;

pub use realized::{peer_average, peer_coverage, realized_volatility};
