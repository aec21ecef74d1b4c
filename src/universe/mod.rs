//! IPO universe and peer selection.

pub mod ipo;
pub mod peers;

pub use ipo::{IpoRecord, IpoUniverse, UNIVERSE_COLUMNS};
pub use peers::{
    PeerCriteria, PeerSelector, SectorSizePeerSelector, DEFAULT_N_PEERS,
    DEFAULT_REPORTING_LAG_DAYS,
};
