//! Historical peer selection for IPO targets.
//!
//! A peer is a company in the target's GICS sector that listed before the
//! target and whose latest quarterly report was public well before the
//! target's IPO. Peers are ranked by closeness in market value.

use std::collections::HashSet;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ipo::{IpoRecord, IpoUniverse};

/// Default number of peers per target.
pub const DEFAULT_N_PEERS: usize = 10;

/// Default gap between a peer's report date and the target's IPO.
pub const DEFAULT_REPORTING_LAG_DAYS: i64 = 45;

/// Chooses the peer group whose volatility informs a target's forecast.
pub trait PeerSelector: Send + Sync {
    /// Peer tickers for `target`, best match first. Empty when the target is
    /// unknown or has no eligible peers.
    fn select(&self, target: &str) -> Vec<String>;
}

/// Peer selection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerCriteria {
    pub n_peers: usize,
    pub reporting_lag_days: i64,
}

impl Default for PeerCriteria {
    fn default() -> Self {
        Self {
            n_peers: DEFAULT_N_PEERS,
            reporting_lag_days: DEFAULT_REPORTING_LAG_DAYS,
        }
    }
}

/// Same-sector, size-matched peer selection over an [`IpoUniverse`].
pub struct SectorSizePeerSelector {
    universe: IpoUniverse,
    criteria: PeerCriteria,
}

impl SectorSizePeerSelector {
    pub fn new(universe: IpoUniverse, criteria: PeerCriteria) -> Self {
        Self { universe, criteria }
    }

    pub fn universe(&self) -> &IpoUniverse {
        &self.universe
    }

    pub fn criteria(&self) -> PeerCriteria {
        self.criteria
    }

    fn is_eligible(&self, target: &IpoRecord, candidate: &IpoRecord) -> bool {
        let cutoff = target.ipo_date - Duration::days(self.criteria.reporting_lag_days);
        candidate.ticker != target.ticker
            && candidate.sector.is_some()
            && candidate.sector == target.sector
            && candidate.ipo_date < target.ipo_date
            && candidate.report_date.is_some_and(|rdq| rdq < cutoff)
    }
}

/// Absolute market-value distance; unknown values rank last.
fn size_distance(target: &IpoRecord, candidate: &IpoRecord) -> f64 {
    match (target.market_value, candidate.market_value) {
        (Some(t), Some(c)) => (c - t).abs(),
        _ => f64::INFINITY,
    }
}

impl PeerSelector for SectorSizePeerSelector {
    fn select(&self, target: &str) -> Vec<String> {
        let Some(target_row) = self.universe.find(target) else {
            debug!("{} not in IPO universe", target);
            return Vec::new();
        };

        let mut candidates: Vec<(&IpoRecord, f64)> = self
            .universe
            .records()
            .iter()
            .filter(|c| self.is_eligible(target_row, c))
            .map(|c| (c, size_distance(target_row, c)))
            .collect();

        // Stable sort keeps file order among equal distances.
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut seen = HashSet::new();
        let peers: Vec<String> = candidates
            .into_iter()
            .filter(|(c, _)| seen.insert(c.ticker.clone()))
            .map(|(c, _)| c.ticker.clone())
            .take(self.criteria.n_peers)
            .collect();

        debug!("{}: selected {} peers", target, peers.len());
        peers
    }
}
