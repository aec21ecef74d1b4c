//! Synthetic realized-volatility data for demos and smoke tests.
//!
//! Draws exponential noise (always positive, occasional spikes) and smooths it
//! with an AR(1)-style blend to mimic volatility clustering.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};

use crate::error::ForecastResult;

use super::types::{EntityId, Metric, ObservationSeries};

/// Parameters of the synthetic generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Mean of the target's raw exponential draws.
    pub target_mean: f64,
    /// Mean of the peer average's raw exponential draws.
    pub peer_mean: f64,
    /// Weight on the previous smoothed value.
    pub persistence: f64,
    /// RNG seed.
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            target_mean: 0.02,
            peer_mean: 0.018,
            persistence: 0.7,
            seed: 42,
        }
    }
}

/// Generate a (target, peer average) series pair, one value per calendar day
/// in `[start, end]`.
pub fn generate(
    entity: &EntityId,
    start: NaiveDate,
    end: NaiveDate,
    config: &SampleConfig,
) -> ForecastResult<(ObservationSeries, ObservationSeries)> {
    let days = (end - start).num_days().max(-1) + 1;
    let dates: Vec<NaiveDate> = (0..days).map(|i| start + Duration::days(i)).collect();

    let mut rng = StdRng::seed_from_u64(config.seed);
    let target = clustered_draws(&mut rng, dates.len(), config.target_mean, config.persistence);
    let peer = clustered_draws(&mut rng, dates.len(), config.peer_mean, config.persistence);

    let target = ObservationSeries::from_parts(entity.clone(), Metric::RealizedVol, &dates, &target)?;
    let peer = ObservationSeries::from_parts(entity.clone(), Metric::PeerAvgVol, &dates, &peer)?;

    Ok((target, peer))
}

fn clustered_draws(rng: &mut StdRng, n: usize, mean: f64, persistence: f64) -> Vec<f64> {
    let mean = if mean > 0.0 { mean } else { f64::MIN_POSITIVE };
    // Exp::new only fails for a negative rate.
    let exp = match Exp::new(1.0 / mean) {
        Ok(exp) => exp,
        Err(_) => return vec![0.0; n],
    };

    let mut values: Vec<f64> = (0..n).map(|_| exp.sample(&mut *rng)).collect();
    for i in 2..n {
        values[i] = persistence * values[i - 1] + (1.0 - persistence) * values[i];
    }
    values
}
