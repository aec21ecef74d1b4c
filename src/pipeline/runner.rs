//! Batch orchestration: peers, volatility, walk-forward and evaluation per
//! target, fanned out across entities with rayon.

use indicatif::ProgressBar;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{DataProvider, EntityId, ObservationSeries, ProviderError};
use crate::error::{ForecastError, ForecastResult};
use crate::metrics::Evaluator;
use crate::universe::PeerSelector;
use crate::volatility::{peer_average, realized_volatility};
use crate::walkforward::{align, BenchmarkGenerator, RollingForecaster};

use super::config::PipelineConfig;
use super::report::{BatchReport, EntityFailure, EntityReport};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("{0}: no eligible peers")]
    NoPeers(EntityId),

    #[error("{0}: no target returns in range")]
    NoTargetReturns(EntityId),

    #[error("{0}: none of the selected peers have returns in range")]
    NoPeerData(EntityId),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Provider(_) => "provider",
            Self::Forecast(e) => e.kind(),
            Self::NoPeers(_) => "no_peers",
            Self::NoTargetReturns(_) => "no_target_returns",
            Self::NoPeerData(_) => "no_peer_data",
        }
    }
}

/// Align, forecast, benchmark and evaluate one entity.
///
/// `target` and `peer` must describe the same entity; the entity id is taken
/// from `target`.
pub fn run_entity(
    target: &ObservationSeries,
    peer: &ObservationSeries,
    window_size: usize,
) -> ForecastResult<EntityReport> {
    let entity = target.entity().clone();

    let table = align(target, peer, window_size)?;
    let model_records = RollingForecaster::new(window_size)?.forecast(&table)?;
    let naive_records = BenchmarkGenerator::new(window_size)?.forecast(&table)?;
    let evaluation = Evaluator::evaluate(&entity, &model_records, &naive_records)?;

    Ok(EntityReport {
        entity,
        peers: Vec::new(),
        evaluation,
        model_records,
        naive_records,
        warnings: Vec::new(),
    })
}

/// Runs the full pipeline over a list of IPO targets.
pub struct BatchRunner<'a> {
    config: PipelineConfig,
    provider: &'a dyn DataProvider,
    selector: &'a dyn PeerSelector,
    progress: Option<ProgressBar>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        config: PipelineConfig,
        provider: &'a dyn DataProvider,
        selector: &'a dyn PeerSelector,
    ) -> Self {
        Self {
            config,
            provider,
            selector,
            progress: None,
        }
    }

    /// Tick `progress` once per finished entity.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every target. Failures are collected; nothing aborts the batch.
    pub fn run(&self, targets: &[String]) -> BatchReport {
        let targets = match self.config.max_targets {
            Some(max) if max < targets.len() => &targets[..max],
            _ => targets,
        };

        info!(
            "Running {} targets (window {}, up to {} peers)",
            targets.len(),
            self.config.window_size,
            self.config.n_peers
        );

        let outcomes: Vec<(EntityId, Result<EntityReport, PipelineError>)> = targets
            .par_iter()
            .map(|ticker| {
                let entity = EntityId::from(ticker.as_str());
                let outcome = self.run_target(&entity);
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                (entity, outcome)
            })
            .collect();

        let mut batch = BatchReport::default();
        for (entity, outcome) in outcomes {
            match outcome {
                Ok(report) => batch.reports.push(report),
                Err(e) => {
                    warn!("Skipping {}: {}", entity, e);
                    batch.failures.push(EntityFailure {
                        entity,
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Batch complete: {} scored, {} failed",
            batch.reports.len(),
            batch.failures.len()
        );

        batch
    }

    /// Fetch data for one target and score it.
    pub fn run_target(&self, entity: &EntityId) -> Result<EntityReport, PipelineError> {
        let peers = self.selector.select(entity.as_str());
        if peers.is_empty() {
            return Err(PipelineError::NoPeers(entity.clone()));
        }
        debug!("{}: peers {:?}", entity, peers);

        let (start, end) = (self.config.start_date, self.config.end_date);

        let target_returns = self
            .provider
            .returns(entity.as_str(), start, end)?
            .filter(|r| !r.is_empty())
            .ok_or_else(|| PipelineError::NoTargetReturns(entity.clone()))?;
        let target_rv = realized_volatility(entity, &target_returns)?;

        let mut peer_rv = Vec::with_capacity(peers.len());
        for peer in &peers {
            match self.provider.returns(peer, start, end) {
                Ok(Some(returns)) if !returns.is_empty() => {
                    peer_rv.push(realized_volatility(&EntityId::from(peer.as_str()), &returns)?);
                }
                Ok(_) => debug!("{}: peer {} has no returns", entity, peer),
                Err(e) => warn!("{}: dropping peer {}: {}", entity, peer, e),
            }
        }
        if peer_rv.is_empty() {
            return Err(PipelineError::NoPeerData(entity.clone()));
        }
        let peer_avg = peer_average(entity, &peer_rv)?;

        let integrity = self
            .config
            .integrity_validator()
            .validate(entity, &target_returns, &peer_rv);
        let warnings: Vec<String> = integrity
            .failed_checks()
            .iter()
            .map(|c| format!("{}: {}", c.name, c.message))
            .collect();
        if !warnings.is_empty() {
            warn!("{}", integrity.summary());
        }

        let mut report = run_entity(&target_rv, &peer_avg, self.config.window_size)?;
        report.peers = peers;
        report.warnings = warnings;

        debug!(
            "{}: skill {:.2}% over {} steps",
            entity, report.evaluation.skill_score, report.evaluation.n_observations
        );

        Ok(report)
    }
}
