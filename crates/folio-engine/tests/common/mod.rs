//! Test doubles for the simulation and allocation services.

#![allow(dead_code)]

use async_trait::async_trait;
use folio_client::{
    ensure_allocatable, AllocationService, ClientError, ClientResult, SimulationService,
};
use folio_core::{
    Allocation, EngineSettings, PriceMatrix, SimulationParameters, StrategyKey, WeightVector,
};
use folio_engine::PortfolioEngine;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Simulation service returning a deterministic `samples x (size + 1)` matrix.
#[derive(Default)]
pub struct FakeSimulation {
    calls: AtomicUsize,
    failing: AtomicBool,
    /// Artificial latency per requested sample, so larger requests finish later.
    delay_per_sample: Option<Duration>,
}

impl FakeSimulation {
    pub fn with_delay_per_sample(delay: Duration) -> Self {
        Self {
            delay_per_sample: Some(delay),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

pub fn price_rows(params: &SimulationParameters) -> Vec<Vec<f64>> {
    let (rows, columns) = params.expected_shape();
    (0..rows)
        .map(|i| {
            (0..columns)
                .map(|t| {
                    let drift = 1.0 + params.mu * t as f64;
                    let spread = 1.0 + 0.002 * i as f64 * t as f64;
                    params.starting_value * drift * spread
                })
                .collect()
        })
        .collect()
}

#[async_trait]
impl SimulationService for FakeSimulation {
    async fn fetch_simulation(&self, params: &SimulationParameters) -> ClientResult<PriceMatrix> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay_per_sample {
            tokio::time::sleep(delay * params.samples).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Service {
                status: 500,
                message: "simulation unavailable".to_string(),
            });
        }
        Ok(PriceMatrix::from_rows(price_rows(params))?)
    }
}

/// Allocation service with deterministic weights per strategy and
/// per-strategy failure and latency switches.
#[derive(Default)]
pub struct FakeAllocation {
    calls: AtomicUsize,
    failing: Mutex<HashSet<StrategyKey>>,
    delays: Mutex<HashMap<StrategyKey, Duration>>,
}

impl FakeAllocation {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail(&self, strategy: StrategyKey) {
        self.failing.lock().unwrap().insert(strategy);
    }

    pub fn recover(&self, strategy: &StrategyKey) {
        self.failing.lock().unwrap().remove(strategy);
    }

    pub fn delay(&self, strategy: StrategyKey, delay: Duration) {
        self.delays.lock().unwrap().insert(strategy, delay);
    }
}

/// Weights the fake service hands out for a strategy over `n` assets.
pub fn weights_for(strategy: &StrategyKey, n: usize) -> WeightVector {
    let raw: Vec<f64> = match strategy {
        StrategyKey::MeanVariance => (0..n).map(|i| (i + 1) as f64).collect(),
        StrategyKey::HierarchicalRiskParity => (0..n).map(|i| 1.0 / (i + 1) as f64).collect(),
        _ => return WeightVector::equal(n),
    };
    let total: f64 = raw.iter().sum();
    WeightVector::new(raw.into_iter().map(|w| w / total).collect())
}

#[async_trait]
impl AllocationService for FakeAllocation {
    async fn fetch_allocation(
        &self,
        prices: &PriceMatrix,
        strategy: &StrategyKey,
    ) -> ClientResult<Allocation> {
        ensure_allocatable(prices)?;
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(strategy).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(strategy) {
            return Err(ClientError::Transport("connection reset".to_string()));
        }

        let weights = weights_for(strategy, prices.num_assets());
        Ok(Allocation {
            strategy: strategy.clone(),
            reported_sum: weights.sum(),
            weights,
        })
    }
}

pub fn settings() -> EngineSettings {
    EngineSettings {
        color_seed: Some(42),
        ..Default::default()
    }
}

pub fn build_engine(
    simulation: Arc<FakeSimulation>,
    allocation: Arc<FakeAllocation>,
    settings: EngineSettings,
) -> Arc<PortfolioEngine> {
    Arc::new(PortfolioEngine::new(simulation, allocation, settings))
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-6 * expected.abs().max(1.0),
        "{actual} != {expected}"
    );
}
