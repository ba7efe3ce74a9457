//! 전략 비교 (한 번 실행).

use anyhow::{bail, Result};
use folio_client::ServiceClient;
use folio_core::{AppConfig, StrategyKey};
use folio_engine::{AllocateOutcome, PortfolioEngine, RefreshOutcome, ResyncOutcome};
use std::sync::Arc;
use tracing::{info, warn};

use crate::commands::args::SimulationArgs;
use crate::render::{format_parameters, render_registry, OutputFormat};

/// 시뮬레이션을 받고 전략마다 자산배분한 뒤 레지스트리를 출력합니다.
pub async fn explore(
    config: &AppConfig,
    args: &SimulationArgs,
    strategies: &[StrategyKey],
    format: OutputFormat,
) -> Result<String> {
    let client = ServiceClient::new(&config.service)?;
    let engine = PortfolioEngine::with_service(Arc::new(client), config.engine.clone());

    let update = args.to_update();
    let outcome = if update.is_empty() {
        engine.refresh().await
    } else {
        engine.update_parameters(update).await
    };
    match outcome {
        RefreshOutcome::Committed(ResyncOutcome::Applied(_)) => {}
        RefreshOutcome::Failed { error, .. } => bail!("Simulation request failed: {}", error),
        other => bail!("Simulation was not committed: {:?}", other),
    }
    info!("{}", format_parameters(&engine.parameters().await));

    let mut failures = 0usize;
    for strategy in strategies {
        match engine.allocate(strategy.clone()).await {
            AllocateOutcome::Applied { .. } => {}
            AllocateOutcome::Skipped => {
                warn!(strategy = %strategy, "Allocation skipped: empty price matrix")
            }
            AllocateOutcome::Failed(error) => {
                failures += 1;
                warn!(strategy = %strategy, error = %error, "Allocation failed");
            }
            AllocateOutcome::Stale { .. } => {}
        }
    }

    if failures == strategies.len() && !strategies.is_empty() {
        bail!("Every allocation request failed");
    }

    render_registry(&engine.snapshot(), format)
}
