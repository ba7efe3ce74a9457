//! End-to-end engine scenarios against fake services.

mod common;

use common::{assert_close, build_engine, settings, weights_for, FakeAllocation, FakeSimulation};
use folio_core::{ParameterUpdate, SimulationParameters, StrategyKey};
use folio_engine::{AllocateOutcome, RefreshOutcome, ResyncOutcome, UpsertKind};
use std::sync::Arc;
use std::time::Duration;

fn fakes() -> (Arc<FakeSimulation>, Arc<FakeAllocation>) {
    (
        Arc::new(FakeSimulation::default()),
        Arc::new(FakeAllocation::default()),
    )
}

#[tokio::test]
async fn test_default_scenario_equal_weight_then_mvo() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation.clone(), allocation.clone(), settings());

    assert!(engine.refresh().await.is_committed());
    let matrix = engine.latest_matrix().await.expect("matrix committed");
    assert_eq!(matrix.shape(), (10, 31));

    let outcome = engine.allocate(StrategyKey::EqualWeight).await;
    assert!(matches!(
        outcome,
        AllocateOutcome::Applied {
            kind: UpsertKind::Inserted,
            generation: 1,
            ..
        }
    ));

    let registry = engine.snapshot();
    let ew = registry.get(&StrategyKey::EqualWeight).unwrap();
    assert_eq!(ew.weights.as_slice(), &[0.1; 10]);
    assert_eq!(ew.trajectory.len(), 31);
    assert_close(ew.trajectory[0], 1_000_000.0);
    assert_eq!(ew.label(), "EW");

    engine.allocate(StrategyKey::MeanVariance).await;

    let registry = engine.snapshot();
    assert_eq!(
        registry.keys(),
        vec![StrategyKey::EqualWeight, StrategyKey::MeanVariance]
    );
    let mvo = registry.get(&StrategyKey::MeanVariance).unwrap();
    assert_eq!(mvo.weights, weights_for(&StrategyKey::MeanVariance, 10));
    assert_eq!(mvo.trajectory.len(), 31);
    assert_close(mvo.trajectory[0], 1_000_000.0 * mvo.weights.sum());
    assert_eq!(simulation.calls(), 1);
    assert_eq!(allocation.calls(), 2);
}

#[tokio::test]
async fn test_allocate_is_idempotent() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation, settings());
    engine.refresh().await;

    engine.allocate(StrategyKey::HierarchicalRiskParity).await;
    let first = engine
        .snapshot()
        .get(&StrategyKey::HierarchicalRiskParity)
        .cloned()
        .unwrap();

    let outcome = engine.allocate(StrategyKey::HierarchicalRiskParity).await;
    assert!(matches!(
        outcome,
        AllocateOutcome::Applied {
            kind: UpsertKind::Updated,
            ..
        }
    ));

    let registry = engine.snapshot();
    let second = registry.get(&StrategyKey::HierarchicalRiskParity).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(second.weights, first.weights);
    assert_eq!(second.trajectory, first.trajectory);
    assert_eq!(second.color, first.color);
}

#[tokio::test]
async fn test_registry_cardinality_matches_distinct_strategies() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation, settings());
    engine.refresh().await;

    let custom: StrategyKey = "risk-parity".parse().unwrap();
    let sequence = [
        StrategyKey::EqualWeight,
        StrategyKey::MeanVariance,
        StrategyKey::EqualWeight,
        custom.clone(),
        StrategyKey::MeanVariance,
        "EQUAL".parse().unwrap(),
    ];
    for strategy in sequence {
        assert!(engine.allocate(strategy).await.is_applied());
    }

    let registry = engine.snapshot();
    assert_eq!(registry.len(), 3);
    assert_eq!(
        registry.keys(),
        vec![StrategyKey::EqualWeight, StrategyKey::MeanVariance, custom]
    );
}

#[tokio::test]
async fn test_resync_keeps_previous_path_on_failure() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation.clone(), settings());
    engine.refresh().await;
    engine.allocate(StrategyKey::EqualWeight).await;
    let before = engine
        .snapshot()
        .get(&StrategyKey::EqualWeight)
        .cloned()
        .unwrap();

    allocation.fail(StrategyKey::EqualWeight);
    let outcome = engine
        .update_parameters(ParameterUpdate::default().with_samples(5))
        .await;

    match outcome {
        RefreshOutcome::Committed(ResyncOutcome::Applied(report)) => {
            assert_eq!(report.generation, 2);
            assert!(report.refreshed.is_empty());
            assert_eq!(report.stale, vec![StrategyKey::EqualWeight]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let registry = engine.snapshot();
    let after = registry.get(&StrategyKey::EqualWeight).unwrap();
    assert_eq!(after.weights, before.weights);
    assert_eq!(after.trajectory, before.trajectory);
    assert_eq!(after.generation, 1);
    assert_eq!(engine.latest_matrix().await.unwrap().num_assets(), 5);
}

#[tokio::test]
async fn test_resync_refreshes_every_path_in_place() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation, settings());
    engine.refresh().await;
    engine.allocate(StrategyKey::EqualWeight).await;
    engine.allocate(StrategyKey::HierarchicalRiskParity).await;
    let colors = engine.snapshot().colors();

    let outcome = engine
        .update_parameters(ParameterUpdate::default().with_size(10).with_samples(4))
        .await;

    match outcome {
        RefreshOutcome::Committed(ResyncOutcome::Applied(report)) => {
            assert!(report.is_complete());
            assert_eq!(
                report.refreshed,
                vec![StrategyKey::EqualWeight, StrategyKey::HierarchicalRiskParity]
            );
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let registry = engine.snapshot();
    assert_eq!(registry.colors(), colors);
    for path in registry.iter() {
        assert_eq!(path.trajectory.len(), 11);
        assert_eq!(path.weights.len(), 4);
        assert_eq!(path.generation, 2);
    }
}

#[tokio::test]
async fn test_simulation_failure_keeps_previous_matrix() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation.clone(), allocation, settings());
    engine.refresh().await;
    engine.allocate(StrategyKey::EqualWeight).await;

    simulation.set_failing(true);
    let outcome = engine
        .update_parameters(ParameterUpdate::default().with_samples(3))
        .await;

    assert!(matches!(outcome, RefreshOutcome::Failed { generation: 2, .. }));
    assert_eq!(engine.latest_matrix().await.unwrap().num_assets(), 10);
    assert_eq!(engine.parameters().await.samples, 3);
    assert_eq!(
        engine
            .snapshot()
            .get(&StrategyKey::EqualWeight)
            .unwrap()
            .generation,
        1
    );
}

#[tokio::test]
async fn test_reset_restores_defaults() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation, settings());

    engine
        .update_parameters(
            ParameterUpdate::default()
                .with_samples(4)
                .with_mu(0.02)
                .with_sigma(0.3)
                .with_starting_value(120.0)
                .with_strategy(StrategyKey::MeanVariance),
        )
        .await;
    engine.allocate_selected().await;
    engine.allocate(StrategyKey::EqualWeight).await;
    engine.refresh().await;
    assert_eq!(engine.snapshot().len(), 2);

    let outcome = engine.reset().await;

    assert!(outcome.is_committed());
    assert!(engine.snapshot().is_empty());
    assert_eq!(engine.parameters().await, SimulationParameters::default());
    assert_eq!(engine.selected_strategy().await, StrategyKey::EqualWeight);
    assert_eq!(engine.latest_matrix().await.unwrap().shape(), (10, 31));
}

#[tokio::test]
async fn test_allocate_after_reset_uses_default_matrix() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation.clone(), allocation, settings());
    engine
        .update_parameters(ParameterUpdate::default().with_samples(4))
        .await;
    engine.allocate(StrategyKey::MeanVariance).await;

    engine.reset().await;
    let outcome = engine.allocate(StrategyKey::EqualWeight).await;

    assert!(matches!(
        outcome,
        AllocateOutcome::Applied {
            kind: UpsertKind::Inserted,
            generation: 2,
            ..
        }
    ));
    assert_eq!(simulation.calls(), 2);
    let registry = engine.snapshot();
    assert_eq!(registry.keys(), vec![StrategyKey::EqualWeight]);
    assert_eq!(registry.get(&StrategyKey::EqualWeight).unwrap().trajectory.len(), 31);
}

#[tokio::test]
async fn test_empty_matrix_skips_allocation() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation.clone(), settings());

    engine
        .update_parameters(ParameterUpdate::default().with_samples(0))
        .await;
    assert!(engine.latest_matrix().await.unwrap().is_empty());

    let outcome = engine.allocate(StrategyKey::EqualWeight).await;

    assert!(matches!(outcome, AllocateOutcome::Skipped));
    assert_eq!(allocation.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_simulation_result_is_discarded() {
    let simulation = Arc::new(FakeSimulation::with_delay_per_sample(Duration::from_millis(
        10,
    )));
    let engine = build_engine(simulation, Arc::new(FakeAllocation::default()), settings());

    // 먼저 보낸 요청(50 샘플)이 나중에 도착
    let (slow, fast) = tokio::join!(
        engine.update_parameters(ParameterUpdate::default().with_samples(50)),
        engine.update_parameters(ParameterUpdate::default().with_samples(5)),
    );

    assert!(matches!(slow, RefreshOutcome::Stale { generation: 1 }));
    assert!(fast.is_committed());
    assert_eq!(engine.latest_matrix().await.unwrap().num_assets(), 5);
    assert_eq!(engine.parameters().await.samples, 5);
}

#[tokio::test(start_paused = true)]
async fn test_resync_commits_once_after_all_fetches_settle() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation.clone(), settings());
    engine.refresh().await;
    engine.allocate(StrategyKey::EqualWeight).await;
    engine.allocate(StrategyKey::MeanVariance).await;

    allocation.delay(StrategyKey::MeanVariance, Duration::from_millis(100));
    let task = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.refresh().await }
    });

    // EW 응답은 도착했지만 MVO는 아직 대기 중
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(engine.snapshot().iter().all(|p| p.generation == 1));

    let outcome = task.await.unwrap();
    assert!(outcome.is_committed());
    assert!(engine.snapshot().iter().all(|p| p.generation == 2));
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_in_flight_resync() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation.clone(), settings());
    engine.refresh().await;
    engine.allocate(StrategyKey::EqualWeight).await;

    allocation.delay(StrategyKey::EqualWeight, Duration::from_millis(100));
    let task = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.refresh().await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    engine.reset().await;

    let outcome = task.await.unwrap();
    assert!(matches!(
        outcome,
        RefreshOutcome::Committed(ResyncOutcome::Superseded { generation: 2 })
    ));
    assert!(engine.snapshot().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_allocation_retries_against_newer_matrix() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation.clone(), settings());
    engine.refresh().await;

    allocation.delay(StrategyKey::HierarchicalRiskParity, Duration::from_millis(100));
    let task = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.allocate(StrategyKey::HierarchicalRiskParity).await }
    });

    // 자산배분 응답 전에 새 가격 행렬이 커밋됨 (레지스트리는 아직 비어 있음)
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(engine
        .update_parameters(ParameterUpdate::default().with_samples(6))
        .await
        .is_committed());

    let outcome = task.await.unwrap();
    assert!(matches!(
        outcome,
        AllocateOutcome::Applied {
            kind: UpsertKind::Inserted,
            generation: 2,
            ..
        }
    ));
    assert_eq!(allocation.calls(), 2);

    let registry = engine.snapshot();
    let path = registry.get(&StrategyKey::HierarchicalRiskParity).unwrap();
    assert_eq!(path.generation, 2);
    assert_eq!(path.weights.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_allocation_already_resynced_is_not_repeated() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation.clone(), settings());
    engine.refresh().await;
    engine.allocate(StrategyKey::MeanVariance).await;

    allocation.delay(StrategyKey::MeanVariance, Duration::from_millis(100));
    let task = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.allocate(StrategyKey::MeanVariance).await }
    });

    // 재동기화가 같은 전략을 새 행렬로 먼저 갱신함
    tokio::time::sleep(Duration::from_millis(10)).await;
    allocation.delay(StrategyKey::MeanVariance, Duration::ZERO);
    assert!(engine.refresh().await.is_committed());

    let outcome = task.await.unwrap();
    assert!(matches!(outcome, AllocateOutcome::Stale { generation: 1 }));
    assert_eq!(allocation.calls(), 3);
    assert_eq!(
        engine
            .snapshot()
            .get(&StrategyKey::MeanVariance)
            .unwrap()
            .generation,
        2
    );
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_in_flight_allocation() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation.clone(), settings());
    engine.refresh().await;

    allocation.delay(StrategyKey::HierarchicalRiskParity, Duration::from_millis(100));
    let task = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.allocate(StrategyKey::HierarchicalRiskParity).await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    engine.reset().await;

    let outcome = task.await.unwrap();
    assert!(matches!(outcome, AllocateOutcome::Stale { generation: 1 }));
    assert!(engine.snapshot().is_empty());
}

#[tokio::test]
async fn test_allocate_after_resync_overwrites_entry() {
    let (simulation, allocation) = fakes();
    let engine = build_engine(simulation, allocation, settings());
    engine.refresh().await;
    engine.allocate(StrategyKey::EqualWeight).await;

    engine
        .update_parameters(ParameterUpdate::default().with_samples(6))
        .await;
    let resynced = engine
        .snapshot()
        .get(&StrategyKey::EqualWeight)
        .cloned()
        .unwrap();
    assert_eq!(resynced.generation, 2);

    let outcome = engine.allocate(StrategyKey::EqualWeight).await;
    assert!(outcome.is_applied());

    let registry = engine.snapshot();
    let latest = registry.get(&StrategyKey::EqualWeight).unwrap();
    assert_eq!(latest.color, resynced.color);
    assert!(latest.updated_at >= resynced.updated_at);
    assert_eq!(registry.len(), 1);
}
