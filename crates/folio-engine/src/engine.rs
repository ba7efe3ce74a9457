//! 포트폴리오 동기화 엔진.
//!
//! 파라미터 저장소, 전략 레지스트리, 서비스 클라이언트를 묶어
//! 시뮬레이션 → 재동기화 → 가치 계산 흐름을 관리합니다.
//!
//! 모든 상태 변경은 값 전체 교체(copy-on-write)이며, 잠금은 await 지점을
//! 넘어 유지되지 않습니다. 서비스 호출 실패는 에러로 전파되지 않고
//! 결과 값과 로그로 보고됩니다.

use folio_client::{AllocationService, ClientError, SimulationService};
use folio_core::{
    compute_value, strategy_span, Allocation, ColorPicker, EngineSettings, ParameterUpdate,
    PriceMatrix, SimulationParameters, StrategyKey, WeightVector,
};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::registry::{Registry, UpsertKind};
use crate::store::{FetchTicket, ParameterStore};

/// 보고된 가중치 합과 실제 합의 허용 오차
const SUM_TOLERANCE: f64 = 1e-6;

/// 응답 도중 가격 행렬이 바뀌었을 때 자산배분을 다시 요청하는 최대 횟수
const MAX_ALLOCATE_ATTEMPTS: usize = 3;

/// 시뮬레이션 요청 결과.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// 시뮬레이션 입력이 바뀌지 않아 요청하지 않음
    Unchanged,
    /// 가격 행렬 커밋 후 재동기화까지 완료
    Committed(ResyncOutcome),
    /// 더 새로운 요청에 밀려 결과를 버림
    Stale { generation: u64 },
    /// 시뮬레이션 요청 실패 (이전 가격 행렬 유지)
    Failed { generation: u64, error: ClientError },
}

impl RefreshOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, RefreshOutcome::Committed(_))
    }
}

/// 재동기화 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum ResyncOutcome {
    /// 레지스트리에 반영됨
    Applied(ResyncReport),
    /// 그 사이 가격 행렬이 바뀌어 전체를 버림
    Superseded { generation: u64 },
}

/// 재동기화 보고서.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResyncReport {
    /// 재동기화에 사용한 가격 행렬 세대
    pub generation: u64,
    /// 새 가격 행렬로 갱신된 전략 (레지스트리 순서)
    pub refreshed: Vec<StrategyKey>,
    /// 자산배분 실패로 이전 데이터를 유지한 전략 (레지스트리 순서)
    pub stale: Vec<StrategyKey>,
}

impl ResyncReport {
    fn empty(generation: u64) -> Self {
        Self {
            generation,
            ..Default::default()
        }
    }

    /// 모든 전략이 갱신되었는지 확인합니다.
    pub fn is_complete(&self) -> bool {
        self.stale.is_empty()
    }
}

/// 자산배분 결과.
#[derive(Debug)]
pub enum AllocateOutcome {
    /// 레지스트리에 반영됨
    Applied {
        strategy: StrategyKey,
        kind: UpsertKind,
        generation: u64,
    },
    /// 가격 행렬이 없거나 비어 있어 요청하지 않음
    Skipped,
    /// 응답 도착 전에 가격 행렬이 바뀌어 결과를 버림
    Stale { generation: u64 },
    /// 자산배분 요청 실패 (레지스트리 변경 없음)
    Failed(ClientError),
}

impl AllocateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, AllocateOutcome::Applied { .. })
    }
}

/// 잠금 하나로 보호되는 엔진 상태.
struct EngineState {
    store: ParameterStore,
    registry: Arc<Registry>,
    colors: ColorPicker,
}

/// 포트폴리오 동기화 엔진.
pub struct PortfolioEngine {
    simulation: Arc<dyn SimulationService>,
    allocation: Arc<dyn AllocationService>,
    state: RwLock<EngineState>,
    registry_tx: watch::Sender<Arc<Registry>>,
    settings: EngineSettings,
}

impl PortfolioEngine {
    /// 새 엔진을 생성합니다.
    pub fn new(
        simulation: Arc<dyn SimulationService>,
        allocation: Arc<dyn AllocationService>,
        settings: EngineSettings,
    ) -> Self {
        let registry = Arc::new(Registry::new());
        let (registry_tx, _) = watch::channel(Arc::clone(&registry));

        Self {
            simulation,
            allocation,
            state: RwLock::new(EngineState {
                store: ParameterStore::new(),
                registry,
                colors: ColorPicker::new(settings.color_seed),
            }),
            registry_tx,
            settings,
        }
    }

    /// 두 서비스를 모두 구현하는 클라이언트 하나로 엔진을 생성합니다.
    pub fn with_service<S>(service: Arc<S>, settings: EngineSettings) -> Self
    where
        S: SimulationService + AllocationService + 'static,
    {
        Self::new(service.clone(), service, settings)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // ==================== 조회 ====================

    pub async fn parameters(&self) -> SimulationParameters {
        self.state.read().await.store.current().clone()
    }

    pub async fn selected_strategy(&self) -> StrategyKey {
        self.state.read().await.store.selected_strategy().clone()
    }

    /// 마지막으로 발급된 시뮬레이션 요청 세대.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.store.generation()
    }

    pub async fn latest_matrix(&self) -> Option<Arc<PriceMatrix>> {
        self.state.read().await.store.latest_matrix()
    }

    /// 현재 레지스트리 스냅샷.
    pub fn snapshot(&self) -> Arc<Registry> {
        self.registry_tx.borrow().clone()
    }

    /// 레지스트리 변경 구독.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Registry>> {
        self.registry_tx.subscribe()
    }

    // ==================== 파라미터 ====================

    /// 파라미터 업데이트를 적용하고, 필요하면 시뮬레이션 티켓을 발급합니다.
    pub async fn begin_update(&self, update: &ParameterUpdate) -> Option<FetchTicket> {
        let mut state = self.state.write().await;
        let ticket = state.store.begin(update);

        match &ticket {
            Some(ticket) => debug!(
                generation = ticket.generation,
                samples = ticket.params.samples,
                size = ticket.params.size,
                "Parameters updated"
            ),
            None => debug!(
                strategy = %state.store.selected_strategy(),
                "Selection updated without simulation change"
            ),
        }
        ticket
    }

    /// 현재 파라미터로 새 시뮬레이션 티켓을 발급합니다.
    pub async fn begin_refresh(&self) -> FetchTicket {
        let ticket = self.state.write().await.store.begin_refresh();
        debug!(generation = ticket.generation, "Refresh requested");
        ticket
    }

    /// 파라미터를 바꾸고 시뮬레이션 → 재동기화를 수행합니다.
    pub async fn update_parameters(&self, update: ParameterUpdate) -> RefreshOutcome {
        match self.begin_update(&update).await {
            Some(ticket) => self.run_fetch(ticket).await,
            None => RefreshOutcome::Unchanged,
        }
    }

    /// 같은 파라미터로 새 가격 행렬을 받아 재동기화합니다.
    pub async fn refresh(&self) -> RefreshOutcome {
        let ticket = self.begin_refresh().await;
        self.run_fetch(ticket).await
    }

    /// 선택된 전략을 바꿉니다. 시뮬레이션은 다시 요청하지 않습니다.
    pub async fn select_strategy(&self, strategy: StrategyKey) {
        self.begin_update(&ParameterUpdate::default().with_strategy(strategy))
            .await;
    }

    /// 티켓 하나에 대한 시뮬레이션 요청, 커밋, 재동기화.
    pub async fn run_fetch(&self, ticket: FetchTicket) -> RefreshOutcome {
        let generation = ticket.generation;
        let span = info_span!("simulation", generation);

        async move {
            let matrix = match self.simulation.fetch_simulation(&ticket.params).await {
                Ok(matrix) => Arc::new(matrix),
                Err(error) => {
                    warn!(
                        error = %error,
                        kind = error.kind(),
                        "Simulation fetch failed, keeping previous price matrix"
                    );
                    return RefreshOutcome::Failed { generation, error };
                }
            };

            let committed = self
                .state
                .write()
                .await
                .store
                .commit(generation, Arc::clone(&matrix));
            if !committed {
                debug!("Simulation result superseded by a newer request, discarded");
                return RefreshOutcome::Stale { generation };
            }

            let (rows, columns) = matrix.shape();
            info!(rows, columns, "Price matrix committed");

            RefreshOutcome::Committed(self.resync(matrix, generation).await)
        }
        .instrument(span)
        .await
    }

    // ==================== 레지스트리 ====================

    /// 현재 가격 행렬로 전략 하나를 자산배분하고 레지스트리에 반영합니다.
    ///
    /// 기존 전략이면 가중치와 궤적만 바뀌고 색상과 위치는 유지됩니다.
    /// 새 전략이면 새 색상으로 끝에 추가됩니다.
    /// 응답 전에 새 가격 행렬이 커밋되면 새 행렬로 다시 요청합니다.
    pub async fn allocate(&self, strategy: StrategyKey) -> AllocateOutcome {
        let span = strategy_span!("allocate", strategy);
        self.allocate_inner(strategy).instrument(span).await
    }

    /// 선택된 전략으로 자산배분합니다.
    pub async fn allocate_selected(&self) -> AllocateOutcome {
        let strategy = self.selected_strategy().await;
        self.allocate(strategy).await
    }

    async fn allocate_inner(&self, strategy: StrategyKey) -> AllocateOutcome {
        let (latest, epoch) = {
            let state = self.state.read().await;
            (state.store.latest(), state.store.epoch())
        };
        let Some((mut matrix, mut generation)) = latest else {
            debug!("No price matrix yet, allocation skipped");
            return AllocateOutcome::Skipped;
        };

        for attempt in 1..=MAX_ALLOCATE_ATTEMPTS {
            if !matrix.is_usable() {
                debug!(generation, "Price matrix is empty, allocation skipped");
                return AllocateOutcome::Skipped;
            }

            let allocation = match self.allocation.fetch_allocation(&matrix, &strategy).await {
                Ok(allocation) => allocation,
                Err(error) if error.is_skipped() => {
                    debug!(reason = %error, "Allocation skipped");
                    return AllocateOutcome::Skipped;
                }
                Err(error) => {
                    warn!(
                        error = %error,
                        kind = error.kind(),
                        "Allocation failed, registry unchanged"
                    );
                    return AllocateOutcome::Failed(error);
                }
            };
            check_reported_sum(&allocation);
            let trajectory = trajectory_for(&matrix, &strategy, &allocation.weights);

            let mut state = self.state.write().await;
            if state.store.epoch() != epoch {
                debug!(generation, "Engine reset during allocation, result discarded");
                return AllocateOutcome::Stale { generation };
            }
            match state.store.latest() {
                Some((_, current)) if current == generation => {}
                Some((next_matrix, current)) => {
                    // 재동기화가 이미 새 행렬로 갱신했으면 그대로 둠
                    let refreshed = state
                        .registry
                        .get(&strategy)
                        .is_some_and(|path| path.generation == current);
                    if refreshed || attempt == MAX_ALLOCATE_ATTEMPTS {
                        debug!(
                            generation,
                            current,
                            refreshed,
                            "Price matrix changed during allocation, result discarded"
                        );
                        return AllocateOutcome::Stale { generation };
                    }
                    debug!(
                        generation,
                        current,
                        "Price matrix changed during allocation, retrying"
                    );
                    matrix = next_matrix;
                    generation = current;
                    continue;
                }
                None => return AllocateOutcome::Stale { generation },
            }

            let EngineState {
                registry, colors, ..
            } = &mut *state;
            let mut next = (**registry).clone();
            let kind = next.upsert(
                strategy.clone(),
                allocation.weights,
                trajectory,
                generation,
                |taken| colors.pick(taken),
            );
            let entries = next.len();
            self.publish(&mut state, next);

            info!(kind = ?kind, generation, entries, "Portfolio path allocated");
            return AllocateOutcome::Applied {
                strategy,
                kind,
                generation,
            };
        }

        AllocateOutcome::Stale { generation }
    }

    /// 새 가격 행렬로 모든 포트폴리오 경로를 다시 계산합니다.
    ///
    /// 전략별 자산배분은 동시에 요청되며(최대 `resync_concurrency`개),
    /// 모든 요청이 끝난 뒤 레지스트리를 한 번에 교체합니다.
    /// 실패한 전략은 이전 데이터를 유지합니다. 그 사이 가격 행렬이 바뀌었으면
    /// 결과 전체를 버립니다.
    pub async fn resync(&self, matrix: Arc<PriceMatrix>, generation: u64) -> ResyncOutcome {
        let keys = self.snapshot().keys();
        if keys.is_empty() {
            return ResyncOutcome::Applied(ResyncReport::empty(generation));
        }

        let span = info_span!("resync", generation, entries = keys.len());
        self.resync_inner(keys, matrix, generation)
            .instrument(span)
            .await
    }

    async fn resync_inner(
        &self,
        keys: Vec<StrategyKey>,
        matrix: Arc<PriceMatrix>,
        generation: u64,
    ) -> ResyncOutcome {
        let service = Arc::clone(&self.allocation);
        let fetch_matrix = Arc::clone(&matrix);
        let results: Vec<_> = stream::iter(keys)
            .map(move |strategy| {
                let service = Arc::clone(&service);
                let matrix = Arc::clone(&fetch_matrix);
                async move {
                    let result = service.fetch_allocation(&matrix, &strategy).await;
                    (strategy, result)
                }
            })
            .buffer_unordered(self.settings.resync_concurrency.max(1))
            .collect()
            .await;

        let mut updates = Vec::with_capacity(results.len());
        let mut stale = Vec::new();
        for (strategy, result) in results {
            match result {
                Ok(allocation) => {
                    check_reported_sum(&allocation);
                    let trajectory = trajectory_for(&matrix, &strategy, &allocation.weights);
                    updates.push((strategy, allocation.weights, trajectory));
                }
                Err(error) if error.is_skipped() => {
                    debug!(strategy = %strategy, reason = %error, "Resync allocation skipped");
                    stale.push(strategy);
                }
                Err(error) => {
                    warn!(
                        strategy = %strategy,
                        error = %error,
                        kind = error.kind(),
                        "Resync allocation failed, keeping previous path"
                    );
                    stale.push(strategy);
                }
            }
        }

        let mut state = self.state.write().await;
        if state.store.matrix_generation() != Some(generation) {
            debug!("Price matrix superseded during resync, results discarded");
            return ResyncOutcome::Superseded { generation };
        }

        let mut next = (*state.registry).clone();
        let mut refreshed = Vec::with_capacity(updates.len());
        for (strategy, weights, trajectory) in updates {
            if next.refresh(&strategy, weights, trajectory, generation) {
                refreshed.push(strategy);
            }
        }
        refreshed.sort_by_key(|key| next.position(key));
        stale.sort_by_key(|key| next.position(key));
        self.publish(&mut state, next);

        info!(
            refreshed = refreshed.len(),
            stale = stale.len(),
            "Resync committed"
        );
        ResyncOutcome::Applied(ResyncReport {
            generation,
            refreshed,
            stale,
        })
    }

    /// 레지스트리를 비우고 파라미터를 기본값으로 되돌립니다.
    ///
    /// 진행 중인 시뮬레이션/자산배분 결과는 모두 버려집니다.
    /// 반환된 티켓으로 기본 파라미터의 가격 행렬을 받아야 합니다.
    pub async fn begin_reset(&self) -> FetchTicket {
        let mut state = self.state.write().await;
        let ticket = state.store.reset();
        self.publish(&mut state, Registry::new());
        info!(generation = ticket.generation, "Engine reset to defaults");
        ticket
    }

    /// 기본값으로 되돌리고 기본 파라미터로 새 가격 행렬을 받습니다.
    pub async fn reset(&self) -> RefreshOutcome {
        let ticket = self.begin_reset().await;
        self.run_fetch(ticket).await
    }

    /// 새 레지스트리를 상태에 저장하고 구독자에게 알립니다.
    ///
    /// 상태 잠금을 쥔 채로 호출해야 발행 순서가 커밋 순서와 같습니다.
    fn publish(&self, state: &mut EngineState, next: Registry) {
        let snapshot = Arc::new(next);
        state.registry = Arc::clone(&snapshot);
        self.registry_tx.send_replace(snapshot);
    }
}

fn trajectory_for(
    matrix: &PriceMatrix,
    strategy: &StrategyKey,
    weights: &WeightVector,
) -> Vec<f64> {
    if weights.len() != matrix.num_assets() {
        debug!(
            strategy = %strategy,
            weights = weights.len(),
            assets = matrix.num_assets(),
            "Weight count differs from asset count, pairing by position"
        );
    }
    compute_value(matrix, weights)
}

fn check_reported_sum(allocation: &Allocation) {
    if allocation.sum_drift() > SUM_TOLERANCE {
        debug!(
            strategy = %allocation.strategy,
            reported = allocation.reported_sum,
            actual = allocation.weights.sum(),
            "Reported weight sum differs from weights"
        );
    }
}
