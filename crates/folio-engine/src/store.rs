//! 파라미터 저장소.
//!
//! 현재 시뮬레이션 파라미터, 선택된 전략, 최신 가격 행렬을 보관합니다.
//! 시뮬레이션 요청마다 세대(generation)가 하나씩 증가하며,
//! 가장 최근에 발급된 세대의 결과만 커밋됩니다.

use folio_core::{ParameterUpdate, PriceMatrix, SimulationParameters, StrategyKey};
use std::sync::Arc;

/// 시뮬레이션 요청 하나가 들고 다니는 티켓.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    /// 요청 세대
    pub generation: u64,
    /// 요청 시점의 파라미터
    pub params: SimulationParameters,
}

/// 세대 태그가 붙은 파라미터 저장소.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: SimulationParameters,
    strategy: StrategyKey,
    /// 마지막으로 발급된 요청 세대
    generation: u64,
    /// 초기화 횟수
    epoch: u64,
    /// 최신 가격 행렬과 그 세대
    latest: Option<(u64, Arc<PriceMatrix>)>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn selected_strategy(&self) -> &StrategyKey {
        &self.strategy
    }

    /// 마지막으로 발급된 요청 세대.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 초기화될 때마다 증가합니다. 초기화 이전에 시작된 작업을 가려낼 때 씁니다.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn latest_matrix(&self) -> Option<Arc<PriceMatrix>> {
        self.latest.as_ref().map(|(_, matrix)| Arc::clone(matrix))
    }

    /// 최신 가격 행렬과 그 세대.
    pub fn latest(&self) -> Option<(Arc<PriceMatrix>, u64)> {
        self.latest
            .as_ref()
            .map(|(generation, matrix)| (Arc::clone(matrix), *generation))
    }

    /// 최신 가격 행렬의 세대.
    pub fn matrix_generation(&self) -> Option<u64> {
        self.latest.as_ref().map(|(generation, _)| *generation)
    }

    /// 업데이트를 한 번에 적용합니다.
    ///
    /// 시뮬레이션 입력이 바뀌면 새 세대의 티켓을 발급하고,
    /// 전략 선택만 바뀌었거나 빈 업데이트면 `None`을 반환합니다.
    pub fn begin(&mut self, update: &ParameterUpdate) -> Option<FetchTicket> {
        if let Some(strategy) = &update.strategy {
            self.strategy = strategy.clone();
        }
        if !update.touches_simulation() {
            return None;
        }
        self.params = update.apply_to(&self.params);
        Some(self.issue())
    }

    /// 파라미터는 그대로 두고 새 세대를 발급합니다 (데이터 새로고침).
    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.issue()
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket {
            generation: self.generation,
            params: self.params.clone(),
        }
    }

    /// 가장 최근 발급된 세대인지 확인합니다.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// 가격 행렬을 커밋합니다.
    ///
    /// 더 새로운 요청이 이미 발급되었으면 `false`를 반환하고 결과를 버립니다.
    pub fn commit(&mut self, generation: u64, matrix: Arc<PriceMatrix>) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.latest = Some((generation, matrix));
        true
    }

    /// 기본값으로 되돌리고 기본 파라미터의 티켓을 발급합니다.
    ///
    /// 세대는 계속 증가하므로 진행 중인 요청은 모두 오래된 요청이 됩니다.
    pub fn reset(&mut self) -> FetchTicket {
        self.params = SimulationParameters::default();
        self.strategy = StrategyKey::default();
        self.latest = None;
        self.epoch += 1;
        self.issue()
    }
}
