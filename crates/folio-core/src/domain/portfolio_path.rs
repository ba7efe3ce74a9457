//! 포트폴리오 경로.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PathColor, StrategyKey, TrajectorySummary, WeightVector};

/// 전략 하나의 포트폴리오 가치 경로.
///
/// 전략의 첫 자산배분 성공 시 생성되고, 이후 자산배분이나 재동기화마다
/// 가중치와 궤적만 교체됩니다. 색상과 레지스트리 내 위치는 유지됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPath {
    /// 전략 키
    pub strategy: StrategyKey,
    /// 최신 가중치
    pub weights: WeightVector,
    /// 시간 열마다 하나씩인 포트폴리오 가치
    pub trajectory: Vec<f64>,
    /// 표시 색상
    pub color: PathColor,
    /// 궤적을 계산한 가격 행렬의 세대
    pub generation: u64,
    /// 마지막 갱신 시각
    pub updated_at: DateTime<Utc>,
}

impl PortfolioPath {
    pub fn new(
        strategy: StrategyKey,
        weights: WeightVector,
        trajectory: Vec<f64>,
        color: PathColor,
        generation: u64,
    ) -> Self {
        Self {
            strategy,
            weights,
            trajectory,
            color,
            generation,
            updated_at: Utc::now(),
        }
    }

    /// 표시 라벨 (예: "EW").
    pub fn label(&self) -> String {
        self.strategy.label()
    }

    /// 가중치와 궤적을 교체합니다. 색상은 유지됩니다.
    pub fn refresh(&mut self, weights: WeightVector, trajectory: Vec<f64>, generation: u64) {
        self.weights = weights;
        self.trajectory = trajectory;
        self.generation = generation;
        self.updated_at = Utc::now();
    }

    pub fn summary(&self) -> Option<TrajectorySummary> {
        TrajectorySummary::from_values(&self.trajectory)
    }
}
