//! 전략 레지스트리.
//!
//! 전략 키별 포트폴리오 경로의 순서 있는 모음입니다.
//! 새 전략은 끝에 추가되고, 기존 전략은 제자리에서 갱신됩니다.

use folio_core::{PathColor, PortfolioPath, StrategyKey, WeightVector};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// upsert 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    /// 새 경로 추가
    Inserted,
    /// 기존 경로 갱신 (색상, 위치 유지)
    Updated,
}

/// 포트폴리오 경로 레지스트리.
///
/// 전략 키 하나당 경로는 최대 하나입니다.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    paths: Vec<PortfolioPath>,
    index: HashMap<StrategyKey, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn get(&self, strategy: &StrategyKey) -> Option<&PortfolioPath> {
        self.index.get(strategy).map(|&idx| &self.paths[idx])
    }

    pub fn contains(&self, strategy: &StrategyKey) -> bool {
        self.index.contains_key(strategy)
    }

    /// 삽입 순서상의 위치.
    pub fn position(&self, strategy: &StrategyKey) -> Option<usize> {
        self.index.get(strategy).copied()
    }

    pub fn paths(&self) -> &[PortfolioPath] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortfolioPath> {
        self.paths.iter()
    }

    /// 등록된 전략 키 (삽입 순서).
    pub fn keys(&self) -> Vec<StrategyKey> {
        self.paths.iter().map(|p| p.strategy.clone()).collect()
    }

    pub fn colors(&self) -> Vec<PathColor> {
        self.paths.iter().map(|p| p.color).collect()
    }

    /// 전략 키로 경로를 추가하거나 갱신합니다.
    ///
    /// 새 전략일 때만 `pick_color`가 사용 중인 색상 목록과 함께 호출됩니다.
    pub fn upsert<F>(
        &mut self,
        strategy: StrategyKey,
        weights: WeightVector,
        trajectory: Vec<f64>,
        generation: u64,
        pick_color: F,
    ) -> UpsertKind
    where
        F: FnOnce(&[PathColor]) -> PathColor,
    {
        if let Some(&idx) = self.index.get(&strategy) {
            self.paths[idx].refresh(weights, trajectory, generation);
            return UpsertKind::Updated;
        }

        let color = pick_color(&self.colors());
        self.index.insert(strategy.clone(), self.paths.len());
        self.paths.push(PortfolioPath::new(
            strategy, weights, trajectory, color, generation,
        ));
        UpsertKind::Inserted
    }

    /// 기존 경로의 가중치와 궤적만 교체합니다. 경로가 없으면 `false`.
    pub fn refresh(
        &mut self,
        strategy: &StrategyKey,
        weights: WeightVector,
        trajectory: Vec<f64>,
        generation: u64,
    ) -> bool {
        match self.index.get(strategy) {
            Some(&idx) => {
                self.paths[idx].refresh(weights, trajectory, generation);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.paths.clear();
        self.index.clear();
    }
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.paths)
    }
}
