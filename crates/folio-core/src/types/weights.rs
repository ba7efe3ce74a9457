//! 자산배분 가중치.

use serde::{Deserialize, Serialize};

use crate::StrategyKey;

/// 자산별 배분 비율.
///
/// 합은 보통 1.0이지만 강제하지 않습니다. 합의 정확성은 자산배분 서비스의 책임입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    pub fn new(weights: Vec<f64>) -> Self {
        Self(weights)
    }

    /// 동일 가중 벡터.
    pub fn equal(n: usize) -> Self {
        if n == 0 {
            return Self::default();
        }
        Self(vec![1.0 / n as f64; n])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 가중치 합 (보고용).
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }
}

impl From<Vec<f64>> for WeightVector {
    fn from(weights: Vec<f64>) -> Self {
        Self(weights)
    }
}

/// 자산배분 서비스 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// 요청한 전략
    pub strategy: StrategyKey,
    /// 자산별 가중치
    pub weights: WeightVector,
    /// 서비스가 보고한 가중치 합
    pub reported_sum: f64,
}

impl Allocation {
    /// 보고된 합과 실제 합의 차이.
    pub fn sum_drift(&self) -> f64 {
        (self.weights.sum() - self.reported_sum).abs()
    }
}
