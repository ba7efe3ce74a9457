//! 포트폴리오 가치 계산.
//!
//! 가격 행렬과 가중치로부터 정규화된 포트폴리오 가치 궤적을 계산합니다.
//! 모든 함수는 순수 함수입니다. 같은 입력에는 항상 같은 출력을 돌려주므로
//! 여러 포트폴리오 경로를 한꺼번에 안전하게 재계산할 수 있습니다.

use serde::{Deserialize, Serialize};

use crate::{PriceMatrix, WeightVector};

/// 고정 초기 투자금 (명목 기준액).
pub const NOTIONAL_BASE: f64 = 1_000_000.0;

/// 시계열을 첫 값으로 나누어 1.0에서 시작하도록 정규화합니다.
///
/// 빈 시계열이면 빈 벡터를 반환합니다.
pub fn normalize_series(series: &[f64]) -> Vec<f64> {
    match series.first() {
        Some(&base) => series.iter().map(|v| v / base).collect(),
        None => Vec::new(),
    }
}

/// 포트폴리오 가치 궤적을 계산합니다.
///
/// 1. 각 자산 시계열을 첫 값으로 나누어 정규화 (모든 시계열이 1.0에서 시작)
/// 2. 시간 열마다 정규화된 값의 가중합 계산
/// 3. 명목 기준액(`NOTIONAL_BASE`)을 곱함
///
/// 행렬이나 가중치가 비어 있으면 빈 벡터를 반환합니다.
/// 가중치 길이와 행 수가 다르면 짧은 쪽에 맞춰 짝지어진 행만 사용합니다.
pub fn compute_value(prices: &PriceMatrix, weights: &WeightVector) -> Vec<f64> {
    if prices.is_empty() || weights.is_empty() {
        return Vec::new();
    }

    let mut values = vec![0.0; prices.num_steps()];
    for (row, &weight) in prices.rows().iter().zip(weights.iter()) {
        let Some(&base) = row.first() else {
            continue;
        };
        for (acc, &price) in values.iter_mut().zip(row) {
            *acc += weight * (price / base);
        }
    }

    values.iter_mut().for_each(|v| *v *= NOTIONAL_BASE);
    values
}

/// 가치 궤적 요약.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub first: f64,
    pub last: f64,
    pub min: f64,
    pub max: f64,
    /// 첫 값 대비 마지막 값의 수익률 (%)
    pub total_return_pct: f64,
}

impl TrajectorySummary {
    /// 궤적을 요약합니다. 빈 궤적이면 `None`.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let (&first, &last) = (values.first()?, values.last()?);
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let total_return_pct = if first != 0.0 {
            (last / first - 1.0) * 100.0
        } else {
            0.0
        };

        Some(Self {
            first,
            last,
            min,
            max,
            total_return_pct,
        })
    }
}
