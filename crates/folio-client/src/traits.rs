//! 서비스 trait 정의.
//!
//! 엔진은 이 trait에만 의존하므로 HTTP 구현 대신 다른 구현(테스트용 등)을 끼울 수 있습니다.

use async_trait::async_trait;
use folio_core::{Allocation, PriceMatrix, SimulationParameters, StrategyKey};

use crate::{ClientError, ClientResult};

/// 시뮬레이션 서비스: 파라미터 → 가격 행렬.
#[async_trait]
pub trait SimulationService: Send + Sync {
    /// 가격 행렬 조회.
    async fn fetch_simulation(&self, params: &SimulationParameters) -> ClientResult<PriceMatrix>;
}

/// 자산배분 서비스: (가격 행렬, 전략) → 가중치.
#[async_trait]
pub trait AllocationService: Send + Sync {
    /// 가중치 조회.
    ///
    /// 가격 행렬이 비어 있거나 빈 행이 있으면 요청 없이
    /// `ClientError::PreconditionSkipped`를 반환해야 합니다.
    async fn fetch_allocation(
        &self,
        prices: &PriceMatrix,
        strategy: &StrategyKey,
    ) -> ClientResult<Allocation>;
}

/// 자산배분 요청 전 가격 행렬 사전 조건 검사.
pub fn ensure_allocatable(prices: &PriceMatrix) -> ClientResult<()> {
    if prices.is_empty() {
        return Err(ClientError::PreconditionSkipped(
            "price matrix has no rows".to_string(),
        ));
    }
    if !prices.is_usable() {
        return Err(ClientError::PreconditionSkipped(
            "price matrix has an empty row".to_string(),
        ));
    }
    Ok(())
}
