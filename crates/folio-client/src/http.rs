//! HTTP 서비스 클라이언트.
//!
//! 외부 계산 서비스의 REST API 구현.
//! - `GET {base}/simulate`: 몬테카를로 가격 행렬
//! - `POST {base}/allocate`: 전략별 자산배분 가중치

use async_trait::async_trait;
use folio_core::{
    Allocation, MvoConfig, PriceMatrix, ServiceConfig, SimulationParameters, StrategyKey,
    WeightVector,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::traits::{ensure_allocatable, AllocationService, SimulationService};
use crate::wire::{
    simulation_query, AllocationRequest, AllocationResponse, ErrorBody, SimulationResponse,
};
use crate::{ClientError, ClientResult};

/// 시뮬레이션/자산배분 서비스 HTTP 클라이언트.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    base_url: String,
    simulate_path: String,
    allocate_path: String,
    mvo: Option<MvoConfig>,
    client: Client,
}

impl ServiceClient {
    /// 설정에서 새 클라이언트를 생성합니다.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ClientError::Transport`를 반환합니다.
    pub fn new(config: &ServiceConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            base_url: config.resolve_base_url(),
            simulate_path: config.simulate_path.clone(),
            allocate_path: config.allocate_path.clone(),
            mvo: config.mvo.clone(),
            client,
        })
    }

    /// 기본 URL을 덮어씁니다.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// API 응답 처리.
    ///
    /// 성공이 아닌 상태 코드는 본문의 `error`/`message`를 담아 `Service` 에러로 바꿉니다.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                ClientError::MalformedResponse(e.to_string())
            })
        } else {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or(body);
            Err(ClientError::Service {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl SimulationService for ServiceClient {
    async fn fetch_simulation(&self, params: &SimulationParameters) -> ClientResult<PriceMatrix> {
        let url = self.endpoint(&self.simulate_path);
        let query = simulation_query(params);

        debug!(url = %url, samples = params.samples, size = params.size, "GET simulation");

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(ClientError::from)?;

        let body: SimulationResponse = self.handle_response(response).await?;

        match (body.results, body.message) {
            (Some(rows), _) => {
                let matrix = PriceMatrix::from_rows(rows)?;
                let expected = params.expected_shape();
                if matrix.shape() != expected {
                    // 서비스가 요청과 다른 형태를 줄 수 있음 (그대로 사용)
                    debug!(
                        actual = ?matrix.shape(),
                        expected = ?expected,
                        "Simulation shape differs from request"
                    );
                }
                Ok(matrix)
            }
            (None, Some(message)) => Err(ClientError::Service {
                status: 200,
                message,
            }),
            (None, None) => Err(ClientError::MalformedResponse(
                "response has neither 'results' nor 'message'".to_string(),
            )),
        }
    }
}

#[async_trait]
impl AllocationService for ServiceClient {
    async fn fetch_allocation(
        &self,
        prices: &PriceMatrix,
        strategy: &StrategyKey,
    ) -> ClientResult<Allocation> {
        ensure_allocatable(prices)?;

        let url = self.endpoint(&self.allocate_path);
        let request = AllocationRequest {
            prices: prices.rows(),
            strategy: strategy.wire_key(),
            mvo: self.mvo.as_ref().filter(|_| strategy.is_mean_variance()),
        };

        debug!(url = %url, strategy = %strategy, assets = prices.num_assets(), "POST allocation");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(ClientError::from)?;

        let body: AllocationResponse = self.handle_response(response).await?;

        if body.weights.len() != prices.num_assets() {
            return Err(ClientError::MalformedResponse(format!(
                "expected {} weights, got {}",
                prices.num_assets(),
                body.weights.len()
            )));
        }

        if !body.strategy.eq_ignore_ascii_case(strategy.wire_key()) {
            warn!(
                requested = %strategy,
                returned = %body.strategy,
                "Allocation service echoed a different strategy"
            );
        }

        let weights = WeightVector::new(body.weights);
        let reported_sum = body.sum.unwrap_or_else(|| weights.sum());

        Ok(Allocation {
            strategy: strategy.clone(),
            weights,
            reported_sum,
        })
    }
}
