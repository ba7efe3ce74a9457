//! 서비스 요청/응답 형식.

use folio_core::{MvoConfig, SimulationParameters};
use serde::{Deserialize, Serialize};

/// `GET /simulate` 응답.
///
/// 성공 시 `results`, 서비스 수준 에러 시 `message`만 옵니다.
/// 두 필드가 함께 올 수도 있으며 이때는 `results`가 우선합니다.
#[derive(Debug, Deserialize)]
pub(crate) struct SimulationResponse {
    #[serde(default)]
    pub results: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /allocate` 요청 본문.
#[derive(Debug, Serialize)]
pub(crate) struct AllocationRequest<'a> {
    pub prices: &'a [Vec<f64>],
    pub strategy: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mvo: Option<&'a MvoConfig>,
}

/// `POST /allocate` 응답.
#[derive(Debug, Deserialize)]
pub(crate) struct AllocationResponse {
    pub strategy: String,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub sum: Option<f64>,
}

/// 에러 응답 본문. 서비스마다 필드 이름이 달라 모두 받아 둡니다.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        let head = self.error.or(self.message)?;
        Some(match self.details {
            Some(details) => format!("{} ({})", head, details),
            None => head,
        })
    }
}

/// 시뮬레이션 쿼리 파라미터.
pub(crate) fn simulation_query(params: &SimulationParameters) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("samples", params.samples.to_string()),
        ("size", params.size.to_string()),
        ("mu", params.mu.to_string()),
        ("sigma", params.sigma.to_string()),
        ("starting_value", params.starting_value.to_string()),
    ];
    if let Some(frequency) = params.frequency {
        query.push(("dt", frequency.dt().to_string()));
    }
    query
}
