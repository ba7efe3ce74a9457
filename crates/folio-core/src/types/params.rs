//! 시뮬레이션 파라미터.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, StrategyKey};

/// 슬라이더 값(정수 bp)을 실수로 바꿀 때 쓰는 제수.
pub const BASIS_POINT_DIVISOR: f64 = 10_000.0;

/// 기본 샘플(경로) 수
pub const DEFAULT_SAMPLES: u32 = 10;
/// 기본 기간 길이 (스텝 수)
pub const DEFAULT_SIZE: u32 = 30;
/// 기본 드리프트 (bp)
pub const DEFAULT_MU_BPS: f64 = 50.0;
/// 기본 변동성 (bp)
pub const DEFAULT_SIGMA_BPS: f64 = 150.0;
/// 기본 시작 가격
pub const DEFAULT_STARTING_VALUE: f64 = 50.0;

/// 시뮬레이션 시간 간격 빈도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// 일간 (1/252)
    Daily,
    /// 주간 (1/52)
    Weekly,
    /// 월간 (1/12)
    Monthly,
}

impl Frequency {
    /// 연 단위 시간 간격(dt)을 반환합니다.
    pub fn dt(self) -> f64 {
        match self {
            Frequency::Daily => 1.0 / 252.0,
            Frequency::Weekly => 1.0 / 52.0,
            Frequency::Monthly => 1.0 / 12.0,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "d" => Ok(Frequency::Daily),
            "weekly" | "w" => Ok(Frequency::Weekly),
            "monthly" | "m" => Ok(Frequency::Monthly),
            other => Err(CoreError::InvalidInput(format!(
                "Unknown frequency: {}. Supported: daily, weekly, monthly",
                other
            ))),
        }
    }
}

/// 시뮬레이션 서비스에 전달되는 입력 묶음.
///
/// 다섯 필드(및 선택적 빈도)는 하나의 일관된 요청을 이루며 항상 통째로 교체됩니다.
/// 범위 검증은 하지 않습니다. 범위를 벗어난 값은 서비스가 거부합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// 시뮬레이션 경로 수 (가격 행렬의 행 수)
    pub samples: u32,
    /// 기간 길이 (행 길이 = size + 1)
    pub size: u32,
    /// 드리프트
    pub mu: f64,
    /// 변동성
    pub sigma: f64,
    /// 시작 가격
    pub starting_value: f64,
    /// 시간 간격 빈도 (None이면 서비스 기본값)
    #[serde(default)]
    pub frequency: Option<Frequency>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            size: DEFAULT_SIZE,
            mu: DEFAULT_MU_BPS / BASIS_POINT_DIVISOR,
            sigma: DEFAULT_SIGMA_BPS / BASIS_POINT_DIVISOR,
            starting_value: DEFAULT_STARTING_VALUE,
            frequency: None,
        }
    }
}

impl SimulationParameters {
    /// 기대되는 가격 행렬 형태 (행, 열).
    pub fn expected_shape(&self) -> (usize, usize) {
        (self.samples as usize, self.size as usize + 1)
    }
}

/// 파라미터 부분 업데이트.
///
/// 설정된 필드만 교체됩니다. 여러 필드를 바꾸더라도 한 번의 원자적 교체로 적용됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterUpdate {
    pub samples: Option<u32>,
    pub size: Option<u32>,
    pub mu: Option<f64>,
    pub sigma: Option<f64>,
    pub starting_value: Option<f64>,
    /// `Some(None)`이면 서비스 기본 시간 간격으로 되돌립니다.
    pub frequency: Option<Option<Frequency>>,
    /// 선택된 자산배분 전략
    pub strategy: Option<StrategyKey>,
}

impl ParameterUpdate {
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = Some(mu);
        self
    }

    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = Some(sigma);
        self
    }

    pub fn with_starting_value(mut self, starting_value: f64) -> Self {
        self.starting_value = Some(starting_value);
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(Some(frequency));
        self
    }

    /// 시간 간격 지정을 지우고 서비스 기본값을 사용합니다.
    pub fn clear_frequency(mut self) -> Self {
        self.frequency = Some(None);
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKey) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// 아무 필드도 설정되지 않았는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 시뮬레이션 입력이 바뀌는 업데이트인지 확인합니다.
    ///
    /// 전략 선택만 바꾸는 업데이트는 새 시뮬레이션을 요청하지 않습니다.
    pub fn touches_simulation(&self) -> bool {
        self.samples.is_some()
            || self.size.is_some()
            || self.mu.is_some()
            || self.sigma.is_some()
            || self.starting_value.is_some()
            || self.frequency.is_some()
    }

    /// 나중 업데이트를 합칩니다. 같은 필드는 `later`가 우선합니다.
    pub fn merge(self, later: ParameterUpdate) -> Self {
        Self {
            samples: later.samples.or(self.samples),
            size: later.size.or(self.size),
            mu: later.mu.or(self.mu),
            sigma: later.sigma.or(self.sigma),
            starting_value: later.starting_value.or(self.starting_value),
            frequency: later.frequency.or(self.frequency),
            strategy: later.strategy.or(self.strategy),
        }
    }

    /// 현재 파라미터에 적용한 새 값을 반환합니다.
    pub fn apply_to(&self, params: &SimulationParameters) -> SimulationParameters {
        SimulationParameters {
            samples: self.samples.unwrap_or(params.samples),
            size: self.size.unwrap_or(params.size),
            mu: self.mu.unwrap_or(params.mu),
            sigma: self.sigma.unwrap_or(params.sigma),
            starting_value: self.starting_value.unwrap_or(params.starting_value),
            frequency: self.frequency.unwrap_or(params.frequency),
        }
    }
}
