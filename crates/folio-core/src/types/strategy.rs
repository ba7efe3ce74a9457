//! 자산배분 전략 키.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// 자산배분 전략 식별자.
///
/// 레지스트리는 이 키의 엄격한 동등성으로 포트폴리오 경로를 찾습니다.
/// 파싱은 대소문자를 구분하지 않으며 알려진 별칭을 정규화합니다.
/// 서비스가 새 전략을 지원하면 `Custom`으로 표현됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StrategyKey {
    /// 동일 가중 (ew)
    EqualWeight,
    /// 평균-분산 최적화 (mvo)
    MeanVariance,
    /// 계층적 리스크 패리티 (hrp)
    HierarchicalRiskParity,
    /// 서비스가 추가로 제공하는 전략 (소문자 정규화된 키)
    Custom(String),
}

impl StrategyKey {
    /// 내장 전략 목록.
    pub const BUILTIN: [StrategyKey; 3] = [
        StrategyKey::EqualWeight,
        StrategyKey::MeanVariance,
        StrategyKey::HierarchicalRiskParity,
    ];

    /// 서비스에 전송되는 키.
    pub fn wire_key(&self) -> &str {
        match self {
            StrategyKey::EqualWeight => "ew",
            StrategyKey::MeanVariance => "mvo",
            StrategyKey::HierarchicalRiskParity => "hrp",
            StrategyKey::Custom(key) => key,
        }
    }

    /// 차트 범례 등에 쓰이는 표시 라벨.
    pub fn label(&self) -> String {
        self.wire_key().to_uppercase()
    }

    /// 전략 설명.
    pub fn description(&self) -> &str {
        match self {
            StrategyKey::EqualWeight => "Equal weight",
            StrategyKey::MeanVariance => "Mean-variance optimization",
            StrategyKey::HierarchicalRiskParity => "Hierarchical risk parity",
            StrategyKey::Custom(_) => "Service-provided strategy",
        }
    }

    pub fn is_mean_variance(&self) -> bool {
        matches!(self, StrategyKey::MeanVariance)
    }
}

impl Default for StrategyKey {
    fn default() -> Self {
        StrategyKey::EqualWeight
    }
}

impl fmt::Display for StrategyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_key())
    }
}

impl FromStr for StrategyKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        match key.as_str() {
            "" => Err(CoreError::InvalidInput("Empty strategy key".to_string())),
            "ew" | "equal" => Ok(StrategyKey::EqualWeight),
            "mvo" => Ok(StrategyKey::MeanVariance),
            "hrp" => Ok(StrategyKey::HierarchicalRiskParity),
            _ if key.chars().any(char::is_whitespace) => Err(CoreError::InvalidInput(format!(
                "Strategy key must not contain whitespace: {:?}",
                s
            ))),
            _ => Ok(StrategyKey::Custom(key)),
        }
    }
}

impl TryFrom<String> for StrategyKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StrategyKey> for String {
    fn from(key: StrategyKey) -> Self {
        key.wire_key().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys_and_aliases() {
        assert_eq!("ew".parse::<StrategyKey>().unwrap(), StrategyKey::EqualWeight);
        assert_eq!("Equal".parse::<StrategyKey>().unwrap(), StrategyKey::EqualWeight);
        assert_eq!(" MVO ".parse::<StrategyKey>().unwrap(), StrategyKey::MeanVariance);
        assert_eq!(
            "hrp".parse::<StrategyKey>().unwrap(),
            StrategyKey::HierarchicalRiskParity
        );
    }

    #[test]
    fn test_custom_keys_are_strict() {
        // 접두사가 같아도 서로 다른 키
        let ew2: StrategyKey = "EW2".parse().unwrap();
        assert_eq!(ew2, StrategyKey::Custom("ew2".to_string()));
        assert_ne!(ew2, StrategyKey::EqualWeight);
        assert_eq!(ew2.label(), "EW2");
    }

    #[test]
    fn test_invalid_keys() {
        assert!("".parse::<StrategyKey>().is_err());
        assert!("min var".parse::<StrategyKey>().is_err());
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let json = serde_json::to_string(&StrategyKey::MeanVariance).unwrap();
        assert_eq!(json, "\"mvo\"");
        let key: StrategyKey = serde_json::from_str("\"HRP\"").unwrap();
        assert_eq!(key, StrategyKey::HierarchicalRiskParity);
    }
}
