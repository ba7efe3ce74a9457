//! # Folio Core
//!
//! 몬테카를로 포트폴리오 탐색기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시뮬레이션 파라미터 및 가격 행렬
//! - 자산배분 전략 키와 가중치 벡터
//! - 포트폴리오 경로와 표시 색상
//! - 포트폴리오 가치 계산 (순수 함수)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use self::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
