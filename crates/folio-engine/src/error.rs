//! 엔진 에러 타입.

use thiserror::Error;

/// 엔진 파이프라인 에러.
///
/// 서비스 호출 실패는 에러가 아니라 결과 값(`AllocateOutcome` 등)으로 보고됩니다.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("파이프라인 채널이 닫힘")]
    ChannelClosed,

    #[error("파이프라인 작업 종료 실패: {0}")]
    TaskFailed(String),
}

/// 엔진 작업을 위한 Result 타입.
pub type EngineResult<T> = Result<T, EngineError>;
