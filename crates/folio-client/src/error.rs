//! 서비스 클라이언트 에러 타입.

use thiserror::Error;

/// 시뮬레이션/자산배분 서비스 호출 에러.
#[derive(Debug, Error)]
pub enum ClientError {
    /// 네트워크 도달 불가 또는 타임아웃
    #[error("Transport error: {0}")]
    Transport(String),

    /// 성공이 아닌 상태 코드 또는 서비스가 보고한 에러 메시지
    #[error("Service error {status}: {message}")]
    Service { status: u16, message: String },

    /// 응답 본문이 기대한 형태가 아님
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// 필요한 입력이 없어 요청을 보내지 않음 (실패가 아닌 no-op)
    #[error("Precondition not met, request skipped: {0}")]
    PreconditionSkipped(String),
}

impl ClientError {
    /// 재시도 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Service { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// 요청 자체를 보내지 않은 경우인지 확인.
    pub fn is_skipped(&self) -> bool {
        matches!(self, ClientError::PreconditionSkipped(_))
    }

    /// 로그 필드용 에러 분류.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "transport",
            ClientError::Service { .. } => "service",
            ClientError::MalformedResponse(_) => "malformed_response",
            ClientError::PreconditionSkipped(_) => "precondition_skipped",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Service {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::MalformedResponse(err.to_string())
    }
}

impl From<folio_core::CoreError> for ClientError {
    fn from(err: folio_core::CoreError) -> Self {
        ClientError::MalformedResponse(err.to_string())
    }
}

/// 클라이언트 작업을 위한 Result 타입.
pub type ClientResult<T> = Result<T, ClientError>;
