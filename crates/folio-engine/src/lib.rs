//! 포트폴리오 탐색 엔진.
//!
//! 이 crate는 클라이언트 측 오케스트레이션을 제공합니다:
//! - 세대 태그가 붙은 파라미터 저장소
//! - 전략 키별 포트폴리오 경로 레지스트리
//! - 시뮬레이션 → 재동기화 → 가치 계산을 묶는 동기화 엔진
//! - 디바운스되는 명령 파이프라인

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod store;

pub use engine::{AllocateOutcome, PortfolioEngine, RefreshOutcome, ResyncOutcome, ResyncReport};
pub use error::*;
pub use pipeline::{spawn_pipeline, EngineCommand, PipelineHandle};
pub use registry::{Registry, UpsertKind};
pub use store::{FetchTicket, ParameterStore};
