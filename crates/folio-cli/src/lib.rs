//! Folio explorer CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 시뮬레이션 단독 조회
//! - 전략 비교 실행
//! - 대화형 세션
//! - 설정 확인

pub mod commands;
pub mod render;
