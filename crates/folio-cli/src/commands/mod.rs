//! CLI 명령어 구현 모듈.

pub mod args;
pub mod explore;
pub mod session;
pub mod show_config;
pub mod simulate;
