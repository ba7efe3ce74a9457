//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! TOML 파일을 읽은 뒤 `FOLIO__` 접두사 환경 변수로 덮어씁니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 기본 서비스 주소 (로컬 개발 서버).
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 외부 계산 서비스 설정
    #[serde(default)]
    pub service: ServiceConfig,
    /// 엔진 설정
    #[serde(default)]
    pub engine: EngineSettings,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 외부 시뮬레이션/자산배분 서비스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// 서비스 기본 URL (없으면 환경 변수, 그다음 로컬 기본값)
    #[serde(default)]
    pub base_url: Option<String>,
    /// 시뮬레이션 엔드포인트 경로
    #[serde(default = "default_simulate_path")]
    pub simulate_path: String,
    /// 자산배분 엔드포인트 경로
    #[serde(default = "default_allocate_path")]
    pub allocate_path: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 평균-분산 최적화 옵션 (mvo 요청에만 전송)
    #[serde(default)]
    pub mvo: Option<MvoConfig>,
}

fn default_simulate_path() -> String {
    "/simulate".to_string()
}
fn default_allocate_path() -> String {
    "/allocate".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            simulate_path: default_simulate_path(),
            allocate_path: default_allocate_path(),
            timeout_secs: default_timeout_secs(),
            mvo: None,
        }
    }
}

impl ServiceConfig {
    /// 서비스 기본 URL을 결정합니다.
    ///
    /// 우선순위: 설정값 → `FOLIO_SITE_URL` → `VERCEL_URL` → `http://localhost:3000`.
    pub fn resolve_base_url(&self) -> String {
        self.resolve_base_url_with(|key| std::env::var(key).ok())
    }

    /// 환경 조회 함수를 주입받아 기본 URL을 결정합니다.
    pub fn resolve_base_url_with<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = self
            .base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| lookup("FOLIO_SITE_URL").filter(|s| !s.trim().is_empty()))
            .or_else(|| lookup("VERCEL_URL").filter(|s| !s.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            // 배포 환경 변수는 스킴 없이 호스트만 주는 경우가 있음
            format!("https://{}", trimmed)
        }
    }
}

/// 평균-분산 최적화 옵션.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MvoConfig {
    /// 공분산 정규화 계수
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regularization: Option<f64>,
    /// 공분산 수축 계수
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrinkage: Option<f64>,
}

/// 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// 재동기화 시 동시 자산배분 요청 수
    #[serde(default = "default_resync_concurrency")]
    pub resync_concurrency: usize,
    /// 파라미터 변경 디바운스 윈도우 (밀리초, 0이면 비활성)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// 색상 배정 시드 (재현 가능한 색상이 필요할 때)
    #[serde(default)]
    pub color_seed: Option<u64>,
    /// 명령 채널 버퍼 크기
    #[serde(default = "default_command_buffer")]
    pub command_buffer_size: usize,
}

fn default_resync_concurrency() -> usize {
    4
}
fn default_debounce_ms() -> u64 {
    150
}
fn default_command_buffer() -> usize {
    64
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            resync_concurrency: default_resync_concurrency(),
            debounce_ms: default_debounce_ms(),
            color_seed: None,
            command_buffer_size: default_command_buffer(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 시뮬레이션/재동기화/자산배분 span의 시작과 종료도 기록
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }

    /// TOML 문자열에서 설정을 로드합니다.
    pub fn from_toml_str(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
