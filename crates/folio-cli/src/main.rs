//! Monte Carlo 포트폴리오 탐색기 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 기본 파라미터로 시뮬레이션 요약
//! folio simulate
//!
//! # 주간 간격 20개 경로로 ew, mvo, hrp 비교
//! folio explore --samples 20 --frequency weekly -s ew -s mvo -s hrp
//!
//! # 다른 서비스 주소로 대화형 세션
//! folio --base-url http://127.0.0.1:8080 session
//!
//! # 적용된 설정 확인
//! folio config
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use folio_cli::commands::args::SimulationArgs;
use folio_cli::commands::{explore, session, show_config, simulate};
use folio_cli::render::OutputFormat;
use folio_core::{init_logging, AppConfig, LogConfig, StrategyKey};
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Monte Carlo portfolio explorer - 시뮬레이션 경로별 자산배분 전략 비교", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    /// 서비스 기본 URL (설정 파일과 환경 변수보다 우선)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 가격 행렬 조회 및 요약
    Simulate {
        #[command(flatten)]
        params: SimulationArgs,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 시뮬레이션 후 여러 전략으로 자산배분하여 비교
    Explore {
        #[command(flatten)]
        params: SimulationArgs,

        /// 자산배분 전략 (반복 지정 가능, 예: -s ew -s mvo)
        #[arg(short, long = "strategy", default_value = "ew")]
        strategies: Vec<StrategyKey>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 대화형 세션 (표준 입력)
    Session,

    /// 적용된 설정 출력
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일은 선택
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration: {}", cli.config))?;
    if let Some(base_url) = cli.base_url {
        config.service.base_url = Some(base_url);
    }

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;
    debug!(config = %cli.config, "Configuration loaded");

    let result = match cli.command {
        Commands::Simulate { params, format } => {
            let format = OutputFormat::parse(&format)?;
            simulate::simulate(&config.service, &params, format)
                .await
                .map(|output| println!("{}", output))
        }

        Commands::Explore {
            params,
            strategies,
            format,
        } => {
            let format = OutputFormat::parse(&format)?;
            explore::explore(&config, &params, &strategies, format)
                .await
                .map(|output| println!("{}", output))
        }

        Commands::Session => session::run_session(&config).await,

        Commands::Config => show_config::show_config(&config).map(|output| print!("{}", output)),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
