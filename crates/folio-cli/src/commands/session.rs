//! 대화형 세션.
//!
//! 표준 입력에서 한 줄씩 명령을 읽어 명령 파이프라인으로 보냅니다.
//! 레지스트리가 바뀔 때마다 한 줄 요약을 출력합니다.
//!
//! ```text
//! set samples 20
//! set mu 0.01
//! select hrp
//! allocate
//! allocate mvo
//! refresh
//! show
//! reset
//! quit
//! ```

use anyhow::{anyhow, bail, Result};
use folio_client::ServiceClient;
use folio_core::{AppConfig, Frequency, ParameterUpdate, StrategyKey};
use folio_engine::{spawn_pipeline, EngineCommand, PortfolioEngine};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::render::{format_parameters, format_registry_table};

const HELP: &str = "\
Commands:
  set <field> <value>   samples | size | mu | sigma | starting_value | frequency | strategy
                        (`set frequency default` restores the service default)
  select <strategy>     choose the strategy used by `allocate`
  allocate [strategy]   allocate the given (or selected) strategy
  refresh               fetch new simulation data with the same parameters
  show                  print parameters and portfolio paths
  reset                 restore defaults, clear every path and fetch new data
  help                  show this message
  quit                  leave the session";

/// 세션 한 줄을 해석한 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Engine(EngineCommand),
    Show,
    Help,
    Quit,
}

/// 입력 한 줄을 해석합니다. 빈 줄이면 `None`.
pub fn parse_line(line: &str) -> Result<Option<SessionCommand>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (head.to_lowercase().as_str(), rest.as_slice()) {
        ("set", [field, value]) => SessionCommand::Engine(EngineCommand::Update(parse_field(
            field, value,
        )?)),
        ("set", _) => bail!("usage: set <field> <value>"),
        ("select", [strategy]) => SessionCommand::Engine(EngineCommand::Update(
            ParameterUpdate::default().with_strategy(strategy.parse()?),
        )),
        ("allocate", []) => SessionCommand::Engine(EngineCommand::AllocateSelected),
        ("allocate", [strategy]) => {
            SessionCommand::Engine(EngineCommand::Allocate(strategy.parse()?))
        }
        ("refresh", []) => SessionCommand::Engine(EngineCommand::Refresh),
        ("reset", []) => SessionCommand::Engine(EngineCommand::Reset),
        ("show", []) => SessionCommand::Show,
        ("help" | "?", _) => SessionCommand::Help,
        ("quit" | "exit", _) => SessionCommand::Quit,
        (other, _) => bail!("unknown command: {} (try `help`)", other),
    };
    Ok(Some(command))
}

fn parse_field(field: &str, value: &str) -> Result<ParameterUpdate> {
    let update = ParameterUpdate::default();
    let update = match field.to_lowercase().as_str() {
        "samples" => update.with_samples(value.parse()?),
        "size" => update.with_size(value.parse()?),
        "mu" => update.with_mu(value.parse()?),
        "sigma" => update.with_sigma(value.parse()?),
        "starting_value" | "start" => update.with_starting_value(value.parse()?),
        "frequency" => match value.to_lowercase().as_str() {
            "default" | "none" => update.clear_frequency(),
            _ => update.with_frequency(value.parse::<Frequency>()?),
        },
        "strategy" => update.with_strategy(value.parse::<StrategyKey>()?),
        other => return Err(anyhow!("unknown field: {}", other)),
    };
    Ok(update)
}

/// 대화형 세션을 실행합니다.
pub async fn run_session(config: &AppConfig) -> Result<()> {
    let client = ServiceClient::new(&config.service)?;
    info!(base_url = client.base_url(), "Session started");

    let engine = Arc::new(PortfolioEngine::with_service(
        Arc::new(client),
        config.engine.clone(),
    ));
    let pipeline = spawn_pipeline(Arc::clone(&engine), &config.engine);

    // 레지스트리 변경 알림
    let mut registry_rx = engine.subscribe();
    let watcher = tokio::spawn(async move {
        while registry_rx.changed().await.is_ok() {
            let registry = registry_rx.borrow_and_update().clone();
            let labels: Vec<String> = registry.iter().map(|p| p.label()).collect();
            println!("[registry] {} path(s): {}", registry.len(), labels.join(", "));
        }
    });

    // 시작 시 현재 파라미터로 한 번 받아 둠
    pipeline.send(EngineCommand::Refresh).await?;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {}", e);
                continue;
            }
        };
        debug!(?command, "Session command");

        match command {
            SessionCommand::Engine(command) => pipeline.send(command).await?,
            SessionCommand::Show => {
                println!("{}", format_parameters(&engine.parameters().await));
                println!("selected strategy: {}", engine.selected_strategy().await);
                println!("{}", format_registry_table(&engine.snapshot()));
            }
            SessionCommand::Help => println!("{}", HELP),
            SessionCommand::Quit => break,
        }
    }

    pipeline.shutdown().await?;
    watcher.abort();
    info!("Session ended");
    Ok(())
}
