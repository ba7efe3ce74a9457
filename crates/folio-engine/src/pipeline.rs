//! 명령 파이프라인.
//!
//! 단일 구독 태스크가 mpsc 채널에서 `EngineCommand`를 받아 엔진에 전달합니다.
//! 디바운스 윈도우 안에 연속으로 들어온 파라미터 업데이트는 하나로 합쳐
//! 시뮬레이션 요청을 한 번만 보냅니다. 네트워크 작업은 각자 태스크로 실행되고
//! 세대 태그로 순서가 정리됩니다.

use folio_core::{EngineSettings, ParameterUpdate, StrategyKey};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::engine::{AllocateOutcome, PortfolioEngine, RefreshOutcome};
use crate::store::FetchTicket;
use crate::{EngineError, EngineResult};

/// 파이프라인 명령.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// 파라미터 부분 업데이트
    Update(ParameterUpdate),
    /// 같은 파라미터로 데이터 새로고침
    Refresh,
    /// 지정한 전략으로 자산배분
    Allocate(StrategyKey),
    /// 선택된 전략으로 자산배분
    AllocateSelected,
    /// 기본값으로 초기화하고 기본 파라미터로 다시 시뮬레이션
    Reset,
}

/// 실행 중인 파이프라인 핸들.
pub struct PipelineHandle {
    tx: mpsc::Sender<EngineCommand>,
    task: JoinHandle<()>,
}

impl PipelineHandle {
    /// 명령을 보냅니다.
    pub async fn send(&self, command: EngineCommand) -> EngineResult<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| EngineError::ChannelClosed)
    }

    /// 채널을 닫고 진행 중인 작업이 모두 끝날 때까지 기다립니다.
    pub async fn shutdown(self) -> EngineResult<()> {
        drop(self.tx);
        self.task
            .await
            .map_err(|e| EngineError::TaskFailed(e.to_string()))
    }
}

/// 파이프라인 태스크를 시작합니다.
pub fn spawn_pipeline(engine: Arc<PortfolioEngine>, settings: &EngineSettings) -> PipelineHandle {
    let (tx, rx) = mpsc::channel(settings.command_buffer_size.max(1));
    let debounce = Duration::from_millis(settings.debounce_ms);

    let task = tokio::spawn(run_pipeline(engine, rx, debounce));
    info!(debounce_ms = settings.debounce_ms, "Command pipeline started");

    PipelineHandle { tx, task }
}

async fn run_pipeline(
    engine: Arc<PortfolioEngine>,
    mut rx: mpsc::Receiver<EngineCommand>,
    debounce: Duration,
) {
    let mut tasks = JoinSet::new();

    loop {
        tokio::select! {
            command = rx.recv() => {
                let Some(command) = command else { break };

                let deferred = match command {
                    EngineCommand::Update(update) => {
                        let (update, deferred) = collect_updates(&mut rx, update, debounce).await;
                        if let Some(ticket) = engine.begin_update(&update).await {
                            spawn_fetch(&mut tasks, &engine, ticket);
                        }
                        deferred
                    }
                    other => Some(other),
                };

                if let Some(command) = deferred {
                    dispatch(&mut tasks, &engine, command).await;
                }
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    warn!(error = %e, "Pipeline task ended abnormally");
                }
            }
        }
    }

    debug!(in_flight = tasks.len(), "Command channel closed, draining");
    while tasks.join_next().await.is_some() {}
    info!("Command pipeline stopped");
}

/// 디바운스 윈도우 동안 이어지는 업데이트를 합칩니다.
///
/// 업데이트가 아닌 명령이 오면 거기서 멈추고 그 명령을 돌려줍니다.
async fn collect_updates(
    rx: &mut mpsc::Receiver<EngineCommand>,
    first: ParameterUpdate,
    debounce: Duration,
) -> (ParameterUpdate, Option<EngineCommand>) {
    let mut merged = first;
    if debounce.is_zero() {
        return (merged, None);
    }

    let deadline = Instant::now() + debounce;
    let mut count = 1usize;
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Some(EngineCommand::Update(next))) => {
                merged = merged.merge(next);
                count += 1;
            }
            Ok(Some(other)) => {
                debug!(merged = count, "Debounce interrupted by another command");
                return (merged, Some(other));
            }
            Ok(None) | Err(_) => break,
        }
    }

    if count > 1 {
        debug!(merged = count, "Parameter updates debounced");
    }
    (merged, None)
}

async fn dispatch(
    tasks: &mut JoinSet<()>,
    engine: &Arc<PortfolioEngine>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::Update(update) => {
            if let Some(ticket) = engine.begin_update(&update).await {
                spawn_fetch(tasks, engine, ticket);
            }
        }
        EngineCommand::Refresh => {
            let ticket = engine.begin_refresh().await;
            spawn_fetch(tasks, engine, ticket);
        }
        EngineCommand::Allocate(strategy) => {
            let engine = Arc::clone(engine);
            tasks.spawn(async move {
                log_allocate(engine.allocate(strategy).await);
            });
        }
        EngineCommand::AllocateSelected => {
            let engine = Arc::clone(engine);
            tasks.spawn(async move {
                log_allocate(engine.allocate_selected().await);
            });
        }
        EngineCommand::Reset => {
            let ticket = engine.begin_reset().await;
            spawn_fetch(tasks, engine, ticket);
        }
    }
}

fn spawn_fetch(tasks: &mut JoinSet<()>, engine: &Arc<PortfolioEngine>, ticket: FetchTicket) {
    let engine = Arc::clone(engine);
    tasks.spawn(async move {
        match engine.run_fetch(ticket).await {
            RefreshOutcome::Failed { generation, error } => {
                warn!(generation, error = %error, "Simulation request failed");
            }
            outcome => debug!(?outcome, "Simulation request finished"),
        }
    });
}

fn log_allocate(outcome: AllocateOutcome) {
    match outcome {
        AllocateOutcome::Failed(error) => warn!(error = %error, "Allocation request failed"),
        outcome => debug!(?outcome, "Allocation request finished"),
    }
}
