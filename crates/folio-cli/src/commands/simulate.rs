//! 시뮬레이션 단독 조회.

use anyhow::{Context, Result};
use folio_client::{ServiceClient, SimulationService};
use folio_core::{ServiceConfig, SimulationParameters};
use tracing::info;

use crate::commands::args::SimulationArgs;
use crate::render::{format_matrix_table, format_parameters, OutputFormat};

/// 가격 행렬을 한 번 받아 요약하거나 그대로 출력합니다.
pub async fn simulate(
    service: &ServiceConfig,
    args: &SimulationArgs,
    format: OutputFormat,
) -> Result<String> {
    let client = ServiceClient::new(service)?;
    let params = args.to_update().apply_to(&SimulationParameters::default());

    info!(base_url = client.base_url(), "{}", format_parameters(&params));
    let matrix = client
        .fetch_simulation(&params)
        .await
        .context("Simulation request failed")?;

    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&matrix).context("Failed to serialize to JSON")
        }
        OutputFormat::Csv => Ok(matrix
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Table => Ok(format_matrix_table(&matrix)),
    }
}
