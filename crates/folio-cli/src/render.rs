//! 터미널 출력 형식.

use anyhow::{Context, Result};
use folio_core::{PriceMatrix, SimulationParameters, TrajectorySummary};
use folio_engine::Registry;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!(
                "Invalid format: {}. Use: table, csv, json",
                s
            )),
        }
    }
}

/// 레지스트리를 지정한 형식으로 출력합니다.
pub fn render_registry(registry: &Registry, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_registry_table(registry)),
        OutputFormat::Csv => Ok(format_registry_csv(registry)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(registry).context("Failed to serialize to JSON")
        }
    }
}

/// 테이블 형식 출력.
pub fn format_registry_table(registry: &Registry) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<10} {:<20} {:>6} {:>16} {:>16} {:>16} {:>16} {:>10}\n",
        "STRATEGY", "COLOR", "GEN", "START", "END", "MIN", "MAX", "RETURN"
    ));
    output.push_str(&"-".repeat(118));
    output.push('\n');

    for path in registry.iter() {
        let summary = path.summary();
        output.push_str(&format!(
            "{:<10} {:<20} {:>6} {:>16} {:>16} {:>16} {:>16} {:>10}\n",
            path.label(),
            path.color.border_css(),
            path.generation,
            money(summary.map(|s| s.first)),
            money(summary.map(|s| s.last)),
            money(summary.map(|s| s.min)),
            money(summary.map(|s| s.max)),
            percent(summary),
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {} portfolio paths", registry.len()));
    output
}

/// CSV 형식 출력 (전략별 한 줄, 궤적 값 전체 포함).
pub fn format_registry_csv(registry: &Registry) -> String {
    let mut output = String::from("strategy,color,generation,weights,trajectory\n");

    for path in registry.iter() {
        output.push_str(&format!(
            "{},{},{},\"{}\",\"{}\"\n",
            path.strategy,
            path.color.border_css().replace(", ", " "),
            path.generation,
            join(path.weights.iter()),
            join(path.trajectory.iter()),
        ));
    }

    output
}

/// 가격 행렬 요약 테이블.
pub fn format_matrix_table(matrix: &PriceMatrix) -> String {
    let (rows, columns) = matrix.shape();
    let mut output = format!("Price matrix: {} paths x {} steps\n\n", rows, columns);

    output.push_str(&format!(
        "{:<6} {:>12} {:>12} {:>12} {:>12} {:>10}\n",
        "PATH", "START", "END", "MIN", "MAX", "RETURN"
    ));
    output.push_str(&"-".repeat(69));
    output.push('\n');

    for (idx, row) in matrix.rows().iter().enumerate() {
        let summary = TrajectorySummary::from_values(row);
        output.push_str(&format!(
            "{:<6} {:>12} {:>12} {:>12} {:>12} {:>10}\n",
            idx,
            price(summary.map(|s| s.first)),
            price(summary.map(|s| s.last)),
            price(summary.map(|s| s.min)),
            price(summary.map(|s| s.max)),
            percent(summary),
        ));
    }

    output
}

/// 현재 파라미터 한 줄 요약.
pub fn format_parameters(params: &SimulationParameters) -> String {
    let frequency = params
        .frequency
        .map(|f| f.to_string())
        .unwrap_or_else(|| "service default".to_string());
    format!(
        "samples={} size={} mu={} sigma={} starting_value={} frequency={}",
        params.samples, params.size, params.mu, params.sigma, params.starting_value, frequency
    )
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
}

fn percent(summary: Option<TrajectorySummary>) -> String {
    summary.map_or_else(
        || "-".to_string(),
        |s| format!("{:+.2}%", s.total_return_pct),
    )
}

fn join<'a>(values: impl Iterator<Item = &'a f64>) -> String {
    values
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(";")
}
