//! 적용된 설정 출력.

use anyhow::{Context, Result};
use folio_core::AppConfig;

/// 파일과 환경 변수를 합친 최종 설정을 TOML로 출력합니다.
pub fn show_config(config: &AppConfig) -> Result<String> {
    let mut output =
        toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    output.push_str(&format!(
        "\n# resolved base URL: {}\n",
        config.service.resolve_base_url()
    ));
    Ok(output)
}
