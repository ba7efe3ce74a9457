//! 공통 명령줄 인자.

use clap::Args;
use folio_core::{Frequency, ParameterUpdate};

/// 시뮬레이션 파라미터 인자. 지정하지 않은 값은 기본값을 유지합니다.
#[derive(Debug, Clone, Default, Args)]
pub struct SimulationArgs {
    /// 시뮬레이션 경로(자산) 수
    #[arg(long)]
    pub samples: Option<u32>,

    /// 시간 스텝 수 (행 길이는 size + 1)
    #[arg(long)]
    pub size: Option<u32>,

    /// 스텝당 기대 수익률 (drift)
    #[arg(long, allow_negative_numbers = true)]
    pub mu: Option<f64>,

    /// 스텝당 변동성
    #[arg(long)]
    pub sigma: Option<f64>,

    /// 시작 가격
    #[arg(long)]
    pub starting_value: Option<f64>,

    /// 시간 간격 (daily, weekly, monthly)
    #[arg(long)]
    pub frequency: Option<Frequency>,
}

impl SimulationArgs {
    pub fn to_update(&self) -> ParameterUpdate {
        ParameterUpdate {
            samples: self.samples,
            size: self.size,
            mu: self.mu,
            sigma: self.sigma,
            starting_value: self.starting_value,
            frequency: self.frequency.map(Some),
            strategy: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_update_keeps_unset_fields_empty() {
        let args = SimulationArgs {
            samples: Some(20),
            frequency: Some(Frequency::Weekly),
            ..Default::default()
        };
        let update = args.to_update();

        assert_eq!(update.samples, Some(20));
        assert_eq!(update.frequency, Some(Some(Frequency::Weekly)));
        assert!(update.size.is_none());
        assert!(update.touches_simulation());
        assert!(SimulationArgs::default().to_update().is_empty());
    }
}
