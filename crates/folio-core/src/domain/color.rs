//! 포트폴리오 경로 표시 색상.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 채도 (%)
const SATURATION: u8 = 70;
/// 선 색상 명도 (%)
const BORDER_LIGHTNESS: u8 = 50;
/// 배경 색상 명도 (%)
const BACKGROUND_LIGHTNESS: u8 = 30;
/// 기존 색상과 최소한 이만큼 떨어진 색상을 고르려고 시도합니다.
const MIN_HUE_GAP: u16 = 24;
const MAX_PICK_ATTEMPTS: usize = 8;

/// HSL 색상. 한 번 배정되면 해당 포트폴리오 경로가 사라질 때까지 유지됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathColor {
    hue: u16,
}

impl PathColor {
    pub fn from_hue(hue: u16) -> Self {
        Self { hue: hue % 360 }
    }

    pub fn hue(self) -> u16 {
        self.hue
    }

    /// 선 색상 (CSS).
    pub fn border_css(self) -> String {
        format!("hsl({}, {}%, {}%)", self.hue, SATURATION, BORDER_LIGHTNESS)
    }

    /// 배경 색상 (CSS).
    pub fn background_css(self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue, SATURATION, BACKGROUND_LIGHTNESS
        )
    }

    /// 색상환 위 거리.
    fn hue_distance(self, other: PathColor) -> u16 {
        let d = self.hue.abs_diff(other.hue);
        d.min(360 - d)
    }
}

impl fmt::Display for PathColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.border_css())
    }
}

/// 의사 난수로 새 색상을 배정합니다.
///
/// 시드를 주면 같은 순서로 같은 색상이 나옵니다.
/// 충돌이 없도록 노력하지만 보장하지는 않습니다.
#[derive(Debug)]
pub struct ColorPicker {
    rng: StdRng,
}

impl ColorPicker {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// 이미 사용 중인 색상과 가능한 한 떨어진 새 색상을 고릅니다.
    pub fn pick(&mut self, taken: &[PathColor]) -> PathColor {
        let mut candidate = PathColor::from_hue(self.rng.gen_range(0..360));
        for _ in 1..MAX_PICK_ATTEMPTS {
            if taken
                .iter()
                .all(|c| c.hue_distance(candidate) >= MIN_HUE_GAP)
            {
                break;
            }
            candidate = PathColor::from_hue(self.rng.gen_range(0..360));
        }
        candidate
    }
}

impl Default for ColorPicker {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css() {
        let color = PathColor::from_hue(420);
        assert_eq!(color.hue(), 60);
        assert_eq!(color.border_css(), "hsl(60, 70%, 50%)");
        assert_eq!(color.background_css(), "hsl(60, 70%, 30%)");
    }

    #[test]
    fn test_seeded_picker_is_reproducible() {
        let mut a = ColorPicker::new(Some(7));
        let mut b = ColorPicker::new(Some(7));
        for _ in 0..5 {
            assert_eq!(a.pick(&[]), b.pick(&[]));
        }
    }

    #[test]
    fn test_hue_distance_wraps() {
        let a = PathColor::from_hue(350);
        let b = PathColor::from_hue(10);
        assert_eq!(a.hue_distance(b), 20);
    }

    #[test]
    fn test_pick_spreads_hues() {
        let mut picker = ColorPicker::new(Some(42));
        let mut taken = Vec::new();
        for _ in 0..3 {
            let color = picker.pick(&taken);
            taken.push(color);
        }
        assert_eq!(taken.len(), 3);
        assert!(taken.iter().all(|c| c.hue() < 360));
    }
}
