//! 포트폴리오 탐색을 위한 도메인 모델.

mod color;
mod portfolio_path;
mod valuation;

pub use color::*;
pub use portfolio_path::*;
pub use valuation::*;
