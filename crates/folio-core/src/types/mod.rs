//! 시스템 전반에서 사용되는 공통 타입.

mod matrix;
mod params;
mod strategy;
mod weights;

pub use matrix::*;
pub use params::*;
pub use strategy::*;
pub use weights::*;
