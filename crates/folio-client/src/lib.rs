//! 시뮬레이션/자산배분 서비스 클라이언트.
//!
//! 이 crate는 외부 계산 서비스와의 통신을 제공합니다:
//! - 서비스 trait (`SimulationService`, `AllocationService`)
//! - reqwest 기반 HTTP 구현 (`ServiceClient`)
//! - 에러 분류 (`ClientError`)

pub mod error;
pub mod http;
pub mod traits;
mod wire;

pub use error::*;
pub use http::ServiceClient;
pub use traits::*;
