//! 시뮬레이션 가격 행렬.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// 시뮬레이션 결과 가격 행렬.
///
/// 행 하나가 시뮬레이션 경로 하나(자산 하나)이고, 열은 시간 스텝입니다.
/// 모든 행의 길이는 같습니다 (시작 가격 포함 `size + 1`).
/// 생성 후에는 변경되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct PriceMatrix {
    rows: Vec<Vec<f64>>,
}

impl PriceMatrix {
    /// 행 목록에서 가격 행렬을 생성합니다.
    ///
    /// # Errors
    /// 행 길이가 서로 다르면 `CoreError::Matrix`를 반환합니다.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> CoreResult<Self> {
        if let Some(first) = rows.first() {
            let expected = first.len();
            if let Some((idx, row)) = rows
                .iter()
                .enumerate()
                .find(|(_, row)| row.len() != expected)
            {
                return Err(CoreError::Matrix(format!(
                    "row {} has {} values, expected {}",
                    idx,
                    row.len(),
                    expected
                )));
            }
        }
        Ok(Self { rows })
    }

    /// 빈 행렬.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// 자산(경로) 수.
    pub fn num_assets(&self) -> usize {
        self.rows.len()
    }

    /// 시간 스텝 수 (열 수).
    pub fn num_steps(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// (행, 열) 형태.
    pub fn shape(&self) -> (usize, usize) {
        (self.num_assets(), self.num_steps())
    }

    /// 자산배분 요청에 쓸 수 있는지 확인합니다.
    ///
    /// 행이 하나 이상 있고 모든 행이 비어 있지 않아야 합니다.
    pub fn is_usable(&self) -> bool {
        !self.rows.is_empty() && self.rows.iter().all(|row| !row.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }
}

impl TryFrom<Vec<Vec<f64>>> for PriceMatrix {
    type Error = CoreError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<PriceMatrix> for Vec<Vec<f64>> {
    fn from(matrix: PriceMatrix) -> Self {
        matrix.rows
    }
}
