//! Pairwise overlap between anchors and ground truth.
//!
//! The exact overlap measure is supplied by an [`OverlapOracle`]. Any closure
//! with the right signature is an oracle; [`SampledEllipseOverlap`] is a
//! reference implementation for elliptical footprints.

mod sampled;

#[cfg(feature = "rayon")]
mod rayon;

pub use sampled::SampledEllipseOverlap;

use crate::geometry::OrientedBox;
use crate::util::{AnchorTargetError, AnchorTargetResult};

/// Dense row-major `N x K` overlap table (row = anchor, column = ground truth).
#[derive(Clone, Debug, PartialEq)]
pub struct OverlapMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl OverlapMatrix {
    /// Wraps a row-major buffer, checking its length and that every value
    /// lies in `[0, 1]`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> AnchorTargetResult<Self> {
        let expected = rows.checked_mul(cols).ok_or(AnchorTargetError::InvalidInput(
            "overlap matrix dimensions overflow",
        ))?;
        if data.len() != expected {
            return Err(AnchorTargetError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: data.len() / cols.max(1),
                cols,
            });
        }
        if data.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(AnchorTargetError::InvalidInput(
                "overlap values must lie in [0, 1]",
            ));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a matrix from per-anchor rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> AnchorTargetResult<Self> {
        let n = rows.len();
        let k = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|row| row.len() != k) {
            return Err(AnchorTargetError::ShapeMismatch {
                expected_rows: n,
                expected_cols: k,
                rows: n,
                cols: bad.len(),
            });
        }
        Self::new(rows.into_iter().flatten().collect(), n, k)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns the row for anchor `i`.
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.rows {
            return None;
        }
        let start = i * self.cols;
        self.data.get(start..start + self.cols)
    }

    /// Returns the value at `(i, j)` if in range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.rows || j >= self.cols {
            return None;
        }
        self.data.get(i * self.cols + j).copied()
    }

    /// Fails with `ShapeMismatch` unless the matrix is `rows x cols`.
    pub fn expect_shape(&self, rows: usize, cols: usize) -> AnchorTargetResult<()> {
        if self.rows != rows || self.cols != cols {
            return Err(AnchorTargetError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

/// External overlap measure between two sets of oriented boxes.
pub trait OverlapOracle {
    /// Returns the `anchors.len() x gt.len()` overlap table, values in `[0, 1]`.
    fn compute_overlap(
        &self,
        anchors: &[OrientedBox],
        gt: &[OrientedBox],
    ) -> AnchorTargetResult<OverlapMatrix>;
}

impl<F> OverlapOracle for F
where
    F: Fn(&[OrientedBox], &[OrientedBox]) -> AnchorTargetResult<OverlapMatrix>,
{
    fn compute_overlap(
        &self,
        anchors: &[OrientedBox],
        gt: &[OrientedBox],
    ) -> AnchorTargetResult<OverlapMatrix> {
        self(anchors, gt)
    }
}
