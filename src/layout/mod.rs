//! Mapping between the inside subset, the dense anchor order and the
//! framework blob layout.
//!
//! Dense order is `(row, col, base)` with the base anchor innermost. The
//! blobs are channel-major: labels `(1, 1, A * H, W)` and per-anchor vectors
//! `(1, A * 5, H, W)`.

use crate::anchor::FeatureSize;
use crate::assign::Label;
use crate::codec::TARGET_DIM;
use crate::util::{AnchorTargetError, AnchorTargetResult};

/// Writes `values[k]` to `out[indices[k]]` in a `total`-sized buffer of `fill`.
///
/// `T` may itself be a row such as `[f64; 5]`.
pub fn scatter<T: Copy>(
    values: &[T],
    indices: &[usize],
    total: usize,
    fill: T,
) -> AnchorTargetResult<Vec<T>> {
    if values.len() != indices.len() {
        return Err(AnchorTargetError::ShapeMismatch {
            expected_rows: indices.len(),
            expected_cols: 1,
            rows: values.len(),
            cols: 1,
        });
    }
    let mut out = vec![fill; total];
    for (&idx, &value) in indices.iter().zip(values) {
        let slot = out
            .get_mut(idx)
            .ok_or(AnchorTargetError::InvalidInput("scatter index out of range"))?;
        *slot = value;
    }
    Ok(out)
}

/// Reads `dense[indices[k]]` for every `k`.
pub fn gather<T: Copy>(dense: &[T], indices: &[usize]) -> AnchorTargetResult<Vec<T>> {
    indices
        .iter()
        .map(|&idx| {
            dense
                .get(idx)
                .copied()
                .ok_or(AnchorTargetError::InvalidInput("gather index out of range"))
        })
        .collect()
}

/// The four output blobs in framework layout.
#[derive(Clone, Debug)]
pub struct DenseTargets {
    size: FeatureSize,
    num_base: usize,
    labels: Vec<Label>,
    targets: Vec<f64>,
    inside_weights: Vec<f64>,
    outside_weights: Vec<f64>,
}

impl DenseTargets {
    /// Transposes dense-order arrays (length `H * W * A`) into blob layout.
    pub fn from_dense(
        size: FeatureSize,
        num_base: usize,
        labels: &[Label],
        targets: &[[f64; TARGET_DIM]],
        inside_weights: &[[f64; TARGET_DIM]],
        outside_weights: &[[f64; TARGET_DIM]],
    ) -> AnchorTargetResult<Self> {
        let total = size.cells() * num_base;
        for len in [
            labels.len(),
            targets.len(),
            inside_weights.len(),
            outside_weights.len(),
        ] {
            if len != total {
                return Err(AnchorTargetError::ShapeMismatch {
                    expected_rows: total,
                    expected_cols: 1,
                    rows: len,
                    cols: 1,
                });
            }
        }

        let plane = size.cells();
        let mut out = Self {
            size,
            num_base,
            labels: vec![Label::Ignore; total],
            targets: vec![0.0; total * TARGET_DIM],
            inside_weights: vec![0.0; total * TARGET_DIM],
            outside_weights: vec![0.0; total * TARGET_DIM],
        };
        for dense in 0..total {
            let base = dense % num_base;
            let cell = dense / num_base;
            out.labels[base * plane + cell] = labels[dense];
            for c in 0..TARGET_DIM {
                let blob = (base * TARGET_DIM + c) * plane + cell;
                out.targets[blob] = targets[dense][c];
                out.inside_weights[blob] = inside_weights[dense][c];
                out.outside_weights[blob] = outside_weights[dense][c];
            }
        }
        Ok(out)
    }

    pub fn feature_size(&self) -> FeatureSize {
        self.size
    }

    pub fn num_base(&self) -> usize {
        self.num_base
    }

    /// Shape of the label blob: `[1, 1, A * H, W]`.
    pub fn label_shape(&self) -> [usize; 4] {
        [1, 1, self.num_base * self.size.height, self.size.width]
    }

    /// Shape of the target and weight blobs: `[1, A * 5, H, W]`.
    pub fn target_shape(&self) -> [usize; 4] {
        [
            1,
            self.num_base * TARGET_DIM,
            self.size.height,
            self.size.width,
        ]
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn inside_weights(&self) -> &[f64] {
        &self.inside_weights
    }

    pub fn outside_weights(&self) -> &[f64] {
        &self.outside_weights
    }

    /// Label of base anchor `base` at cell `(row, col)`.
    pub fn label_at(&self, base: usize, row: usize, col: usize) -> Option<Label> {
        if base >= self.num_base || row >= self.size.height || col >= self.size.width {
            return None;
        }
        self.labels
            .get(base * self.size.cells() + row * self.size.width + col)
            .copied()
    }

    /// Regression target of base anchor `base` at cell `(row, col)`.
    pub fn target_at(&self, base: usize, row: usize, col: usize) -> Option<[f64; TARGET_DIM]> {
        self.vector_at(&self.targets, base, row, col)
    }

    pub fn inside_weight_at(
        &self,
        base: usize,
        row: usize,
        col: usize,
    ) -> Option<[f64; TARGET_DIM]> {
        self.vector_at(&self.inside_weights, base, row, col)
    }

    pub fn outside_weight_at(
        &self,
        base: usize,
        row: usize,
        col: usize,
    ) -> Option<[f64; TARGET_DIM]> {
        self.vector_at(&self.outside_weights, base, row, col)
    }

    fn vector_at(
        &self,
        blob: &[f64],
        base: usize,
        row: usize,
        col: usize,
    ) -> Option<[f64; TARGET_DIM]> {
        if base >= self.num_base || row >= self.size.height || col >= self.size.width {
            return None;
        }
        let plane = self.size.cells();
        let cell = row * self.size.width + col;
        let mut out = [0.0; TARGET_DIM];
        for (c, slot) in out.iter_mut().enumerate() {
            *slot = *blob.get((base * TARGET_DIM + c) * plane + cell)?;
        }
        Some(out)
    }
}
