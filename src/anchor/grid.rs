//! Dense anchor grid built by shifting base anchors across the feature map.

use crate::anchor::{AnchorRecord, BaseAnchor, GridIndex};
use crate::geometry::OrientedBox;

/// Feature-map size in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureSize {
    pub height: usize,
    pub width: usize,
}

impl FeatureSize {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    pub fn cells(&self) -> usize {
        self.height * self.width
    }
}

/// All anchors for one feature map.
///
/// Anchors are enumerated row-major over cells with the base-anchor index
/// innermost: flat index `(row * W + col) * A + base`. Scatter and the output
/// layout depend on this order.
#[derive(Clone, Debug)]
pub struct AnchorGrid {
    size: FeatureSize,
    num_base: usize,
    stride: f64,
    anchors: Vec<OrientedBox>,
}

impl AnchorGrid {
    /// Translates every base anchor by `(col * stride, row * stride)`.
    pub fn build(base: &[BaseAnchor], stride: f64, size: FeatureSize) -> Self {
        let mut anchors = Vec::with_capacity(size.cells() * base.len());
        for row in 0..size.height {
            let shift_y = row as f64 * stride;
            for col in 0..size.width {
                let shift_x = col as f64 * stride;
                for anchor in base {
                    anchors.push(anchor.to_box().translated(shift_x, shift_y));
                }
            }
        }
        Self {
            size,
            num_base: base.len(),
            stride,
            anchors,
        }
    }

    pub fn size(&self) -> FeatureSize {
        self.size
    }

    /// Number of base anchors per cell.
    pub fn num_base(&self) -> usize {
        self.num_base
    }

    pub fn stride(&self) -> f64 {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Anchors in dense enumeration order.
    pub fn anchors(&self) -> &[OrientedBox] {
        &self.anchors
    }

    /// Flat index of the anchor at `idx`.
    pub fn flat_index(&self, idx: GridIndex) -> usize {
        (idx.row * self.size.width + idx.col) * self.num_base + idx.base
    }

    /// Grid position of flat index `flat`.
    pub fn grid_index(&self, flat: usize) -> GridIndex {
        let base = flat % self.num_base.max(1);
        let cell = flat / self.num_base.max(1);
        GridIndex {
            row: cell / self.size.width.max(1),
            col: cell % self.size.width.max(1),
            base,
        }
    }

    /// Returns the tagged anchor at flat index `flat`.
    pub fn record(&self, flat: usize) -> Option<AnchorRecord> {
        self.anchors.get(flat).map(|&bbox| AnchorRecord {
            bbox,
            index: self.grid_index(flat),
        })
    }

    /// Iterates over all tagged anchors in enumeration order.
    pub fn records(&self) -> impl Iterator<Item = AnchorRecord> + '_ {
        self.anchors
            .iter()
            .enumerate()
            .map(move |(flat, &bbox)| AnchorRecord {
                bbox,
                index: self.grid_index(flat),
            })
    }
}
