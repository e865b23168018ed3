//! Selection of the anchors that lie inside the (padded) image.

use crate::anchor::AnchorGrid;
use crate::geometry::{inside_bounds, rotated_corners, ImageBounds, OrientedBox};
use crate::trace::{trace_event, trace_span};

/// Anchors that passed the boundary test, with their dense indices.
#[derive(Clone, Debug, Default)]
pub struct InsideSubset {
    indices: Vec<usize>,
    anchors: Vec<OrientedBox>,
    total: usize,
}

impl InsideSubset {
    /// Strictly increasing dense indices of the inside anchors.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Inside anchors, parallel to [`Self::indices`].
    pub fn anchors(&self) -> &[OrientedBox] {
        &self.anchors
    }

    /// Size of the full dense grid.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Dense indices of the anchors that failed the test.
    pub fn outside_indices(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.total - self.indices.len());
        let mut inside = self.indices.iter().copied().peekable();
        for idx in 0..self.total {
            if inside.peek() == Some(&idx) {
                inside.next();
            } else {
                out.push(idx);
            }
        }
        out
    }
}

/// Keeps the anchors whose four rotated corners all fall inside `bounds`.
pub fn filter_inside(grid: &AnchorGrid, bounds: &ImageBounds) -> InsideSubset {
    let _span = trace_span!("boundary_filter", anchors = grid.len()).entered();

    let mut indices = Vec::new();
    let mut anchors = Vec::new();
    for (idx, anchor) in grid.anchors().iter().enumerate() {
        if inside_bounds(&rotated_corners(anchor), bounds) {
            indices.push(idx);
            anchors.push(*anchor);
        }
    }

    trace_event!("inside_anchors", count = indices.len(), total = grid.len());
    InsideSubset {
        indices,
        anchors,
        total: grid.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{BaseAnchor, FeatureSize};

    #[test]
    fn filter_keeps_only_fully_contained_anchors() {
        let base = [BaseAnchor::new(40.0, 40.0)];
        // Centers at 0, 32, 64, 96 on both axes.
        let grid = AnchorGrid::build(&base, 32.0, FeatureSize::new(4, 4));
        let subset = filter_inside(&grid, &ImageBounds::new(128.0, 128.0, 0.0));
        let kept: Vec<_> = subset
            .indices()
            .iter()
            .map(|&i| grid.grid_index(i))
            .map(|g| (g.row, g.col))
            .collect();
        assert_eq!(kept, vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3), (3, 1), (3, 2), (3, 3)]);
        assert_eq!(subset.total(), 16);
        assert_eq!(subset.outside_indices().len(), 7);
        assert!(subset.indices().windows(2).all(|w| w[0] < w[1]));
        for (k, &idx) in subset.indices().iter().enumerate() {
            assert_eq!(subset.anchors()[k], grid.anchors()[idx]);
        }
    }

    #[test]
    fn rotated_anchor_set_is_tested_per_angle() {
        let base = [
            BaseAnchor::new(60.0, 60.0),
            BaseAnchor::new(60.0, 60.0).with_theta(45.0),
        ];
        let grid = AnchorGrid::build(&base, 1.0, FeatureSize::new(1, 1));
        let shifted = AnchorGrid::build(
            &[base[0].centered_at(36.0, 36.0), base[1].centered_at(36.0, 36.0)],
            1.0,
            FeatureSize::new(1, 1),
        );
        assert!(filter_inside(&grid, &ImageBounds::new(100.0, 100.0, 0.0)).is_empty());
        // Upright fits in (6, 66); the diagonal reaches 36 - 42.4 < 0.
        let subset = filter_inside(&shifted, &ImageBounds::new(100.0, 100.0, 0.0));
        assert_eq!(subset.indices(), &[0]);
        let padded = filter_inside(&shifted, &ImageBounds::new(100.0, 100.0, 0.1));
        assert_eq!(padded.indices(), &[0, 1]);
    }
}
