//! Best-match search between inside anchors and ground truth.

use crate::angle::symmetric_distance;
use crate::geometry::OrientedBox;
use crate::overlap::OverlapMatrix;
use crate::util::{AnchorTargetError, AnchorTargetResult};

/// Per-anchor match statistics consumed by the labelling policy.
#[derive(Clone, Debug)]
pub struct MatchSummary {
    /// Column of the highest overlap per anchor (lowest index on ties).
    pub best_gt: Vec<usize>,
    /// Highest overlap per anchor.
    pub max_overlap: Vec<f64>,
    /// Orientation gap in degrees between each anchor and its best match.
    pub angle_at_best: Vec<f64>,
    /// Highest overlap per ground truth over all anchors.
    pub gt_max_overlap: Vec<f64>,
    /// Anchors that attain the column maximum of some ground truth and pass
    /// the positive angle gate against that ground truth.
    pub gt_best: Vec<bool>,
}

/// Computes best matches, orientation gaps and the gated per-gt best anchors.
pub fn match_anchors(
    anchors: &[OrientedBox],
    gt: &[OrientedBox],
    overlaps: &OverlapMatrix,
    positive_angle_filter: f64,
) -> AnchorTargetResult<MatchSummary> {
    if gt.is_empty() {
        return Err(AnchorTargetError::EmptyGroundTruth);
    }
    overlaps.expect_shape(anchors.len(), gt.len())?;

    let n = anchors.len();
    let k = gt.len();
    let mut best_gt = Vec::with_capacity(n);
    let mut max_overlap = Vec::with_capacity(n);
    let mut angle_at_best = Vec::with_capacity(n);
    let mut gt_max_overlap = vec![f64::NEG_INFINITY; k];

    for (i, anchor) in anchors.iter().enumerate() {
        let row = overlaps
            .row(i)
            .ok_or(AnchorTargetError::InvalidInput("overlap row out of range"))?;
        let mut best = 0usize;
        for (j, &value) in row.iter().enumerate() {
            if value > row[best] {
                best = j;
            }
            if value > gt_max_overlap[j] {
                gt_max_overlap[j] = value;
            }
        }
        best_gt.push(best);
        max_overlap.push(row[best]);
        angle_at_best.push(symmetric_distance(anchor.theta, gt[best].theta));
    }

    let mut gt_best = Vec::with_capacity(n);
    for (i, anchor) in anchors.iter().enumerate() {
        let row = overlaps
            .row(i)
            .ok_or(AnchorTargetError::InvalidInput("overlap row out of range"))?;
        let is_best = row.iter().zip(gt).zip(&gt_max_overlap).any(|((&value, g), &top)| {
            value == top && symmetric_distance(anchor.theta, g.theta) <= positive_angle_filter
        });
        gt_best.push(is_best);
    }

    Ok(MatchSummary {
        best_gt,
        max_overlap,
        angle_at_best,
        gt_max_overlap,
        gt_best,
    })
}
