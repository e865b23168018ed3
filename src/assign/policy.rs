//! Label writing order.

use crate::assign::{AssignConfig, Label, MatchSummary};

/// Writes labels in order: early negatives, gt-best positives, threshold
/// positives, then late negatives. Later writes override earlier ones.
///
/// Without `clobber_positives`, low-overlap anchors are marked negative first
/// so positives can replace them. With it, negatives are written last and
/// also demote high-overlap anchors whose orientation gap to their best match
/// exceeds `negative_angle_filter`.
pub fn apply_policy(summary: &MatchSummary, cfg: &AssignConfig) -> Vec<Label> {
    let n = summary.max_overlap.len();
    let mut labels = vec![Label::Ignore; n];

    if !cfg.clobber_positives {
        for (label, &overlap) in labels.iter_mut().zip(&summary.max_overlap) {
            if overlap < cfg.neg_overlap_thresh {
                *label = Label::Negative;
            }
        }
    }

    for (label, &is_best) in labels.iter_mut().zip(&summary.gt_best) {
        if is_best {
            *label = Label::Positive;
        }
    }

    for (label, &overlap) in labels.iter_mut().zip(&summary.max_overlap) {
        if overlap >= cfg.pos_overlap_thresh {
            *label = Label::Positive;
        }
    }

    if cfg.clobber_positives {
        for (i, label) in labels.iter_mut().enumerate() {
            let overlap = summary.max_overlap[i];
            let misaligned = overlap >= cfg.pos_overlap_thresh
                && summary.angle_at_best[i] > cfg.negative_angle_filter;
            if overlap < cfg.neg_overlap_thresh || misaligned {
                *label = Label::Negative;
            }
        }
    }

    labels
}
