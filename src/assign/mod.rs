//! Positive / negative / ignore assignment for the inside anchors.
//!
//! Assignment runs in three stages: [`match_anchors`] finds each anchor's best
//! ground truth and the orientation gap to it, [`apply_policy`] writes labels
//! in a fixed order where later writes win, and [`subsample`] trims the
//! labelled set to the configured batch.

mod matching;
mod policy;
mod sample;

pub use matching::{match_anchors, MatchSummary};
pub use policy::apply_policy;
pub use sample::subsample;

use crate::geometry::OrientedBox;
use crate::overlap::OverlapMatrix;
use crate::trace::{trace_event, trace_span};
use crate::util::{AnchorTargetError, AnchorTargetResult};
use rand::Rng;

/// Training label of one anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Label {
    /// Takes no part in the loss.
    #[default]
    Ignore = -1,
    Negative = 0,
    Positive = 1,
}

impl Label {
    /// Numeric value written to the label blob.
    pub fn value(self) -> i8 {
        self as i8
    }

    /// True for `Positive` and `Negative`.
    pub fn is_labelled(self) -> bool {
        self != Label::Ignore
    }
}

/// Thresholds and sampling sizes for label assignment.
#[derive(Clone, Debug)]
pub struct AssignConfig {
    /// Anchors whose best overlap reaches this value are positive.
    pub pos_overlap_thresh: f64,
    /// Anchors whose best overlap is below this value are negative.
    pub neg_overlap_thresh: f64,
    /// Write negatives after positives so they can overwrite them.
    pub clobber_positives: bool,
    /// Max orientation gap (degrees) for the per-ground-truth best anchor.
    pub positive_angle_filter: f64,
    /// Orientation gap (degrees) above which a high-overlap anchor is demoted
    /// when `clobber_positives` is set.
    pub negative_angle_filter: f64,
    /// Total labelled anchors kept per image.
    pub batch_size: usize,
    /// Upper share of `batch_size` that may be positive.
    pub fg_fraction: f64,
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            pos_overlap_thresh: 0.7,
            neg_overlap_thresh: 0.3,
            clobber_positives: false,
            positive_angle_filter: 15.0,
            negative_angle_filter: 15.0,
            batch_size: 256,
            fg_fraction: 0.5,
        }
    }
}

impl AssignConfig {
    /// Validates ranges and ordering of the thresholds.
    pub fn validate(&self) -> AnchorTargetResult<()> {
        let finite = [
            self.pos_overlap_thresh,
            self.neg_overlap_thresh,
            self.positive_angle_filter,
            self.negative_angle_filter,
            self.fg_fraction,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(AnchorTargetError::InvalidConfig {
                reason: "assignment thresholds must be finite",
            });
        }
        if self.neg_overlap_thresh > self.pos_overlap_thresh {
            return Err(AnchorTargetError::InvalidConfig {
                reason: "neg_overlap_thresh must not exceed pos_overlap_thresh",
            });
        }
        if self.positive_angle_filter < 0.0 || self.negative_angle_filter < 0.0 {
            return Err(AnchorTargetError::InvalidConfig {
                reason: "angle filters must be >= 0",
            });
        }
        if !(0.0..=1.0).contains(&self.fg_fraction) {
            return Err(AnchorTargetError::InvalidConfig {
                reason: "fg_fraction must lie in [0, 1]",
            });
        }
        Ok(())
    }

    /// Maximum number of positives kept after subsampling.
    pub fn num_fg(&self) -> usize {
        (self.fg_fraction * self.batch_size as f64).floor() as usize
    }
}

/// Labels and matches for the inside anchors.
#[derive(Clone, Debug)]
pub struct Assignment {
    /// Final label per inside anchor.
    pub labels: Vec<Label>,
    /// Index of the best-overlapping ground truth per inside anchor.
    pub best_gt: Vec<usize>,
    /// Overlap with that ground truth.
    pub max_overlap: Vec<f64>,
}

impl Assignment {
    pub fn count(&self, label: Label) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }
}

/// Runs matching, the labelling policy and subsampling for one image.
///
/// `overlaps` must be `anchors.len() x gt.len()`; `gt` must be non-empty.
pub fn assign_labels<R>(
    anchors: &[OrientedBox],
    gt: &[OrientedBox],
    overlaps: &OverlapMatrix,
    cfg: &AssignConfig,
    rng: &mut R,
) -> AnchorTargetResult<Assignment>
where
    R: Rng + ?Sized,
{
    let _span = trace_span!("assign_labels", anchors = anchors.len(), gt = gt.len()).entered();

    let summary = match_anchors(anchors, gt, overlaps, cfg.positive_angle_filter)?;
    let mut labels = apply_policy(&summary, cfg);
    subsample(&mut labels, cfg, rng);

    let assignment = Assignment {
        labels,
        best_gt: summary.best_gt,
        max_overlap: summary.max_overlap,
    };
    trace_event!(
        "labels_assigned",
        positives = assignment.count(Label::Positive),
        negatives = assignment.count(Label::Negative)
    );
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn boxes(thetas: &[f64]) -> Vec<OrientedBox> {
        thetas
            .iter()
            .map(|&t| OrientedBox::new(0.0, 0.0, 10.0, 10.0, t))
            .collect()
    }

    fn cfg() -> AssignConfig {
        AssignConfig {
            pos_overlap_thresh: 0.5,
            neg_overlap_thresh: 0.3,
            ..AssignConfig::default()
        }
    }

    #[test]
    fn label_values_match_blob_encoding() {
        assert_eq!(Label::Ignore.value(), -1);
        assert_eq!(Label::Negative.value(), 0);
        assert_eq!(Label::Positive.value(), 1);
        assert_eq!(Label::default(), Label::Ignore);
    }

    #[test]
    fn threshold_boundary_is_inclusive_for_positives() {
        let anchors = boxes(&[0.0, 0.0, 0.0, 0.0]);
        let gt = boxes(&[0.0]);
        // The 0.9 row is the gt-best anchor; the others test the thresholds.
        let overlaps = OverlapMatrix::new(vec![0.9, 0.5, 0.499, 0.4], 4, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let out = assign_labels(&anchors, &gt, &overlaps, &cfg(), &mut rng).unwrap();
        assert_eq!(
            out.labels,
            vec![Label::Positive, Label::Positive, Label::Ignore, Label::Ignore]
        );

        let low = OverlapMatrix::new(vec![0.9, 0.5, 0.29], 3, 1).unwrap();
        let out = assign_labels(&anchors[..3], &gt, &low, &cfg(), &mut rng).unwrap();
        assert_eq!(out.labels[2], Label::Negative);
    }

    #[test]
    fn empty_ground_truth_is_rejected() {
        let anchors = boxes(&[0.0]);
        let overlaps = OverlapMatrix::new(Vec::new(), 1, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let err = assign_labels(&anchors, &[], &overlaps, &cfg(), &mut rng).unwrap_err();
        assert_eq!(err, AnchorTargetError::EmptyGroundTruth);
    }

    #[test]
    fn config_validation_catches_bad_ranges() {
        assert!(AssignConfig::default().validate().is_ok());
        let swapped = AssignConfig {
            pos_overlap_thresh: 0.2,
            neg_overlap_thresh: 0.4,
            ..AssignConfig::default()
        };
        assert!(swapped.validate().is_err());
        let fraction = AssignConfig {
            fg_fraction: 1.5,
            ..AssignConfig::default()
        };
        assert!(fraction.validate().is_err());
        assert_eq!(AssignConfig::default().num_fg(), 128);
    }
}
