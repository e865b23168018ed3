//! Per-image anchor target generation.
//!
//! [`AnchorTargetGenerator`] holds the fixed configuration (base anchors,
//! stride, thresholds) and turns one image's ground truth into the dense
//! label, target and weight blobs:
//!
//! anchor grid -> boundary filter -> overlap oracle -> labels -> targets
//! -> scatter back to the full grid.

use crate::anchor::{
    filter_inside, validate_base_anchors, AnchorGrid, BaseAnchor, BaseAnchorSource, FeatureSize,
    InsideSubset,
};
use crate::assign::{assign_labels, AssignConfig, Assignment, Label};
use crate::codec::{compute_weights, encode_matched, WeightConfig, TARGET_DIM};
use crate::geometry::{GroundTruthBox, ImageBounds, OrientedBox};
use crate::layout::{scatter, DenseTargets};
use crate::overlap::{OverlapMatrix, OverlapOracle};
use crate::trace::{trace_event, trace_span};
use crate::util::math::in_half_turn;
use crate::util::{AnchorTargetError, AnchorTargetResult};
use rand::Rng;

/// Full configuration of the target generator.
#[derive(Clone, Debug)]
pub struct TargetConfig {
    pub assign: AssignConfig,
    pub weights: WeightConfig,
    /// Distance in pixels between neighbouring feature-map cells.
    pub feature_stride: usize,
    /// Border allowance as a fraction of the image size.
    pub allowed_border_padding_frac: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            assign: AssignConfig::default(),
            weights: WeightConfig::default(),
            feature_stride: 16,
            allowed_border_padding_frac: 0.0,
        }
    }
}

impl TargetConfig {
    pub fn validate(&self) -> AnchorTargetResult<()> {
        self.assign.validate()?;
        self.weights.validate()?;
        if self.feature_stride == 0 {
            return Err(AnchorTargetError::InvalidConfig {
                reason: "feature_stride must be > 0",
            });
        }
        if !self.allowed_border_padding_frac.is_finite() || self.allowed_border_padding_frac < 0.0
        {
            return Err(AnchorTargetError::InvalidConfig {
                reason: "allowed_border_padding_frac must be >= 0",
            });
        }
        Ok(())
    }
}

/// Per-image inputs from the surrounding pipeline.
#[derive(Clone, Copy, Debug)]
pub struct ImageInputs<'a> {
    pub gt: &'a [GroundTruthBox],
    pub image_width: f64,
    pub image_height: f64,
    pub feature_size: FeatureSize,
}

impl<'a> ImageInputs<'a> {
    /// Builds inputs from an image size given as `(width, height)`.
    pub fn new(
        gt: &'a [GroundTruthBox],
        image_size: (f64, f64),
        feature_size: FeatureSize,
    ) -> Self {
        let (image_width, image_height) = image_size;
        Self {
            gt,
            image_width,
            image_height,
            feature_size,
        }
    }
}

/// Counts describing one generated batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetReport {
    pub total_anchors: usize,
    pub inside_anchors: usize,
    pub positives: usize,
    pub negatives: usize,
    pub ignored: usize,
}

/// Dense blobs plus the intermediate results they were built from.
#[derive(Clone, Debug)]
pub struct TargetOutput {
    pub dense: DenseTargets,
    pub report: TargetReport,
    pub inside: InsideSubset,
    pub assignment: Assignment,
}

/// Generates anchor labels and regression targets for one image at a time.
#[derive(Clone, Debug)]
pub struct AnchorTargetGenerator {
    base: Vec<BaseAnchor>,
    cfg: TargetConfig,
}

impl AnchorTargetGenerator {
    /// Creates a generator after validating the anchors and the config.
    pub fn new<S>(source: &S, cfg: TargetConfig) -> AnchorTargetResult<Self>
    where
        S: BaseAnchorSource + ?Sized,
    {
        let base = source.base_anchors().to_vec();
        validate_base_anchors(&base)?;
        cfg.validate()?;
        Ok(Self { base, cfg })
    }

    pub fn config(&self) -> &TargetConfig {
        &self.cfg
    }

    pub fn base_anchors(&self) -> &[BaseAnchor] {
        &self.base
    }

    /// Builds the dense anchor grid for a feature map.
    pub fn anchor_grid(&self, size: FeatureSize) -> AnchorGrid {
        let _span = trace_span!("anchor_grid", height = size.height, width = size.width).entered();
        AnchorGrid::build(&self.base, self.cfg.feature_stride as f64, size)
    }

    /// Runs the full target pipeline for one image.
    ///
    /// `rng` drives the positive / negative subsampling; a seeded generator
    /// makes the output reproducible.
    pub fn compute_targets<O, R>(
        &self,
        inputs: &ImageInputs<'_>,
        oracle: &O,
        rng: &mut R,
    ) -> AnchorTargetResult<TargetOutput>
    where
        O: OverlapOracle + ?Sized,
        R: Rng + ?Sized,
    {
        let gt = check_ground_truth(inputs.gt)?;
        if !(inputs.image_width > 0.0 && inputs.image_height > 0.0) {
            return Err(AnchorTargetError::InvalidInput("image size must be positive"));
        }

        let grid = self.anchor_grid(inputs.feature_size);
        let bounds = ImageBounds::new(
            inputs.image_width,
            inputs.image_height,
            self.cfg.allowed_border_padding_frac,
        );
        let inside = filter_inside(&grid, &bounds);

        let overlaps = if inside.is_empty() {
            OverlapMatrix::new(Vec::new(), 0, gt.len())?
        } else {
            oracle.compute_overlap(inside.anchors(), &gt)?
        };
        overlaps.expect_shape(inside.len(), gt.len())?;

        let assignment = assign_labels(inside.anchors(), &gt, &overlaps, &self.cfg.assign, rng)?;

        let _span = trace_span!("encode_targets", anchors = inside.len()).entered();
        let targets: Vec<[f64; TARGET_DIM]> =
            encode_matched(inside.anchors(), &gt, &assignment.best_gt)?
                .iter()
                .map(|t| t.to_array())
                .collect();
        let weights = compute_weights(&assignment.labels, &self.cfg.weights)?;

        let total = grid.len();
        let idx = inside.indices();
        let labels = scatter(&assignment.labels, idx, total, Label::Ignore)?;
        let targets = scatter(&targets, idx, total, [0.0; TARGET_DIM])?;
        let inside_weights = scatter(&weights.inside, idx, total, [0.0; TARGET_DIM])?;
        let outside_weights = scatter(&weights.outside, idx, total, [0.0; TARGET_DIM])?;
        let dense = DenseTargets::from_dense(
            inputs.feature_size,
            grid.num_base(),
            &labels,
            &targets,
            &inside_weights,
            &outside_weights,
        )?;

        let positives = assignment.count(Label::Positive);
        let negatives = assignment.count(Label::Negative);
        let report = TargetReport {
            total_anchors: total,
            inside_anchors: inside.len(),
            positives,
            negatives,
            ignored: total - positives - negatives,
        };
        trace_event!(
            "targets_ready",
            inside = report.inside_anchors,
            positives = report.positives,
            negatives = report.negatives
        );

        Ok(TargetOutput {
            dense,
            report,
            inside,
            assignment,
        })
    }
}

fn check_ground_truth(gt: &[GroundTruthBox]) -> AnchorTargetResult<Vec<OrientedBox>> {
    if gt.is_empty() {
        return Err(AnchorTargetError::EmptyGroundTruth);
    }
    gt.iter()
        .map(|g| {
            if g.bbox.is_degenerate() {
                return Err(AnchorTargetError::InvalidInput(
                    "ground-truth box has non-positive size",
                ));
            }
            if !in_half_turn(g.bbox.theta) {
                return Err(AnchorTargetError::Domain {
                    angle_deg: g.bbox.theta,
                });
            }
            Ok(g.bbox)
        })
        .collect()
}
