//! Anchortarget assigns training labels and regression targets to a dense
//! grid of oriented anchors for region-proposal training.
//!
//! One call handles one image: the anchor grid is filtered to the image, an
//! external oracle scores anchor / ground-truth overlap, anchors are labelled
//! positive, negative or ignored under overlap and orientation gates, and the
//! results are scattered back into dense blobs. Parallel overlap scoring is
//! available through the `rayon` feature.

pub mod anchor;
pub mod angle;
pub mod assign;
pub mod codec;
pub mod geometry;
pub mod layout;
pub mod lowlevel;
pub mod overlap;
pub mod target;
mod trace;
pub mod util;

pub use anchor::{AnchorGrid, AnchorRecord, BaseAnchor, BaseAnchorSource, FeatureSize, GridIndex};
pub use assign::{AssignConfig, Label};
pub use codec::{decode, encode, RegressionTarget, WeightConfig, TARGET_DIM};
pub use geometry::{GroundTruthBox, OrientedBox, Point};
pub use layout::DenseTargets;
pub use overlap::{OverlapMatrix, OverlapOracle, SampledEllipseOverlap};
pub use target::{AnchorTargetGenerator, ImageInputs, TargetConfig, TargetOutput, TargetReport};
pub use util::{AnchorTargetError, AnchorTargetResult};
