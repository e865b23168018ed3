//! Building blocks for custom target pipelines.
//!
//! These expose the individual stages behind [`AnchorTargetGenerator`] for
//! callers that need to swap one of them out. Most users should go through
//! the generator.
//!
//! [`AnchorTargetGenerator`]: crate::AnchorTargetGenerator

pub use crate::anchor::{filter_inside, validate_base_anchors, InsideSubset};
pub use crate::angle::{
    decode_shortest_delta, signed_shortest_delta, symmetric_distance, AngularAgreement,
    MAX_ENCODED_DELTA,
};
pub use crate::assign::{
    apply_policy, assign_labels, match_anchors, subsample, Assignment, MatchSummary,
};
pub use crate::codec::{compute_weights, decode_all, encode_matched, RegressionWeights};
pub use crate::geometry::{inside_bounds, rotated_corners, Corners, ImageBounds};
pub use crate::layout::{gather, scatter};
