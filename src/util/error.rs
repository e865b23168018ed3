//! Error types for anchortarget.

use thiserror::Error;

/// Result alias for anchortarget operations.
pub type AnchorTargetResult<T> = std::result::Result<T, AnchorTargetError>;

/// Errors raised while generating anchor targets.
///
/// Every variant is a local precondition violation. None of them are
/// recovered internally; the caller decides whether to skip the image.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AnchorTargetError {
    /// An angle outside `(-90, 90]` degrees reached a signed-delta function.
    #[error("angle {angle_deg} deg is outside (-90, 90]")]
    Domain { angle_deg: f64 },
    /// The image carries no ground-truth boxes.
    #[error("at least one ground-truth box is required")]
    EmptyGroundTruth,
    /// `positive_weight` is non-negative but not inside `(0, 1)`.
    #[error("positive weight {positive_weight} must lie in (0, 1) or be negative")]
    InvalidWeight { positive_weight: f64 },
    /// A matrix or buffer does not have the expected dimensions.
    #[error("shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },
    /// An anchor with non-positive height or width reached the codec.
    #[error("degenerate anchor with height {height} and width {width}")]
    DegenerateAnchor { height: f64, width: f64 },
    /// A configuration field is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// The input data is invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}
