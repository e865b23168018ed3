//! Anchor sets: base anchors, the dense shifted grid and the in-image subset.

mod boundary;
mod grid;

pub use boundary::{filter_inside, InsideSubset};
pub use grid::{AnchorGrid, FeatureSize};

use crate::geometry::OrientedBox;
use crate::util::math::in_half_turn;
use crate::util::{AnchorTargetError, AnchorTargetResult};

/// Anchor shape placed at every feature-map cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseAnchor {
    /// Center offset from the cell origin along x.
    pub cx: f64,
    /// Center offset from the cell origin along y.
    pub cy: f64,
    pub height: f64,
    pub width: f64,
    /// Orientation in degrees; zero for the usual upright anchor set.
    pub theta: f64,
}

impl BaseAnchor {
    /// Upright anchor centered on the cell origin.
    pub fn new(height: f64, width: f64) -> Self {
        Self {
            cx: 0.0,
            cy: 0.0,
            height,
            width,
            theta: 0.0,
        }
    }

    /// Returns a copy rotated to `theta` degrees.
    pub fn with_theta(self, theta: f64) -> Self {
        Self { theta, ..self }
    }

    /// Returns a copy centered at `(cx, cy)` relative to the cell origin.
    pub fn centered_at(self, cx: f64, cy: f64) -> Self {
        Self { cx, cy, ..self }
    }

    pub fn to_box(&self) -> OrientedBox {
        OrientedBox::new(self.cx, self.cy, self.height, self.width, self.theta)
    }
}

/// Supplier of the ordered base-anchor set.
pub trait BaseAnchorSource {
    fn base_anchors(&self) -> &[BaseAnchor];
}

impl BaseAnchorSource for [BaseAnchor] {
    fn base_anchors(&self) -> &[BaseAnchor] {
        self
    }
}

impl BaseAnchorSource for Vec<BaseAnchor> {
    fn base_anchors(&self) -> &[BaseAnchor] {
        self
    }
}

impl<const N: usize> BaseAnchorSource for [BaseAnchor; N] {
    fn base_anchors(&self) -> &[BaseAnchor] {
        self
    }
}

/// Checks that a base-anchor set is non-empty and non-degenerate.
pub fn validate_base_anchors(anchors: &[BaseAnchor]) -> AnchorTargetResult<()> {
    if anchors.is_empty() {
        return Err(AnchorTargetError::InvalidConfig {
            reason: "base anchor set is empty",
        });
    }
    for anchor in anchors {
        if anchor.to_box().is_degenerate() {
            return Err(AnchorTargetError::DegenerateAnchor {
                height: anchor.height,
                width: anchor.width,
            });
        }
        if !in_half_turn(anchor.theta) {
            return Err(AnchorTargetError::Domain {
                angle_deg: anchor.theta,
            });
        }
        if !anchor.cx.is_finite() || !anchor.cy.is_finite() {
            return Err(AnchorTargetError::InvalidInput("base anchor center is not finite"));
        }
    }
    Ok(())
}

/// Position of an anchor in the dense grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridIndex {
    pub row: usize,
    pub col: usize,
    /// Index into the base-anchor set.
    pub base: usize,
}

/// Shifted anchor tagged with its grid position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorRecord {
    pub bbox: OrientedBox,
    pub index: GridIndex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_empty_and_degenerate_sets() {
        assert!(validate_base_anchors(&[]).is_err());
        let err = validate_base_anchors(&[BaseAnchor::new(8.0, 0.0)]).unwrap_err();
        assert_eq!(
            err,
            AnchorTargetError::DegenerateAnchor {
                height: 8.0,
                width: 0.0
            }
        );
        assert!(validate_base_anchors(&[BaseAnchor::new(8.0, 16.0).with_theta(30.0)]).is_ok());
        assert_eq!(
            validate_base_anchors(&[BaseAnchor::new(8.0, 16.0).with_theta(-90.0)]),
            Err(AnchorTargetError::Domain { angle_deg: -90.0 })
        );
    }
}
