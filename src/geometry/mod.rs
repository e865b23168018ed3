//! Oriented box types and rotation-aware containment tests.
//!
//! Boxes use the `(cx, cy, height, width, theta)` convention with `theta` in
//! degrees, anti-clockwise positive. The footprint is symmetric under a half
//! turn, so `theta` and `theta ± 180` describe the same shape; the canonical
//! range is `(-90, 90]`.

mod corners;

pub use corners::{inside_bounds, rotated_corners, Corners, ImageBounds};

/// 2D point in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rotated box (or ellipse footprint) given by center, size and angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientedBox {
    /// Center x coordinate.
    pub cx: f64,
    /// Center y coordinate.
    pub cy: f64,
    /// Extent along the local y axis.
    pub height: f64,
    /// Extent along the local x axis.
    pub width: f64,
    /// Rotation in degrees, anti-clockwise positive.
    pub theta: f64,
}

impl OrientedBox {
    pub fn new(cx: f64, cy: f64, height: f64, width: f64, theta: f64) -> Self {
        Self {
            cx,
            cy,
            height,
            width,
            theta,
        }
    }

    /// Builds a box from a `[cx, cy, h, w, theta]` row.
    pub fn from_array(values: [f64; 5]) -> Self {
        let [cx, cy, height, width, theta] = values;
        Self::new(cx, cy, height, width, theta)
    }

    /// Returns the box as a `[cx, cy, h, w, theta]` row.
    pub fn to_array(&self) -> [f64; 5] {
        [self.cx, self.cy, self.height, self.width, self.theta]
    }

    /// Returns true if height or width is not strictly positive (or NaN).
    pub fn is_degenerate(&self) -> bool {
        !(self.height > 0.0 && self.width > 0.0)
    }

    /// Returns a copy translated by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            ..*self
        }
    }
}

/// Ground-truth box with its class label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundTruthBox {
    pub bbox: OrientedBox,
    pub class_label: i32,
}

impl GroundTruthBox {
    pub fn new(bbox: OrientedBox, class_label: i32) -> Self {
        Self { bbox, class_label }
    }
}
