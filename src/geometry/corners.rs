//! Corner projection and padded image containment.

use crate::geometry::{OrientedBox, Point};
use crate::util::math::sin_cos_deg;

/// The four corners of a rotated box in local-frame order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corners {
    /// Local `(-w/2, -h/2)`.
    pub top_left: Point,
    /// Local `(-w/2, +h/2)`.
    pub bottom_left: Point,
    /// Local `(+w/2, -h/2)`.
    pub top_right: Point,
    /// Local `(+w/2, +h/2)`.
    pub bottom_right: Point,
}

impl Corners {
    /// Returns the corners as `[top_left, bottom_left, top_right, bottom_right]`.
    pub fn to_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.bottom_left,
            self.top_right,
            self.bottom_right,
        ]
    }
}

/// Projects the corners of `bbox` into image coordinates.
///
/// A local offset `(x, y)` maps to `(x cos t - y sin t, x sin t + y cos t)`
/// and is then translated by the box center.
pub fn rotated_corners(bbox: &OrientedBox) -> Corners {
    let (sin_t, cos_t) = sin_cos_deg(bbox.theta);
    let half_w = bbox.width * 0.5;
    let half_h = bbox.height * 0.5;
    let project = |x: f64, y: f64| {
        Point::new(
            x * cos_t - y * sin_t + bbox.cx,
            x * sin_t + y * cos_t + bbox.cy,
        )
    };
    Corners {
        top_left: project(-half_w, -half_h),
        bottom_left: project(-half_w, half_h),
        top_right: project(half_w, -half_h),
        bottom_right: project(half_w, half_h),
    }
}

/// Image extent with an optional border allowance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageBounds {
    pub width: f64,
    pub height: f64,
    /// Border allowance as a fraction of each image dimension.
    pub padding_frac: f64,
}

impl ImageBounds {
    pub fn new(width: f64, height: f64, padding_frac: f64) -> Self {
        Self {
            width,
            height,
            padding_frac,
        }
    }

    /// Returns true if `pt` lies strictly inside the padded image.
    pub fn contains(&self, pt: Point) -> bool {
        let pad_w = self.padding_frac * self.width;
        let pad_h = self.padding_frac * self.height;
        pt.x > -pad_w && pt.x < self.width + pad_w && pt.y > -pad_h && pt.y < self.height + pad_h
    }
}

/// Returns true if all four corners lie inside the padded image.
pub fn inside_bounds(corners: &Corners, bounds: &ImageBounds) -> bool {
    corners.to_array().iter().all(|&pt| bounds.contains(pt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, x: f64, y: f64) -> bool {
        (a.x - x).abs() < 1e-9 && (a.y - y).abs() < 1e-9
    }

    #[test]
    fn unrotated_corners_follow_local_order() {
        let c = rotated_corners(&OrientedBox::new(10.0, 20.0, 4.0, 6.0, 0.0));
        assert!(close(c.top_left, 7.0, 18.0));
        assert!(close(c.bottom_left, 7.0, 22.0));
        assert!(close(c.top_right, 13.0, 18.0));
        assert!(close(c.bottom_right, 13.0, 22.0));
    }

    #[test]
    fn quarter_turn_rotates_anti_clockwise() {
        // (x, y) -> (-y, x) for +90 degrees.
        let c = rotated_corners(&OrientedBox::new(0.0, 0.0, 2.0, 4.0, 90.0));
        assert!(close(c.top_left, 1.0, -2.0));
        assert!(close(c.bottom_left, -1.0, -2.0));
        assert!(close(c.top_right, 1.0, 2.0));
        assert!(close(c.bottom_right, -1.0, 2.0));
    }

    #[test]
    fn diagonal_rotation_moves_corner_onto_axis() {
        let c = rotated_corners(&OrientedBox::new(0.0, 0.0, 2.0, 2.0, 45.0));
        let r = 2.0_f64.sqrt();
        assert!(close(c.top_left, 0.0, -r));
        assert!(close(c.bottom_right, 0.0, r));
        assert!(close(c.top_right, r, 0.0));
        assert!(close(c.bottom_left, -r, 0.0));
    }

    #[test]
    fn strict_bounds_reject_touching_corners() {
        let bounds = ImageBounds::new(200.0, 200.0, 0.0);
        let touching = rotated_corners(&OrientedBox::new(50.0, 50.0, 100.0, 100.0, 0.0));
        assert!(!inside_bounds(&touching, &bounds));
        let inner = rotated_corners(&OrientedBox::new(100.0, 100.0, 100.0, 100.0, 0.0));
        assert!(inside_bounds(&inner, &bounds));
    }

    #[test]
    fn rotation_can_push_corners_outside() {
        let bounds = ImageBounds::new(200.0, 200.0, 0.0);
        let upright = rotated_corners(&OrientedBox::new(100.0, 100.0, 180.0, 180.0, 0.0));
        assert!(inside_bounds(&upright, &bounds));
        let tilted = rotated_corners(&OrientedBox::new(100.0, 100.0, 180.0, 180.0, 45.0));
        assert!(!inside_bounds(&tilted, &bounds));
    }

    #[test]
    fn padding_scales_with_each_dimension() {
        let bounds = ImageBounds::new(100.0, 50.0, 0.1);
        assert!(bounds.contains(Point::new(-9.0, -4.0)));
        assert!(!bounds.contains(Point::new(-11.0, 0.0)));
        assert!(!bounds.contains(Point::new(0.0, -6.0)));
        assert!(bounds.contains(Point::new(109.0, 54.0)));
        assert!(!bounds.contains(Point::new(0.0, 56.0)));
    }
}
